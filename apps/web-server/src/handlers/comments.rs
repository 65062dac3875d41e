//! Comment handlers. Comments are only addressed through their post.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::{Author, Comment, CommentCard};
use blogicum_core::forms::CommentForm;
use blogicum_shared::dto::{CommentDeletePage, CommentFormPage, FormView};

use super::{invalid_form, post_url, redirect, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts/{post_id}/comment/
///
/// Blank text creates nothing and returns to the post.
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))?;

    match form.validate() {
        Ok(text) => {
            let comment = Comment::new(post.id, identity.user_id, text, state.clock.now());
            let comment = state.comments.save(comment).await?;
            tracing::info!(post_id = %post.id, comment_id = %comment.id, "Comment added");
        }
        Err(errors) => {
            tracing::debug!(post_id = %post.id, ?errors, "Comment rejected");
        }
    }

    Ok(redirect(&post_url(post.id)))
}

/// GET /posts/{post_id}/comment/{comment_id}/edit/
pub async fn edit_comment_form(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        return Ok(redirect(&post_url(post_id)));
    }

    let form = FormView::unbound(CommentForm::from_comment(&comment));
    let comment = comment_card(&state, comment).await?;

    Ok(HttpResponse::Ok().json(CommentFormPage {
        post_id,
        comment: views::comment(comment),
        form,
    }))
}

/// POST /posts/{post_id}/comment/{comment_id}/edit/
pub async fn edit_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        tracing::warn!(%comment_id, user = %identity.username, "Edit refused: not the author");
        return Ok(redirect(&post_url(post_id)));
    }

    let form = form.into_inner();
    match form.validate() {
        Ok(text) => {
            comment.text = text;
            state.comments.save(comment).await?;
            tracing::info!(%post_id, %comment_id, "Comment updated");
            Ok(redirect(&post_url(post_id)))
        }
        Err(errors) => {
            let comment = comment_card(&state, comment).await?;
            Ok(HttpResponse::Ok().json(CommentFormPage {
                post_id,
                comment: views::comment(comment),
                form: invalid_form(form, errors),
            }))
        }
    }
}

/// GET /posts/{post_id}/comment/{comment_id}/delete/
pub async fn delete_comment_confirm(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        return Ok(redirect(&post_url(post_id)));
    }

    let comment = comment_card(&state, comment).await?;

    Ok(HttpResponse::Ok().json(CommentDeletePage {
        post_id,
        comment: views::comment(comment),
    }))
}

/// POST /posts/{post_id}/comment/{comment_id}/delete/
pub async fn delete_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        tracing::warn!(%comment_id, user = %identity.username, "Delete refused: not the author");
        return Ok(redirect(&post_url(post_id)));
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(%post_id, %comment_id, "Comment deleted");

    Ok(redirect(&post_url(post_id)))
}

async fn find_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("comment", comment_id))
}

async fn comment_card(state: &AppState, comment: Comment) -> AppResult<CommentCard> {
    let author = state
        .users
        .find_by_id(comment.author_id)
        .await?
        .ok_or_else(|| AppError::not_found("user", comment.author_id))?;

    Ok(CommentCard {
        author: Author::from(&author),
        comment,
    })
}
