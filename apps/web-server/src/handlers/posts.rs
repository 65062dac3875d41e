//! Post listings, detail page and post authoring.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::{Post, PostDraft};
use blogicum_core::forms::{CommentForm, FormErrors, INVALID_CHOICE, PostForm, format_pub_date};
use blogicum_core::ports::PostFilter;
use blogicum_core::visibility::Visibility;
use blogicum_shared::dto::{
    CategoryPage, FormView, IndexPage, PostDeletePage, PostDetailPage, PostFormPage,
};

use super::profile::requester;
use super::{PageQuery, invalid_form, list_posts, post_url, profile_url, redirect, views};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /
pub async fn index(state: web::Data<AppState>, query: web::Query<PageQuery>) -> AppResult<HttpResponse> {
    let filter = PostFilter::new(Visibility::published(state.clock.now()));
    let page_obj = list_posts(&state, filter, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(IndexPage { page_obj }))
}

/// GET /posts/{post_id}/
///
/// Authors always see their own posts; anyone else gets a 404 for a post
/// that is not publicly visible.
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let card = state
        .posts
        .find_card(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))?;

    let is_author = identity.user_id() == Some(card.post.author_id);
    let visible = Visibility::published(state.clock.now()).admits(&card.post, card.category.as_ref());
    if !is_author && !visible {
        return Err(AppError::not_found("post", post_id));
    }

    let comments = state.comments.list_for_post(post_id).await?;

    Ok(HttpResponse::Ok().json(PostDetailPage {
        post: views::post(card),
        comments: comments.into_iter().map(views::comment).collect(),
        form: FormView::unbound(CommentForm::default()),
    }))
}

/// GET /category/{slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("category", &slug))?;

    let filter = PostFilter::new(Visibility::published(state.clock.now())).in_category(category.id);
    let page_obj = list_posts(&state, filter, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(CategoryPage {
        category: views::category(category),
        page_obj,
    }))
}

/// GET /posts/create/
pub async fn create_post_form(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let form = PostForm {
        pub_date: format_pub_date(state.clock.now()),
        ..PostForm::default()
    };

    render_post_form(&state, FormView::unbound(form)).await
}

/// POST /posts/create/
///
/// The profile redirect uses the stored username, not the one in the token.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let draft = match validate_post_form(&state, &form).await? {
        Ok(draft) => draft,
        Err(errors) => return render_post_form(&state, invalid_form(form, errors)).await,
    };

    let author = requester(&state, &identity).await?;
    let post = state
        .posts
        .save(Post::new(author.id, draft, state.clock.now()))
        .await?;
    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    Ok(redirect(&profile_url(&author.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_post_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        return Ok(redirect(&post_url(post.id)));
    }

    render_post_form(&state, FormView::unbound(PostForm::from_post(&post))).await
}

/// POST /posts/{post_id}/edit/
pub async fn edit_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        tracing::warn!(post_id = %post.id, user = %identity.username, "Edit refused: not the author");
        return Ok(redirect(&post_url(post.id)));
    }

    let form = form.into_inner();
    let draft = match validate_post_form(&state, &form).await? {
        Ok(draft) => draft,
        Err(errors) => return render_post_form(&state, invalid_form(form, errors)).await,
    };

    post.apply(draft);
    let post = state.posts.save(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(redirect(&post_url(post.id)))
}

/// GET /posts/{post_id}/delete/
pub async fn delete_post_confirm(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let card = state
        .posts
        .find_card(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))?;

    if !card.post.is_authored_by(identity.user_id) {
        return Ok(redirect(&post_url(post_id)));
    }

    Ok(HttpResponse::Ok().json(PostDeletePage {
        post: views::post(card),
    }))
}

/// POST /posts/{post_id}/delete/
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        tracing::warn!(post_id = %post.id, user = %identity.username, "Delete refused: not the author");
        return Ok(redirect(&post_url(post.id)));
    }

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(redirect("/"))
}

async fn find_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))
}

/// Field checks plus existence of the chosen category and location.
async fn validate_post_form(state: &AppState, form: &PostForm) -> AppResult<Result<PostDraft, FormErrors>> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return Ok(Err(errors)),
    };

    let mut errors = FormErrors::new();
    if let Some(id) = draft.category_id {
        if state.categories.find_by_id(id).await?.is_none() {
            errors.add("category", INVALID_CHOICE);
        }
    }
    if let Some(id) = draft.location_id {
        if state.locations.find_by_id(id).await?.is_none() {
            errors.add("location", INVALID_CHOICE);
        }
    }

    Ok(errors.into_result(draft))
}

async fn render_post_form(state: &AppState, form: FormView<PostForm>) -> AppResult<HttpResponse> {
    let categories = state.categories.list_all().await?;
    let locations = state.locations.list_all().await?;

    Ok(HttpResponse::Ok().json(PostFormPage {
        form,
        categories: views::category_choices(categories),
        locations: views::location_choices(locations),
    }))
}
