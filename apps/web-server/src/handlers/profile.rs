//! User profile pages.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use blogicum_core::domain::User;
use blogicum_core::forms::{FormErrors, ProfileForm, USERNAME_TAKEN};
use blogicum_core::ports::{PostFilter, TokenService};
use blogicum_core::visibility::Visibility;
use blogicum_shared::dto::{FormPage, FormView, ProfilePage};

use super::{PageQuery, invalid_form, list_posts, profile_url, redirect_with_cookie, views};
use crate::middleware::auth::{Identity, OptionalIdentity, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
///
/// The owner sees every post they wrote; visitors see those whose
/// publication date has passed.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::not_found("user", &username))?;

    let is_owner = identity.user_id() == Some(user.id);
    let filter = PostFilter::new(Visibility::for_profile(is_owner, state.clock.now())).by_author(user.id);
    let page_obj = list_posts(&state, filter, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(ProfilePage {
        profile: views::profile(&user, is_owner),
        is_owner,
        page_obj,
    }))
}

/// GET /profile/edit/
pub async fn edit_profile_form(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = requester(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(FormPage {
        form: FormView::unbound(ProfileForm::from_user(&user)),
    }))
}

/// POST /profile/edit/
///
/// A rename re-issues the session so the token keeps naming the user.
pub async fn edit_profile(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let mut user = requester(&state, &identity).await?;
    let form = form.into_inner();

    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(errors) => return Ok(render_profile_form(form, errors)),
    };

    if changes.username != user.username {
        if let Some(holder) = state.users.find_by_username(&changes.username).await? {
            if holder.id != user.id {
                let mut errors = FormErrors::new();
                errors.add("username", USERNAME_TAKEN);
                return Ok(render_profile_form(form, errors));
            }
        }
    }

    changes.apply_to(&mut user);
    user.updated_at = state.clock.now();
    let user = state.users.save(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    let token = token_service.generate_token(user.id, &user.username)?;

    Ok(redirect_with_cookie(
        &profile_url(&user.username),
        session_cookie(token, token_service.expiration_seconds()),
    ))
}

/// The signed-in user as currently stored.
pub(super) async fn requester(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user", &identity.username))
}

fn render_profile_form(form: ProfileForm, errors: FormErrors) -> HttpResponse {
    HttpResponse::Ok().json(FormPage {
        form: invalid_form(form, errors),
    })
}
