//! Sign-in, sign-out and sign-up.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use blogicum_core::domain::User;
use blogicum_core::forms::{FormErrors, LoginForm, RegistrationForm, USERNAME_TAKEN};
use blogicum_core::ports::{PasswordService, TokenService};
use blogicum_shared::dto::{FormPage, FormView};

use super::{invalid_form, profile_url, redirect, redirect_with_cookie};
use crate::middleware::auth::{LOGIN_URL, cleared_session_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// GET /auth/login/
pub async fn login_form() -> HttpResponse {
    HttpResponse::Ok().json(FormPage {
        form: FormView::unbound(LoginForm::default()),
    })
}

/// POST /auth/login/
///
/// Success always lands on the user's own profile.
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return Ok(render_form(form, errors)),
    };

    let user = state.users.find_by_username(&credentials.username).await?;
    let user = match user {
        Some(user) if password_service.verify(&credentials.password, &user.password_hash)? => user,
        _ => {
            tracing::info!(username = %credentials.username, "Login failed");
            let mut errors = FormErrors::new();
            errors.add_non_field(BAD_CREDENTIALS);
            return Ok(render_form(form, errors));
        }
    };

    let token = token_service.generate_token(user.id, &user.username)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(redirect_with_cookie(
        &profile_url(&user.username),
        session_cookie(token, token_service.expiration_seconds()),
    ))
}

/// GET|POST /auth/logout/
pub async fn logout() -> HttpResponse {
    redirect_with_cookie("/", cleared_session_cookie())
}

/// GET /auth/registration/
pub async fn registration_form() -> HttpResponse {
    HttpResponse::Ok().json(FormPage {
        form: FormView::unbound(RegistrationForm::default()),
    })
}

/// POST /auth/registration/
pub async fn registration(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => return Ok(render_form(form, errors)),
    };

    if state.users.find_by_username(&registration.username).await?.is_some() {
        let mut errors = FormErrors::new();
        errors.add("username", USERNAME_TAKEN);
        return Ok(render_form(form, errors));
    }

    let password_hash = password_service.hash(&registration.password)?;
    let mut user = User::new(registration.username, registration.email, password_hash);
    user.created_at = state.clock.now();
    user.updated_at = user.created_at;

    let user = state.users.save(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(redirect(LOGIN_URL))
}

fn render_form<F: serde::Serialize>(form: F, errors: FormErrors) -> HttpResponse {
    HttpResponse::Ok().json(FormPage {
        form: invalid_form(form, errors),
    })
}
