//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod profile;
mod views;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, cookie::Cookie, http::header, web};
use serde::Deserialize;
use uuid::Uuid;

use blogicum_core::ports::PostFilter;
use blogicum_core::{Page, forms::FormErrors};
use blogicum_shared::dto::{FormView, PageView, PostView};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Configure all application routes.
///
/// Literal segments (`/posts/create/`, `/profile/edit/`) are registered
/// before the parameterized routes they would otherwise match.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                .service(
                    web::resource("/create/")
                        .route(web::get().to(posts::create_post_form))
                        .route(web::post().to(posts::create_post)),
                )
                .route("/{post_id}/", web::get().to(posts::post_detail))
                .service(
                    web::resource("/{post_id}/edit/")
                        .route(web::get().to(posts::edit_post_form))
                        .route(web::post().to(posts::edit_post)),
                )
                .service(
                    web::resource("/{post_id}/delete/")
                        .route(web::get().to(posts::delete_post_confirm))
                        .route(web::post().to(posts::delete_post)),
                )
                .route("/{post_id}/comment/", web::post().to(comments::add_comment))
                .service(
                    web::resource("/{post_id}/comment/{comment_id}/edit/")
                        .route(web::get().to(comments::edit_comment_form))
                        .route(web::post().to(comments::edit_comment)),
                )
                .service(
                    web::resource("/{post_id}/comment/{comment_id}/delete/")
                        .route(web::get().to(comments::delete_comment_confirm))
                        .route(web::post().to(comments::delete_comment)),
                ),
        )
        .route("/category/{slug}/", web::get().to(posts::category_posts))
        .service(
            web::resource("/profile/edit/")
                .route(web::get().to(profile::edit_profile_form))
                .route(web::post().to(profile::edit_profile)),
        )
        .route("/profile/{username}/", web::get().to(profile::profile))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth::logout))
                        .route(web::post().to(auth::logout)),
                )
                .service(
                    web::resource("/registration/")
                        .route(web::get().to(auth::registration_form))
                        .route(web::post().to(auth::registration)),
                ),
        );
}

/// `?page=` of a listing, kept raw so that any value resolves to a page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// `302 Found` to `location`, setting `cookie` on the way.
pub fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish()
}

pub fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Count, paginate and annotate the posts selected by `filter`.
async fn list_posts(
    state: &AppState,
    filter: PostFilter,
    requested: Option<&str>,
) -> AppResult<PageView<PostView>> {
    let total = state.posts.count(&filter).await?;
    let info = state.paginator.page(total, requested);
    let cards = state.posts.list(&filter, &info).await?;

    Ok(views::page(Page::new(cards, info).map(views::post)))
}

/// A bound form that failed validation.
fn invalid_form<F>(data: F, errors: FormErrors) -> FormView<F> {
    FormView::with_errors(data, errors.into_map())
}
