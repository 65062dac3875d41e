use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use blogicum_core::Paginator;
use blogicum_core::domain::{Category, Comment, Post, PostDraft, User};
use blogicum_core::forms::{NON_FIELD_ERRORS, format_pub_date};
use blogicum_core::ports::{
    BaseRepository, Clock, PasswordService, PostFilter, PostRepository, TokenService,
};
use blogicum_core::visibility::Visibility;
use blogicum_infra::{
    Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService, ManualClock,
};

use super::configure_routes;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

struct Harness {
    store: InMemoryStore,
    clock: Arc<ManualClock>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl Harness {
    fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let jwt = JwtConfig {
            secret: "handler-tests".to_string(),
            ..JwtConfig::default()
        };

        Self {
            store: InMemoryStore::new(),
            clock: Arc::new(ManualClock::new(start)),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    fn state(&self) -> AppState {
        AppState::in_memory(&self.store, self.clock.clone(), Paginator::new(10))
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// A stored user and a session token for them.
    async fn user(&self, username: &str) -> (User, String) {
        let user = User::new(username.to_string(), String::new(), "unused".to_string());
        let user = self.store.users().save(user).await.unwrap();
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        (user, token)
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        let mut category = Category::new(slug.to_uppercase(), slug, "");
        category.is_published = is_published;
        self.store.categories().save(category).await.unwrap()
    }

    async fn post(&self, author: &User, pub_date: DateTime<Utc>, category: Option<&Category>) -> Post {
        let draft = PostDraft {
            title: format!("Post at {pub_date}"),
            text: "Text".to_string(),
            pub_date,
            category_id: category.map(|c| c.id),
            location_id: None,
            image: None,
        };
        self.store
            .posts()
            .save(Post::new(author.id, draft, self.now()))
            .await
            .unwrap()
    }

    async fn comment(&self, post: &Post, author: &User, text: &str, at: DateTime<Utc>) -> Comment {
        let comment = Comment::new(post.id, author.id, text.to_string(), at);
        self.store.comments().save(comment).await.unwrap()
    }
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.state()))
                .app_data(web::Data::new($harness.tokens.clone()))
                .app_data(web::Data::new($harness.passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn listed_ids(body: &Value) -> Vec<Uuid> {
    body["page_obj"]["object_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().parse().unwrap())
        .collect()
}

#[actix_web::test]
async fn test_index_lists_only_publicly_visible_posts() {
    let h = Harness::new();
    let app = app!(h);
    let now = h.now();
    let (author, _) = h.user("author").await;
    let news = h.category("news", true).await;
    let drafts = h.category("drafts", false).await;

    let uncategorized = h.post(&author, now - TimeDelta::hours(1), None).await;
    let categorized = h.post(&author, now - TimeDelta::hours(2), Some(&news)).await;
    h.post(&author, now + TimeDelta::hours(1), None).await;
    h.post(&author, now - TimeDelta::hours(3), Some(&drafts)).await;
    let mut unpublished = h.post(&author, now - TimeDelta::hours(4), None).await;
    unpublished.is_published = false;
    h.store.posts().save(unpublished).await.unwrap();

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(listed_ids(&body), vec![uncategorized.id, categorized.id]);
    assert_eq!(body["page_obj"]["count"], 2);
}

#[actix_web::test]
async fn test_detail_of_hidden_post_is_404_except_for_author() {
    let h = Harness::new();
    let app = app!(h);
    let (author, author_token) = h.user("author").await;
    let (_, reader_token) = h.user("reader").await;
    let scheduled = h.post(&author, h.now() + TimeDelta::days(1), None).await;
    let uri = format!("/posts/{}/", scheduled.id);

    let anonymous = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&reader_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&author_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unknown_post_is_404() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", Uuid::new_v4()))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_index_pages_hold_ten_ten_and_five_posts() {
    let h = Harness::new();
    let app = app!(h);
    let (author, _) = h.user("author").await;
    for minutes in 1..=25 {
        h.post(&author, h.now() - TimeDelta::minutes(minutes), None).await;
    }

    for (query, number, len) in [
        ("", 1, 10),
        ("?page=2", 2, 10),
        ("?page=3", 3, 5),
        ("?page=4", 3, 5),
        ("?page=last", 3, 5),
        ("?page=0", 1, 10),
        ("?page=abc", 1, 10),
    ] {
        let req = test::TestRequest::get().uri(&format!("/{query}")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["page_obj"]["number"], number, "query {query:?}");
        assert_eq!(listed_ids(&body).len(), len, "query {query:?}");
        assert_eq!(body["page_obj"]["num_pages"], 3);
    }
}

#[actix_web::test]
async fn test_detail_comments_are_oldest_first() {
    let h = Harness::new();
    let app = app!(h);
    let now = h.now();
    let (author, _) = h.user("author").await;
    let post = h.post(&author, now - TimeDelta::days(1), None).await;
    h.comment(&post, &author, "second", now - TimeDelta::minutes(20)).await;
    h.comment(&post, &author, "third", now - TimeDelta::minutes(10)).await;
    h.comment(&post, &author, "first", now - TimeDelta::minutes(30)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let texts: Vec<&str> = body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(body["post"]["comment_count"], 3);
}

#[actix_web::test]
async fn test_anonymous_mutation_redirects_to_login() {
    let h = Harness::new();
    let app = app!(h);

    let res = test::call_service(&app, test::TestRequest::get().uri("/posts/create/").to_request()).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=%2Fposts%2Fcreate%2F");
}

#[actix_web::test]
async fn test_non_author_cannot_edit_or_delete_post() {
    let h = Harness::new();
    let app = app!(h);
    let (author, _) = h.user("author").await;
    let (_, intruder_token) = h.user("intruder").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let detail = format!("/posts/{}/", post.id);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(bearer(&intruder_token))
        .set_form([("title", "Hijacked"), ("text", "x"), ("pub_date", "2024-01-01T10:00")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", post.id))
        .insert_header(bearer(&intruder_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), detail);

    let stored = h.store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, post.title);
}

#[actix_web::test]
async fn test_non_author_cannot_edit_or_delete_comment() {
    let h = Harness::new();
    let app = app!(h);
    let (author, _) = h.user("author").await;
    let (_, intruder_token) = h.user("intruder").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let comment = h.comment(&post, &author, "original", h.now()).await;
    let base = format!("/posts/{}/comment/{}", post.id, comment.id);

    let req = test::TestRequest::post()
        .uri(&format!("{base}/edit/"))
        .insert_header(bearer(&intruder_token))
        .set_form([("text", "defaced")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", post.id));

    let req = test::TestRequest::post()
        .uri(&format!("{base}/delete/"))
        .insert_header(bearer(&intruder_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", post.id));

    let stored = h.store.comments().find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[actix_web::test]
async fn test_non_author_opening_edit_or_delete_page_is_sent_to_detail() {
    let h = Harness::new();
    let app = app!(h);
    let (author, _) = h.user("author").await;
    let (_, intruder_token) = h.user("intruder").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let comment = h.comment(&post, &author, "mine", h.now()).await;
    let detail = format!("/posts/{}/", post.id);

    for uri in [
        format!("/posts/{}/edit/", post.id),
        format!("/posts/{}/delete/", post.id),
        format!("/posts/{}/comment/{}/edit/", post.id, comment.id),
        format!("/posts/{}/comment/{}/delete/", post.id, comment.id),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&intruder_token))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&res), detail, "{uri}");
    }
}

#[actix_web::test]
async fn test_author_opens_edit_and_delete_pages() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let comment = h.comment(&post, &author, "first thoughts", h.now()).await;
    let get = |uri: String| {
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&token))
            .to_request()
    };

    let res = test::call_service(&app, get(format!("/posts/{}/edit/", post.id))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["form"]["data"]["title"], post.title);
    assert_eq!(body["form"]["data"]["text"], "Text");

    let res = test::call_service(&app, get(format!("/posts/{}/delete/", post.id))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["post"]["id"], post.id.to_string());

    let uri = format!("/posts/{}/comment/{}/edit/", post.id, comment.id);
    let res = test::call_service(&app, get(uri)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["form"]["data"]["text"], "first thoughts");
    assert_eq!(body["comment"]["id"], comment.id.to_string());

    let uri = format!("/posts/{}/comment/{}/delete/", post.id, comment.id);
    let res = test::call_service(&app, get(uri)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["comment"]["text"], "first thoughts");
    assert_eq!(body["post_id"], post.id.to_string());
}

#[actix_web::test]
async fn test_comment_under_another_post_is_404() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let post = h.post(&author, h.now(), None).await;
    let other = h.post(&author, h.now(), None).await;
    let comment = h.comment(&post, &author, "here", h.now()).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/comment/{}/edit/", other.id, comment.id))
        .insert_header(bearer(&token))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_future_post_appears_on_index_once_its_date_passes() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let pub_date = format_pub_date(h.now() + TimeDelta::days(1));

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&token))
        .set_form([
            ("title", "Tomorrow"),
            ("text", "Scheduled"),
            ("pub_date", pub_date.as_str()),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/author/");

    let index = || test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, index()).await;
    assert!(listed_ids(&body).is_empty());

    let req = test::TestRequest::get()
        .uri("/profile/author/")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed_ids(&body).len(), 1);
    assert_eq!(body["is_owner"], true);

    let req = test::TestRequest::get().uri("/profile/author/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(listed_ids(&body).is_empty());

    h.clock.advance(TimeDelta::days(2));

    let body: Value = test::call_and_read_body_json(&app, index()).await;
    assert_eq!(listed_ids(&body).len(), 1);
    assert_eq!(body["page_obj"]["object_list"][0]["author"]["id"], author.id.to_string());
}

#[actix_web::test]
async fn test_profile_visitor_sees_dated_posts_in_hidden_categories() {
    let h = Harness::new();
    let app = app!(h);
    let (author, _) = h.user("author").await;
    let hidden = h.category("hidden", false).await;
    h.post(&author, h.now() - TimeDelta::hours(1), Some(&hidden)).await;

    let req = test::TestRequest::get().uri("/profile/author/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(listed_ids(&body).len(), 1);
    assert_eq!(body["is_owner"], false);
}

#[actix_web::test]
async fn test_invalid_post_form_is_rerendered_with_errors() {
    let h = Harness::new();
    let app = app!(h);
    let (_, token) = h.user("author").await;
    let missing_category = Uuid::new_v4().to_string();

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&token))
        .set_form([("title", ""), ("text", "Body"), ("pub_date", "not a date")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["form"]["errors"]["title"].is_array());
    assert!(body["form"]["errors"]["pub_date"].is_array());
    assert_eq!(body["form"]["data"]["text"], "Body");

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&token))
        .set_form([
            ("title", "Title"),
            ("text", "Body"),
            ("pub_date", "2024-04-01 09:30"),
            ("category", missing_category.as_str()),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["form"]["errors"]["category"][0], "Select a valid choice.");

    let everything = PostFilter::new(Visibility::Everything);
    assert_eq!(h.store.posts().count(&everything).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_author_edits_post() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["form"]["data"]["title"], post.title);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(bearer(&token))
        .set_form([("title", "Revised"), ("text", "New text"), ("pub_date", "2024-04-30T08:00")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", post.id));

    let stored = h.store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Revised");
    assert_eq!(stored.author_id, author.id);
}

#[actix_web::test]
async fn test_deleting_post_removes_its_comments() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let comment = h.comment(&post, &author, "soon gone", h.now()).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/delete/", post.id))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["id"], post.id.to_string());

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", post.id))
        .insert_header(bearer(&token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/");

    assert!(h.store.posts().find_by_id(post.id).await.unwrap().is_none());
    assert!(h.store.comments().find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_adding_comments() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let comment_uri = format!("/posts/{}/comment/", post.id);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", Uuid::new_v4()))
        .insert_header(bearer(&token))
        .set_form([("text", "hello")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .insert_header(bearer(&token))
        .set_form([("text", "   ")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), format!("/posts/{}/", post.id));

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .insert_header(bearer(&token))
        .set_form([("text", "Nice post")])
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Nice post");
    assert_eq!(comments[0]["author"]["username"], "author");
}

#[actix_web::test]
async fn test_author_edits_comment() {
    let h = Harness::new();
    let app = app!(h);
    let (author, token) = h.user("author").await;
    let post = h.post(&author, h.now() - TimeDelta::hours(1), None).await;
    let comment = h.comment(&post, &author, "typo", h.now()).await;
    let uri = format!("/posts/{}/comment/{}/edit/", post.id, comment.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_form([("text", "")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["form"]["errors"]["text"].is_array());

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_form([("text", "fixed")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let stored = h.store.comments().find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "fixed");
}

#[actix_web::test]
async fn test_category_page() {
    let h = Harness::new();
    let app = app!(h);
    let (author, _) = h.user("author").await;
    let travel = h.category("travel", true).await;
    h.category("secret", false).await;
    let in_travel = h.post(&author, h.now() - TimeDelta::hours(1), Some(&travel)).await;
    h.post(&author, h.now() - TimeDelta::hours(1), None).await;

    let req = test::TestRequest::get().uri("/category/travel/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["category"]["slug"], "travel");
    assert_eq!(listed_ids(&body), vec![in_travel.id]);

    for uri in ["/category/secret/", "/category/missing/"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_unknown_profile_is_404() {
    let h = Harness::new();
    let app = app!(h);

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/nobody/").to_request()).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_registration_login_and_logout() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "newbie"),
            ("email", "newbie@example.com"),
            ("password1", "s3cret-pass"),
            ("password2", "s3cret-pass"),
        ])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/auth/login/");

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "newbie"), ("password", "wrong-pass")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["form"]["errors"][NON_FIELD_ERRORS].is_array());
    assert!(body["form"]["data"].get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "newbie"), ("password", "s3cret-pass")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/profile/newbie/");
    let session = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/posts/create/")
        .cookie(Cookie::new(SESSION_COOKIE, session))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/logout/").to_request()).await;
    assert_eq!(location(&res), "/");
    let cleared = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn test_registration_rejects_taken_username() {
    let h = Harness::new();
    let app = app!(h);
    h.user("taken").await;

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "taken"),
            ("password1", "long-enough"),
            ("password2", "long-enough"),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body["form"]["errors"]["username"][0],
        "A user with that username already exists."
    );
}

#[actix_web::test]
async fn test_profile_rename_moves_profile_url() {
    let h = Harness::new();
    let app = app!(h);
    let (_, token) = h.user("before").await;
    h.user("occupied").await;

    let req = test::TestRequest::post()
        .uri("/profile/edit/")
        .insert_header(bearer(&token))
        .set_form([("username", "occupied")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["form"]["errors"]["username"].is_array());

    let req = test::TestRequest::post()
        .uri("/profile/edit/")
        .insert_header(bearer(&token))
        .set_form([("username", "after"), ("first_name", "Anna")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/profile/after/");

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/after/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["profile"]["first_name"], "Anna");

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/before/").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_created_after_rename_redirects_to_current_profile() {
    let h = Harness::new();
    let app = app!(h);
    let (_, token) = h.user("before").await;

    let req = test::TestRequest::post()
        .uri("/profile/edit/")
        .insert_header(bearer(&token))
        .set_form([("username", "after")])
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/profile/after/");

    let pub_date = format_pub_date(h.now());
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&token))
        .set_form([("title", "Renamed"), ("text", "Body"), ("pub_date", pub_date.as_str())])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/after/");
}

#[actix_web::test]
async fn test_profile_email_is_shown_only_to_owner() {
    let h = Harness::new();
    let app = app!(h);
    let user = User::new(
        "writer".to_string(),
        "writer@example.com".to_string(),
        "unused".to_string(),
    );
    let user = h.store.users().save(user).await.unwrap();
    let token = h.tokens.generate_token(user.id, &user.username).unwrap();
    let (_, visitor_token) = h.user("visitor").await;

    let req = test::TestRequest::get().uri("/profile/writer/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile"]["username"], "writer");
    assert!(body["profile"].get("email").is_none());

    let req = test::TestRequest::get()
        .uri("/profile/writer/")
        .insert_header(bearer(&visitor_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["profile"].get("email").is_none());

    let req = test::TestRequest::get()
        .uri("/profile/writer/")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile"]["email"], "writer@example.com");
}

#[actix_web::test]
async fn test_health() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
