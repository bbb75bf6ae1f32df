//! HTTP flow tests for the blog crate
//!
//! Requests go through the real router with the in-memory repository, the
//! in-memory cache and a detached job queue. A small middleware stands in
//! for bearer authentication and attaches the principal named by the
//! `x-test-user` header.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use kernel::Principal;
use kernel::id::{PostId, UserId};
use platform::cache::CacheService;
use platform::tasks::{JobHandler, TaskQueue};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use crate::application::{BlogConfig, BlogJob, BlogJobHandler};
use crate::infra::InMemoryBlogRepository;
use crate::presentation::router::{blog_router_generic, sitemap_router};

#[derive(Debug, Clone, Copy)]
enum Caller {
    Anonymous,
    Reader(UserId),
    Staff(UserId),
}

async fn fake_auth(mut req: Request<Body>, next: Next) -> Response {
    let user_id = req
        .headers()
        .get("x-test-user")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<UserId>().ok());
    if let Some(user_id) = user_id {
        let is_staff = req.headers().contains_key("x-test-staff");
        req.extensions_mut().insert(Principal {
            user_id,
            email: format!("{user_id}@example.com"),
            username: Some(if is_staff { "editor" } else { "reader" }.to_string()),
            is_staff,
        });
    }
    next.run(req).await
}

struct TestApp {
    router: Router,
    sitemap: Router,
    repo: InMemoryBlogRepository,
    cache: CacheService,
    jobs: mpsc::Receiver<BlogJob>,
    staff: Caller,
}

impl TestApp {
    fn new() -> Self {
        let repo = InMemoryBlogRepository::new();
        let cache = CacheService::in_memory();
        let config = Arc::new(BlogConfig::development().with_site_url("https://blog.example.com"));
        let (queue, jobs) = TaskQueue::detached("blog-test", 64);

        let shared = Arc::new(repo.clone());
        let router = blog_router_generic(shared.clone(), cache.clone(), config.clone(), queue.clone())
            .layer(from_fn(fake_auth));
        let sitemap = sitemap_router(shared, cache.clone(), config, queue);

        Self {
            router,
            sitemap,
            repo,
            cache,
            jobs,
            staff: Caller::Staff(UserId::new()),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        caller: Caller,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        match caller {
            Caller::Anonymous => {}
            Caller::Reader(id) => builder = builder.header("x-test-user", id.to_string()),
            Caller::Staff(id) => {
                builder = builder
                    .header("x-test-user", id.to_string())
                    .header("x-test-staff", "1")
            }
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, value)
    }

    async fn get(&self, uri: &str, caller: Caller) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::GET, uri, caller, None, None).await;
        (status, body)
    }

    async fn post(&self, uri: &str, caller: Caller, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::POST, uri, caller, Some(body), None).await;
        (status, body)
    }

    /// Create a post as staff and return the response body.
    async fn create_post(&self, body: Value) -> Value {
        let (status, post) = self.post("/admin/blogs", self.staff, body).await;
        assert_eq!(status, StatusCode::CREATED, "{post}");
        post
    }

    async fn publish(&self, title: &str) -> Value {
        self.create_post(json!({
            "title": title,
            "content": format!("<p>{title} body text</p>"),
            "status": "published",
        }))
        .await
    }
}

fn post_id(post: &Value) -> PostId {
    post["id"].as_str().unwrap().parse().unwrap()
}

// ============================================================================
// Admin access
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_staff() {
    let app = TestApp::new();

    let (status, _) = app.get("/admin/blogs", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/admin/blogs", Caller::Reader(UserId::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/admin/blogs", app.staff).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_registry_lists_managed_entities() {
    let app = TestApp::new();

    let (status, body) = app.get("/admin/registry", app.staff).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["name"], "post");
    assert_eq!(entries[0]["actions"], json!(["publish", "draft", "archive"]));
    assert_eq!(entries[3]["name"], "comment");
    assert_eq!(entries[3]["create"], false);
}

// ============================================================================
// Posts
// ============================================================================

#[tokio::test]
async fn test_create_sanitizes_and_stamps_publication() {
    let app = TestApp::new();

    let post = app
        .create_post(json!({
            "title": "Hello World",
            "content": "<p>Safe <script>alert(1)</script><a href=\"javascript:x()\">link</a></p>",
            "status": "published",
        }))
        .await;

    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["status"], "published");
    assert!(!post["published_at"].is_null());
    assert_eq!(post["reading_time_minutes"], 1);
    let content = post["content"].as_str().unwrap();
    assert!(!content.contains("script"), "{content}");
    assert!(!content.contains("javascript"), "{content}");
    assert_eq!(post["author"]["username"], "editor");

    let (status, detail) = app.get("/blogs/hello-world", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Hello World");
    assert_eq!(detail["allow_comments"], true);
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
    let app = TestApp::new();
    app.publish("Same Title").await;

    let (status, body) = app
        .post("/admin/blogs", app.staff, json!({"title": "Same Title"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["slug"].is_array(), "{body}");
}

#[tokio::test]
async fn test_unknown_category_and_tags_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/admin/blogs",
            app.staff,
            json!({"title": "T", "category": "missing"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["category"].is_array(), "{body}");

    let (status, body) = app
        .post("/admin/blogs", app.staff, json!({"title": "T", "tags": ["nope"]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["tags"].is_array(), "{body}");
}

#[tokio::test]
async fn test_drafts_and_scheduled_posts_are_hidden() {
    let app = TestApp::new();
    app.create_post(json!({"title": "Draft"})).await;
    app.create_post(json!({
        "title": "Later",
        "status": "published",
        "published_at": "2999-01-01T00:00:00Z",
    }))
    .await;

    let (status, body) = app.get("/blogs", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["results"], json!([]));

    let (status, _) = app.get("/blogs/draft", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/blogs/later", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, admin) = app.get("/admin/blogs?status=draft", app.staff).await;
    assert_eq!(admin["count"], 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_not_found() {
    let app = TestApp::new();
    app.publish("Only").await;

    let (status, body) = app.get("/blogs?page=2", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invalid page.");
}

#[tokio::test]
async fn test_patch_keeps_fields_and_put_resets_them() {
    let app = TestApp::new();
    app.create_post(json!({
        "title": "Original",
        "summary": "Kept",
        "status": "published",
        "allow_comments": false,
    }))
    .await;

    let (status, _, post) = app
        .send(
            Method::PATCH,
            "/admin/blogs/original",
            app.staff,
            Some(json!({"title": "Renamed"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{post}");
    assert_eq!(post["title"], "Renamed");
    assert_eq!(post["slug"], "original");
    assert_eq!(post["summary"], "Kept");
    assert_eq!(post["status"], "published");
    assert_eq!(post["allow_comments"], false);

    let (status, _, post) = app
        .send(
            Method::PUT,
            "/admin/blogs/original",
            app.staff,
            Some(json!({"title": "Replaced"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{post}");
    assert_eq!(post["slug"], "replaced");
    assert_eq!(post["summary"], "");
    assert_eq!(post["status"], "draft");
    assert_eq!(post["allow_comments"], true);

    let (status, _) = app.get("/admin/blogs/original", app.staff).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_evicts_cached_detail() {
    let app = TestApp::new();
    app.publish("Cached").await;

    let (_, detail) = app.get("/blogs/cached", Caller::Anonymous).await;
    assert_eq!(detail["summary"], "");

    app.send(
        Method::PATCH,
        "/admin/blogs/cached",
        app.staff,
        Some(json!({"summary": "Fresh"})),
        None,
    )
    .await;

    let (_, detail) = app.get("/blogs/cached", Caller::Anonymous).await;
    assert_eq!(detail["summary"], "Fresh");
}

#[tokio::test]
async fn test_bulk_actions() {
    let app = TestApp::new();
    app.create_post(json!({"title": "One"})).await;
    app.create_post(json!({"title": "Two"})).await;

    let (status, body) = app
        .post(
            "/admin/blogs/actions/publish",
            app.staff,
            json!({"slugs": ["one", "two", "ghost"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, list) = app.get("/blogs", Caller::Anonymous).await;
    assert_eq!(list["count"], 2);

    let (status, _) = app
        .post("/admin/blogs/actions/explode", app.staff, json!({"slugs": ["one"]}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_post() {
    let app = TestApp::new();
    app.publish("Doomed").await;

    let (status, _, _) = app
        .send(Method::DELETE, "/admin/blogs/doomed", app.staff, None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app
        .send(Method::DELETE, "/admin/blogs/doomed", app.staff, None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Public reads
// ============================================================================

#[tokio::test]
async fn test_taxonomy_filters() {
    let app = TestApp::new();
    let (status, category) = app
        .post("/admin/categories", app.staff, json!({"name": "Rust"}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{category}");
    assert_eq!(category["slug"], "rust");
    let (status, _) = app
        .post("/admin/tags", app.staff, json!({"name": "Async IO"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post("/admin/categories", app.staff, json!({"name": "Rust"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_post(json!({
        "title": "Tokio Tips",
        "status": "published",
        "category": "rust",
        "tags": ["async-io"],
    }))
    .await;
    app.publish("Unrelated").await;

    let (_, body) = app.get("/blogs?category=rust", Caller::Anonymous).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["category"], json!({"name": "Rust", "slug": "rust"}));
    assert_eq!(body["results"][0]["tags"][0]["slug"], "async-io");

    let (_, body) = app.get("/blogs?tag=async-io", Caller::Anonymous).await;
    assert_eq!(body["count"], 1);

    let (_, body) = app.get("/blogs?q=tokio", Caller::Anonymous).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["slug"], "tokio-tips");

    let (_, categories) = app.get("/categories", Caller::Anonymous).await;
    assert_eq!(categories, json!([{"name": "Rust", "slug": "rust"}]));
    let (_, tags) = app.get("/tags", Caller::Anonymous).await;
    assert_eq!(tags, json!([{"name": "Async IO", "slug": "async-io"}]));

    let (status, _, _) = app
        .send(Method::DELETE, "/admin/categories/rust", app.staff, None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, post) = app.get("/admin/blogs/tokio-tips", app.staff).await;
    assert!(post["category"].is_null());
}

#[tokio::test]
async fn test_list_is_cached_under_normalized_key() {
    let app = TestApp::new();
    app.publish("First").await;

    let (_, body) = app.get("/blogs", Caller::Anonymous).await;
    assert_eq!(body["count"], 1);

    app.publish("Second").await;

    // Same key as the default ordering, so the cached page answers.
    let (_, body) = app.get("/blogs?ordering=bogus", Caller::Anonymous).await;
    assert_eq!(body["count"], 1);

    app.cache.flush().await.unwrap();
    let (_, body) = app.get("/blogs?ordering=bogus", Caller::Anonymous).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["slug"], "second");
}

#[tokio::test]
async fn test_invalid_author_filter() {
    let app = TestApp::new();

    let (status, body) = app.get("/blogs?author=not-a-uuid", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["author"].is_array(), "{body}");
}

#[tokio::test]
async fn test_detail_queues_view_increment() {
    let mut app = TestApp::new();
    app.publish("Counted").await;

    let (status, _) = app.get("/blogs/counted", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/blogs/counted", Caller::Anonymous).await;
    assert_eq!(status, StatusCode::OK);

    let handler = BlogJobHandler::new(Arc::new(app.repo.clone()), app.cache.clone());
    let mut handled = 0;
    while let Ok(job) = app.jobs.try_recv() {
        assert_eq!(
            job,
            BlogJob::IncrementViews {
                slug: "counted".to_string()
            }
        );
        handler.handle(job).await.unwrap();
        handled += 1;
    }
    assert_eq!(handled, 2);
    assert_eq!(app.repo.views("counted").await, Some(2));

    let (_, detail) = app.get("/blogs/counted", Caller::Anonymous).await;
    assert_eq!(detail["views_count"], 2);
}

#[tokio::test]
async fn test_sitemap() {
    let app = TestApp::new();
    app.publish("Mapped").await;
    app.create_post(json!({"title": "Hidden"})).await;

    let request = Request::builder()
        .uri("/sitemap.xml")
        .body(Body::empty())
        .unwrap();
    let response = app.sitemap.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(xml.contains("<loc>https://blog.example.com/blog/mapped</loc>"));
    assert!(!xml.contains("hidden"));
}

#[tokio::test]
async fn test_analytics_ranks_by_views() {
    let app = TestApp::new();
    app.publish("Popular").await;
    app.publish("Quiet").await;
    for _ in 0..3 {
        crate::domain::repository::PostRepository::increment_views(&app.repo, "popular")
            .await
            .unwrap();
    }

    let (status, body) = app.get("/admin/blogs/analytics", app.staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_posts"][0]["slug"], "popular");
    assert_eq!(body["top_posts"][0]["views_count"], 3);
    assert_eq!(body["top_posts"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_comment_moderation_flow() {
    let app = TestApp::new();
    app.publish("Discussed").await;

    let (status, body) = app
        .post(
            "/blogs/discussed/comments",
            Caller::Anonymous,
            json!({
                "content": "<strong>hi</strong><script>x</script>",
                "author_name": "Guest",
                "author_email": "Guest@Example.com",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"status": "submitted"}));

    let (_, public) = app.get("/blogs/discussed/comments", Caller::Anonymous).await;
    assert_eq!(public, json!([]));

    let (_, pending) = app.get("/admin/comments?is_approved=false", app.staff).await;
    assert_eq!(pending["count"], 1);
    let comment_id = pending["results"][0]["id"].clone();
    assert!(!pending["results"][0]["content"].as_str().unwrap().contains("script"));

    let (status, body) = app
        .post("/admin/comments/approve", app.staff, json!({"ids": [comment_id]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, public) = app.get("/blogs/discussed/comments", Caller::Anonymous).await;
    assert_eq!(public[0]["author_display"], "Guest");
    assert_eq!(public[0]["content"], "<strong>hi</strong>");
}

#[tokio::test]
async fn test_staff_comments_are_approved_immediately() {
    let app = TestApp::new();
    app.publish("Staffed").await;

    let (status, _) = app
        .post("/blogs/staffed/comments", app.staff, json!({"content": "Official"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/blogs/staffed/comments",
            Caller::Reader(UserId::new()),
            json!({"content": "Pending"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, public) = app.get("/blogs/staffed/comments", Caller::Anonymous).await;
    let public = public.as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["author_display"], "editor");
}

#[tokio::test]
async fn test_comment_rules() {
    let app = TestApp::new();
    app.create_post(json!({
        "title": "Closed",
        "status": "published",
        "allow_comments": false,
    }))
    .await;
    app.publish("Open").await;

    let (status, body) = app
        .post("/blogs/closed/comments", Caller::Anonymous, json!({"content": "hi"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Comments are disabled.");

    let (status, _) = app
        .post(
            "/blogs/open/comments",
            Caller::Anonymous,
            json!({"content": "<script>only</script>"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/blogs/missing/comments",
            Caller::Reader(UserId::new()),
            json!({"content": "hi"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_comments_are_throttled() {
    let app = TestApp::new();
    app.publish("Busy").await;

    for _ in 0..5 {
        let (status, _) = app
            .post("/blogs/busy/comments", Caller::Anonymous, json!({"content": "hi"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = app
        .post("/blogs/busy/comments", Caller::Anonymous, json!({"content": "hi"}))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = app
        .post(
            "/blogs/busy/comments",
            Caller::Reader(UserId::new()),
            json!({"content": "hi"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_anonymous_reaction_issues_cookie() {
    let app = TestApp::new();
    let post = app.publish("Liked").await;

    let (status, headers, body) = app
        .send(Method::POST, "/blogs/liked/reactions", Caller::Anonymous, None, None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"status": "ok"}));
    let cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("anon_sid="), "{cookie}");
    assert_eq!(app.repo.reaction_count(post_id(&post)).await, 1);

    let (_, detail) = app.get("/blogs/liked", Caller::Anonymous).await;
    assert_eq!(detail["likes_count"], 1);
}

#[tokio::test]
async fn test_concurrent_anonymous_reactions_store_one_row() {
    let app = TestApp::new();
    let post = app.publish("Raced").await;
    let cookie = Some("anon_sid=fixed-session-0001");
    let body = Some(json!({"type": "love"}));

    let (first, second) = tokio::join!(
        app.send(Method::POST, "/blogs/raced/reactions", Caller::Anonymous, body.clone(), cookie),
        app.send(Method::POST, "/blogs/raced/reactions", Caller::Anonymous, body.clone(), cookie),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CREATED]);
    assert!(first.1.get(header::SET_COOKIE).is_none());
    assert_eq!(app.repo.reaction_count(post_id(&post)).await, 1);
}

#[tokio::test]
async fn test_user_reactions_are_idempotent() {
    let app = TestApp::new();
    let post = app.publish("Loved").await;
    let reader = Caller::Reader(UserId::new());

    for _ in 0..2 {
        let (status, body) = app
            .post("/blogs/loved/reactions", reader, json!({"type": "like"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "ok");
    }
    assert_eq!(app.repo.reaction_count(post_id(&post)).await, 1);

    let (status, _, _) = app
        .send(
            Method::DELETE,
            "/blogs/loved/reactions",
            reader,
            Some(json!({"type": "like"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.repo.reaction_count(post_id(&post)).await, 0);

    let (status, _, _) = app
        .send(Method::DELETE, "/blogs/loved/reactions", Caller::Anonymous, None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_reaction_type() {
    let app = TestApp::new();
    app.publish("Typed").await;

    let (status, body) = app
        .post("/blogs/typed/reactions", Caller::Anonymous, json!({"type": "angry"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["type"].is_array(), "{body}");

    let (status, _) = app
        .post("/blogs/ghost/reactions", Caller::Anonymous, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Media
// ============================================================================

#[tokio::test]
async fn test_media_lifecycle() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/admin/media",
            app.staff,
            json!({"file_url": "https://cdn.example.com/a.png", "mime_type": "png"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, asset) = app
        .post(
            "/admin/media",
            app.staff,
            json!({
                "file_url": "https://cdn.example.com/a.png",
                "mime_type": "image/png",
                "width": 640,
                "height": 480,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{asset}");

    let (_, list) = app.get("/admin/media", app.staff).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["width"], 640);

    let uri = format!("/admin/media/{}", asset["id"].as_str().unwrap());
    let (status, _, _) = app.send(Method::DELETE, &uri, app.staff, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = app.send(Method::DELETE, &uri, app.staff, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
