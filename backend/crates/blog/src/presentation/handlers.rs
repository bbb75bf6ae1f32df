//! Public HTTP Handlers

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::id::UserId;
use kernel::json::Json;
use kernel::pagination::{Page, PageRequest};
use kernel::principal::CurrentUser;
use platform::cache::CacheService;
use platform::client::ClientInfo;
use platform::tasks::TaskQueue;
use std::sync::Arc;

use crate::application::{
    BlogConfig, BlogJob, CommentsUseCase, PostDetail, PostListItem, PublicComment,
    PublicPostsUseCase, ReactionOutcome, ReactionsUseCase, Reactor, TaxonomyBrief,
};
use crate::domain::repository::{BlogStore, PublicPostQuery};
use crate::domain::value_objects::{PostOrdering, ReactionType};
use crate::error::{BlogError, BlogResult};
use crate::presentation::dto::{CommentRequest, PostListQuery, ReactionRequest, StatusResponse};

/// Shared state for blog handlers
#[derive(Clone)]
pub struct BlogAppState<R: BlogStore> {
    pub repo: Arc<R>,
    pub cache: CacheService,
    pub config: Arc<BlogConfig>,
    pub jobs: TaskQueue<BlogJob>,
}

fn public_posts<R: BlogStore>(state: &BlogAppState<R>) -> PublicPostsUseCase<R> {
    PublicPostsUseCase::new(
        state.repo.clone(),
        state.cache.clone(),
        state.config.clone(),
        state.jobs.clone(),
    )
}

// ============================================================================
// Posts
// ============================================================================

/// GET /blogs
pub async fn list_posts<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    Query(params): Query<PostListQuery>,
) -> BlogResult<Json<Page<PostListItem>>> {
    let author = non_blank(params.author)
        .map(|raw| {
            raw.parse::<UserId>()
                .map_err(|_| BlogError::validation("author", "Enter a valid UUID."))
        })
        .transpose()?;
    let q = non_blank(params.q);
    let ordering = PostOrdering::resolve(params.ordering.as_deref(), q.is_some());

    let query = PublicPostQuery {
        category: non_blank(params.category),
        tag: non_blank(params.tag),
        author,
        q,
        ordering,
        page: PageRequest::new(params.page, params.page_size),
    };

    Ok(Json(public_posts(&state).list(query).await?))
}

/// GET /blogs/{slug}
pub async fn get_post<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    Path(slug): Path<String>,
) -> BlogResult<Json<PostDetail>> {
    Ok(Json(public_posts(&state).detail(&slug).await?))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /blogs/{slug}/comments
pub async fn list_comments<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    Path(slug): Path<String>,
) -> BlogResult<Json<Vec<PublicComment>>> {
    let use_case = CommentsUseCase::new(state.repo.clone(), state.cache.clone(), state.config.clone());

    Ok(Json(use_case.list(&slug).await?))
}

/// POST /blogs/{slug}/comments
pub async fn create_comment<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    Path(slug): Path<String>,
    CurrentUser(principal): CurrentUser,
    client: ClientInfo,
    Json(req): Json<CommentRequest>,
) -> BlogResult<impl IntoResponse> {
    let use_case = CommentsUseCase::new(state.repo.clone(), state.cache.clone(), state.config.clone());
    use_case
        .submit(&slug, req.into(), principal.as_ref(), &client)
        .await?;

    Ok((StatusCode::CREATED, Json(StatusResponse::new("submitted"))))
}

// ============================================================================
// Reactions
// ============================================================================

/// POST /blogs/{slug}/reactions
///
/// Anonymous callers get an `anon_sid` cookie when they have none.
pub async fn react<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    Path(slug): Path<String>,
    CurrentUser(principal): CurrentUser,
    client: ClientInfo,
    headers: HeaderMap,
    body: Bytes,
) -> BlogResult<Response> {
    let req: ReactionRequest = serde_json::from_slice(&body).unwrap_or_default();
    let reaction_type = ReactionType::parse(req.reaction_type.as_deref())?;
    let use_case =
        ReactionsUseCase::new(state.repo.clone(), state.cache.clone(), state.config.clone());

    let (outcome, set_cookie) = match principal.as_ref() {
        Some(principal) => {
            let outcome = use_case
                .react(&slug, reaction_type, Reactor::User(principal), &client)
                .await?;
            (outcome, None)
        }
        None => {
            let (session, set_cookie) = state.config.anon_cookie.get_or_issue(&headers);
            let outcome = use_case
                .react(&slug, reaction_type, Reactor::Anonymous(&session), &client)
                .await?;
            (outcome, set_cookie)
        }
    };

    let status = match outcome {
        ReactionOutcome::Recorded => StatusCode::CREATED,
        ReactionOutcome::Duplicate => StatusCode::OK,
    };
    let mut response = (status, Json(StatusResponse::new("ok"))).into_response();
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// DELETE /blogs/{slug}/reactions
pub async fn unreact<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    Path(slug): Path<String>,
    CurrentUser(principal): CurrentUser,
    body: Bytes,
) -> BlogResult<StatusCode> {
    let req: ReactionRequest = serde_json::from_slice(&body).unwrap_or_default();
    let reaction_type = ReactionType::parse(req.reaction_type.as_deref())?;

    ReactionsUseCase::new(state.repo.clone(), state.cache.clone(), state.config.clone())
        .unreact(&slug, reaction_type, principal.as_ref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Taxonomy / Sitemap
// ============================================================================

/// GET /categories
pub async fn list_categories<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
) -> BlogResult<Json<Vec<TaxonomyBrief>>> {
    Ok(Json(public_posts(&state).categories().await?))
}

/// GET /tags
pub async fn list_tags<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
) -> BlogResult<Json<Vec<TaxonomyBrief>>> {
    Ok(Json(public_posts(&state).tags().await?))
}

/// GET /sitemap.xml
pub async fn sitemap<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
) -> BlogResult<impl IntoResponse> {
    let xml = public_posts(&state).sitemap().await?;

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
