//! Staff-only HTTP Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{CommentId, MediaAssetId};
use kernel::json::Json;
use kernel::pagination::{Page, PageRequest};
use kernel::principal::RequireStaff;

use crate::application::{AdminContentUseCase, AdminPostsUseCase, WriteMode, registry};
use crate::domain::admin::PostBulkAction;
use crate::domain::repository::{AdminPostQuery, BlogStore};
use crate::domain::value_objects::PostStatus;
use crate::error::{BlogError, BlogResult};
use crate::presentation::dto::{
    AdminCommentQuery, AdminCommentResponse, AdminPostListQuery, AdminPostResponse,
    AnalyticsQuery, AnalyticsResponse, ApproveCommentsRequest, BulkActionRequest,
    CategoryRequest, CategoryResponse, MediaListQuery, MediaRequest, MediaResponse,
    PostViewsResponse, PostWriteRequest, RegistryEntry, TagRequest, TagResponse,
    UpdatedResponse,
};
use crate::presentation::handlers::BlogAppState;

fn admin_posts<R: BlogStore>(state: &BlogAppState<R>) -> AdminPostsUseCase<R> {
    AdminPostsUseCase::new(state.repo.clone(), state.cache.clone())
}

fn admin_content<R: BlogStore>(state: &BlogAppState<R>) -> AdminContentUseCase<R> {
    AdminContentUseCase::new(state.repo.clone())
}

// ============================================================================
// Posts
// ============================================================================

/// GET /admin/blogs
pub async fn list_posts<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<AdminPostListQuery>,
) -> BlogResult<Json<Page<AdminPostResponse>>> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(PostStatus::parse(raw).ok_or_else(|| {
            BlogError::validation("status", format!("\"{raw}\" is not a valid choice."))
        })?),
    };
    let query = AdminPostQuery {
        status,
        search: params.search.filter(|s| !s.trim().is_empty()),
        page: PageRequest::new(params.page, params.page_size),
    };

    let page = admin_posts(&state).list(query).await?;
    Ok(Json(page.map(AdminPostResponse::from)))
}

/// POST /admin/blogs
pub async fn create_post<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(staff): RequireStaff,
    Json(req): Json<PostWriteRequest>,
) -> BlogResult<impl IntoResponse> {
    let post = admin_posts(&state).create(req.into(), &staff).await?;

    Ok((StatusCode::CREATED, Json(AdminPostResponse::from(post))))
}

/// GET /admin/blogs/{slug}
pub async fn get_post<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(slug): Path<String>,
) -> BlogResult<Json<AdminPostResponse>> {
    let post = admin_posts(&state).get(&slug).await?;

    Ok(Json(AdminPostResponse::from(post)))
}

/// PUT /admin/blogs/{slug}
pub async fn replace_post<R: BlogStore>(
    state: State<BlogAppState<R>>,
    staff: RequireStaff,
    slug: Path<String>,
    Json(req): Json<PostWriteRequest>,
) -> BlogResult<Json<AdminPostResponse>> {
    update_post(state, staff, slug, req, WriteMode::Replace).await
}

/// PATCH /admin/blogs/{slug}
pub async fn patch_post<R: BlogStore>(
    state: State<BlogAppState<R>>,
    staff: RequireStaff,
    slug: Path<String>,
    Json(req): Json<PostWriteRequest>,
) -> BlogResult<Json<AdminPostResponse>> {
    update_post(state, staff, slug, req, WriteMode::Partial).await
}

async fn update_post<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(slug): Path<String>,
    req: PostWriteRequest,
    mode: WriteMode,
) -> BlogResult<Json<AdminPostResponse>> {
    let post = admin_posts(&state).update(&slug, req.into(), mode).await?;

    Ok(Json(AdminPostResponse::from(post)))
}

/// DELETE /admin/blogs/{slug}
pub async fn delete_post<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(slug): Path<String>,
) -> BlogResult<StatusCode> {
    admin_posts(&state).delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/blogs/actions/{action}
pub async fn bulk_action<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(action): Path<String>,
    Json(req): Json<BulkActionRequest>,
) -> BlogResult<Json<UpdatedResponse>> {
    let action = PostBulkAction::parse(&action).ok_or(BlogError::NotFound)?;
    let updated = admin_posts(&state).bulk(action, &req.slugs).await?;

    Ok(Json(UpdatedResponse { updated }))
}

/// GET /admin/blogs/analytics
pub async fn analytics<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<AnalyticsQuery>,
) -> BlogResult<Json<AnalyticsResponse>> {
    let limit = params
        .limit
        .unwrap_or(state.config.analytics_top_n)
        .clamp(1, 100);
    let top = admin_posts(&state).analytics(limit).await?;

    Ok(Json(AnalyticsResponse {
        top_posts: top.into_iter().map(PostViewsResponse::from).collect(),
    }))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /admin/comments
pub async fn list_comments<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<AdminCommentQuery>,
) -> BlogResult<Json<Page<AdminCommentResponse>>> {
    let page = admin_content(&state)
        .list_comments(params.is_approved, PageRequest::new(params.page, params.page_size))
        .await?;

    Ok(Json(page.map(AdminCommentResponse::from)))
}

/// POST /admin/comments/approve
pub async fn approve_comments<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Json(req): Json<ApproveCommentsRequest>,
) -> BlogResult<Json<UpdatedResponse>> {
    let updated = admin_content(&state).approve_comments(&req.ids).await?;

    Ok(Json(UpdatedResponse { updated }))
}

/// DELETE /admin/comments/{id}
pub async fn delete_comment<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<CommentId>,
) -> BlogResult<StatusCode> {
    admin_content(&state).delete_comment(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories / Tags
// ============================================================================

/// GET /admin/categories
pub async fn list_categories<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
) -> BlogResult<Json<Vec<CategoryResponse>>> {
    let categories = admin_content(&state).list_categories().await?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// POST /admin/categories
pub async fn create_category<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Json(req): Json<CategoryRequest>,
) -> BlogResult<impl IntoResponse> {
    let category = admin_content(&state).create_category(req.into()).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// DELETE /admin/categories/{slug}
pub async fn delete_category<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(slug): Path<String>,
) -> BlogResult<StatusCode> {
    admin_content(&state).delete_category(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/tags
pub async fn list_tags<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
) -> BlogResult<Json<Vec<TagResponse>>> {
    let tags = admin_content(&state).list_tags().await?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// POST /admin/tags
pub async fn create_tag<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Json(req): Json<TagRequest>,
) -> BlogResult<impl IntoResponse> {
    let tag = admin_content(&state).create_tag(req.into()).await?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

/// DELETE /admin/tags/{slug}
pub async fn delete_tag<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(slug): Path<String>,
) -> BlogResult<StatusCode> {
    admin_content(&state).delete_tag(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Media
// ============================================================================

/// GET /admin/media
pub async fn list_media<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<MediaListQuery>,
) -> BlogResult<Json<Page<MediaResponse>>> {
    let page = admin_content(&state)
        .list_media(PageRequest::new(params.page, params.page_size))
        .await?;

    Ok(Json(page.map(MediaResponse::from)))
}

/// POST /admin/media
pub async fn create_media<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(staff): RequireStaff,
    Json(req): Json<MediaRequest>,
) -> BlogResult<impl IntoResponse> {
    let asset = admin_content(&state).create_media(req.into(), &staff).await?;

    Ok((StatusCode::CREATED, Json(MediaResponse::from(asset))))
}

/// DELETE /admin/media/{id}
pub async fn delete_media<R: BlogStore>(
    State(state): State<BlogAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<MediaAssetId>,
) -> BlogResult<StatusCode> {
    admin_content(&state).delete_media(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Registry
// ============================================================================

/// GET /admin/registry
pub async fn admin_registry(RequireStaff(_staff): RequireStaff) -> Json<Vec<RegistryEntry>> {
    Json(registry().into_iter().map(RegistryEntry::from).collect())
}
