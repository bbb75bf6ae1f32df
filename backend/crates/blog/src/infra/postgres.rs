//! PostgreSQL Repository Implementations

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, CommentId, MediaAssetId, PostId, TagId, UserId};
use kernel::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    AuthorRef, Category, Comment, MediaAsset, Post, PostViews, Reaction, SitemapEntry, Tag,
};
use crate::domain::repository::{
    AdminPostQuery, CommentRepository, MediaRepository, PostRepository, PublicPostQuery,
    ReactionRepository, TaxonomyRepository,
};
use crate::domain::value_objects::{PostOrdering, PostStatus, ReactionType, Slug};
use crate::error::{BlogError, BlogResult};

/// Post columns with author, category and like counter joined in.
/// Tags are attached in a second query.
macro_rules! post_select {
    () => {
        r#"
        SELECT
            p.id,
            p.title,
            p.slug,
            p.summary,
            p.content,
            p.status,
            p.published_at,
            p.author_id,
            u.username AS author_username,
            c.id AS category_id,
            c.name AS category_name,
            c.slug AS category_slug,
            c.description AS category_description,
            c.parent_id AS category_parent_id,
            c.created_at AS category_created_at,
            p.featured_image,
            p.canonical_url,
            p.meta_title,
            p.meta_description,
            p.reading_time_minutes,
            p.views_count,
            (
                SELECT COUNT(*) FROM reactions r
                WHERE r.post_id = p.id AND r.reaction_type = 'like'
            ) AS likes_count,
            p.allow_comments,
            p.created_at,
            p.updated_at
        "#
    };
}

macro_rules! post_from {
    () => {
        r#"
        FROM posts p
        LEFT JOIN users u ON u.user_id = p.author_id
        LEFT JOIN categories c ON c.id = p.category_id
        "#
    };
}

/// Public visibility plus the optional list filters, `$1`..`$5`.
macro_rules! public_where {
    () => {
        r#"
        WHERE p.status = 'published'
          AND p.published_at <= $1
          AND ($2::text IS NULL OR c.slug = $2)
          AND ($3::text IS NULL OR EXISTS (
                SELECT 1 FROM post_tags pt
                JOIN tags t ON t.id = pt.tag_id
                WHERE pt.post_id = p.id AND t.slug = $3
          ))
          AND ($4::uuid IS NULL OR p.author_id = $4)
          AND ($5::text IS NULL OR p.search_vector @@ plainto_tsquery('english', $5))
        "#
    };
}

macro_rules! comment_select {
    () => {
        r#"
        SELECT
            cm.id,
            cm.post_id,
            cm.author_id,
            COALESCE(u.username, u.email) AS author_label,
            cm.author_name,
            cm.author_email_hash,
            cm.parent_id,
            cm.content,
            cm.is_approved,
            cm.created_at
        FROM comments cm
        LEFT JOIN users u ON u.user_id = cm.author_id
        "#
    };
}

/// PostgreSQL-backed blog repository
#[derive(Clone)]
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load tags of `rows` in one query and build the posts.
    async fn hydrate(&self, rows: Vec<PostRow>) -> BlogResult<Vec<Post>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let tag_rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.name, t.slug, t.created_at
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.post_id).or_default().push(row.into_tag());
        }

        rows.into_iter()
            .map(|row| {
                let post_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_post(post_tags)
            })
            .collect()
    }

    async fn hydrate_one(&self, row: Option<PostRow>) -> BlogResult<Option<Post>> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

fn public_order(ordering: PostOrdering) -> &'static str {
    match ordering {
        PostOrdering::NewestFirst => "p.published_at DESC, p.views_count DESC, p.id",
        PostOrdering::OldestFirst => "p.published_at ASC, p.views_count DESC, p.id",
        PostOrdering::Relevance => {
            "ts_rank(p.search_vector, plainto_tsquery('english', $5)) DESC, p.published_at DESC, p.id"
        }
        PostOrdering::ViewsAscending => "p.views_count ASC, p.published_at DESC, p.id",
        PostOrdering::ViewsDescending => "p.views_count DESC, p.published_at DESC, p.id",
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Post Repository Implementation
// ============================================================================

impl PostRepository for PgBlogRepository {
    async fn list_public(
        &self,
        query: &PublicPostQuery,
        now: DateTime<Utc>,
    ) -> BlogResult<(Vec<Post>, u64)> {
        let category = non_blank(query.category.as_deref());
        let tag = non_blank(query.tag.as_deref());
        let author = query.author.map(UserId::into_uuid);
        let q = non_blank(query.q.as_deref());

        let total = sqlx::query_scalar::<_, i64>(concat!(
            "SELECT COUNT(*) ",
            post_from!(),
            public_where!()
        ))
        .bind(now)
        .bind(category)
        .bind(tag)
        .bind(author)
        .bind(q)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "{}{}{} ORDER BY {} LIMIT $6 OFFSET $7",
            post_select!(),
            post_from!(),
            public_where!(),
            public_order(query.ordering)
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(now)
            .bind(category)
            .bind(tag)
            .bind(author)
            .bind(q)
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((self.hydrate(rows).await?, total.max(0) as u64))
    }

    async fn find_public_by_slug(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> BlogResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            post_select!(),
            post_from!(),
            "WHERE p.slug = $1 AND p.status = 'published' AND p.published_at <= $2"
        ))
        .bind(slug)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_one(row).await
    }

    async fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            post_select!(),
            post_from!(),
            "WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_one(row).await
    }

    async fn list_admin(&self, query: &AdminPostQuery) -> BlogResult<(Vec<Post>, u64)> {
        let status = query.status.map(|s| s.as_str());
        let search = non_blank(query.search.as_deref()).map(|s| format!("%{s}%"));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts p
            WHERE ($1::text IS NULL OR p.status = $1)
              AND ($2::text IS NULL OR p.title ILIKE $2)
            "#,
        )
        .bind(status)
        .bind(search.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PostRow>(concat!(
            post_select!(),
            post_from!(),
            r#"
            WHERE ($1::text IS NULL OR p.status = $1)
              AND ($2::text IS NULL OR p.title ILIKE $2)
            ORDER BY p.created_at DESC, p.id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(status)
        .bind(search.as_deref())
        .bind(query.page.limit())
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((self.hydrate(rows).await?, total.max(0) as u64))
    }

    async fn slug_taken(&self, slug: &Slug, except: Option<PostId>) -> BlogResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug.as_str())
        .bind(except.map(PostId::into_uuid))
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn create_post(&self, post: &Post) -> BlogResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO posts (
                id,
                title,
                slug,
                summary,
                content,
                status,
                published_at,
                author_id,
                category_id,
                featured_image,
                canonical_url,
                meta_title,
                meta_description,
                reading_time_minutes,
                views_count,
                allow_comments,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(post.slug.as_str())
        .bind(&post.summary)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .bind(post.author.id.as_uuid())
        .bind(post.category.as_ref().map(|c| c.id.into_uuid()))
        .bind(post.featured_image.as_deref())
        .bind(post.canonical_url.as_deref())
        .bind(&post.meta_title)
        .bind(&post.meta_description)
        .bind(post.reading_time_minutes)
        .bind(post.views_count)
        .bind(post.allow_comments)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

        let tag_ids: Vec<Uuid> = post.tags.iter().map(|t| t.id.into_uuid()).collect();
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::uuid[])")
            .bind(post.id.as_uuid())
            .bind(&tag_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> BlogResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts SET
                title = $2,
                slug = $3,
                summary = $4,
                content = $5,
                status = $6,
                published_at = $7,
                category_id = $8,
                featured_image = $9,
                canonical_url = $10,
                meta_title = $11,
                meta_description = $12,
                reading_time_minutes = $13,
                allow_comments = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(post.slug.as_str())
        .bind(&post.summary)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .bind(post.category.as_ref().map(|c| c.id.into_uuid()))
        .bind(post.featured_image.as_deref())
        .bind(post.canonical_url.as_deref())
        .bind(&post.meta_title)
        .bind(&post.meta_description)
        .bind(post.reading_time_minutes)
        .bind(post.allow_comments)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BlogError::NotFound);
        }

        let tag_ids: Vec<Uuid> = post.tags.iter().map(|t| t.id.into_uuid()).collect();
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::uuid[])")
            .bind(post.id.as_uuid())
            .bind(&tag_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_status(
        &self,
        slugs: &[String],
        status: PostStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET
                status = $1,
                published_at = CASE
                    WHEN $1 = 'published' THEN COALESCE(published_at, $2)
                    ELSE published_at
                END,
                updated_at = $2
            WHERE slug = ANY($3)
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(slugs)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn increment_views(&self, slug: &str) -> BlogResult<bool> {
        let result = sqlx::query("UPDATE posts SET views_count = views_count + 1 WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn top_by_views(&self, limit: u32) -> BlogResult<Vec<PostViews>> {
        let rows = sqlx::query_as::<_, PostViewsRow>(
            r#"
            SELECT title, slug, views_count
            FROM posts
            ORDER BY views_count DESC, created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostViewsRow::into_post_views).collect())
    }

    async fn list_sitemap(&self, now: DateTime<Utc>) -> BlogResult<Vec<SitemapEntry>> {
        let rows = sqlx::query_as::<_, SitemapRow>(
            r#"
            SELECT slug, updated_at
            FROM posts
            WHERE status = 'published' AND published_at <= $1
            ORDER BY published_at DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SitemapEntry {
                slug: Slug::from_trusted(row.slug),
                updated_at: row.updated_at,
            })
            .collect())
    }
}

// ============================================================================
// Taxonomy Repository Implementation
// ============================================================================

impl TaxonomyRepository for PgBlogRepository {
    async fn list_categories(&self) -> BlogResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, description, parent_id, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn list_tags(&self) -> BlogResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT id, name, slug, created_at FROM tags ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn find_category(&self, slug: &str) -> BlogResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, description, parent_id, created_at FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CategoryRow::into_category))
    }

    async fn find_tags(&self, slugs: &[String]) -> BlogResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT id, name, slug, created_at FROM tags WHERE slug = ANY($1) ORDER BY name",
        )
        .bind(slugs)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn category_exists(&self, name: &str, slug: &Slug) -> BlogResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 OR slug = $2)",
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn tag_exists(&self, name: &str, slug: &Slug) -> BlogResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE name = $1 OR slug = $2)",
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_category(&self, category: &Category) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(category.slug.as_str())
        .bind(&category.description)
        .bind(category.parent_id.map(CategoryId::into_uuid))
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_category(&self, slug: &str) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn create_tag(&self, tag: &Tag) -> BlogResult<()> {
        sqlx::query("INSERT INTO tags (id, name, slug, created_at) VALUES ($1, $2, $3, $4)")
            .bind(tag.id.as_uuid())
            .bind(&tag.name)
            .bind(tag.slug.as_str())
            .bind(tag.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_tag(&self, slug: &str) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgBlogRepository {
    async fn list_approved(&self, post_id: PostId) -> BlogResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(concat!(
            comment_select!(),
            "WHERE cm.post_id = $1 AND cm.is_approved = TRUE ORDER BY cm.created_at, cm.id"
        ))
        .bind(post_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(concat!(comment_select!(), "WHERE cm.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CommentRow::into_comment))
    }

    async fn create_comment(&self, comment: &Comment) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id,
                post_id,
                author_id,
                author_name,
                author_email_hash,
                parent_id,
                content,
                is_approved,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.post_id.as_uuid())
        .bind(comment.author_id.map(UserId::into_uuid))
        .bind(comment.author_name.as_deref())
        .bind(comment.author_email_hash.as_deref())
        .bind(comment.parent_id.map(CommentId::into_uuid))
        .bind(&comment.content)
        .bind(comment.is_approved)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_comments(
        &self,
        is_approved: Option<bool>,
        page: PageRequest,
    ) -> BlogResult<(Vec<Comment>, u64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE ($1::boolean IS NULL OR is_approved = $1)",
        )
        .bind(is_approved)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CommentRow>(concat!(
            comment_select!(),
            r#"
            WHERE ($1::boolean IS NULL OR cm.is_approved = $1)
            ORDER BY cm.created_at DESC, cm.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(is_approved)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(CommentRow::into_comment).collect(),
            total.max(0) as u64,
        ))
    }

    async fn approve_comments(&self, ids: &[CommentId]) -> BlogResult<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let result = sqlx::query(
            r#"
            UPDATE comments SET is_approved = TRUE, updated_at = NOW()
            WHERE id = ANY($1) AND is_approved = FALSE
            "#,
        )
        .bind(&ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// ============================================================================
// Reaction Repository Implementation
// ============================================================================

impl ReactionRepository for PgBlogRepository {
    async fn add_reaction(&self, reaction: &Reaction) -> BlogResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO reactions (id, post_id, user_id, reaction_type, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ON CONSTRAINT unique_reaction DO NOTHING
            "#,
        )
        .bind(reaction.id.as_uuid())
        .bind(reaction.post_id.as_uuid())
        .bind(reaction.user_id.map(UserId::into_uuid))
        .bind(reaction.reaction_type.as_str())
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_reaction(
        &self,
        post_id: PostId,
        user_id: UserId,
        reaction_type: ReactionType,
    ) -> BlogResult<bool> {
        let result = sqlx::query(
            "DELETE FROM reactions WHERE post_id = $1 AND user_id = $2 AND reaction_type = $3",
        )
        .bind(post_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(reaction_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Media Repository Implementation
// ============================================================================

impl MediaRepository for PgBlogRepository {
    async fn list_media(&self, page: PageRequest) -> BlogResult<(Vec<MediaAsset>, u64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM media_assets")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT id, uploader_id, file_url, mime_type, width, height, created_at
            FROM media_assets
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(MediaRow::into_media).collect(),
            total.max(0) as u64,
        ))
    }

    async fn create_media(&self, asset: &MediaAsset) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO media_assets (id, uploader_id, file_url, mime_type, width, height, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(asset.id.as_uuid())
        .bind(asset.uploader_id.map(UserId::into_uuid))
        .bind(&asset.file_url)
        .bind(&asset.mime_type)
        .bind(asset.width)
        .bind(asset.height)
        .bind(asset.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_media(&self, id: MediaAssetId) -> BlogResult<bool> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// ============================================================================
// Rows
// ============================================================================

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    summary: String,
    content: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    author_id: Uuid,
    author_username: Option<String>,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    category_slug: Option<String>,
    category_description: Option<String>,
    category_parent_id: Option<Uuid>,
    category_created_at: Option<DateTime<Utc>>,
    featured_image: Option<String>,
    canonical_url: Option<String>,
    meta_title: String,
    meta_description: String,
    reading_time_minutes: i32,
    views_count: i64,
    likes_count: i64,
    allow_comments: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self, tags: Vec<Tag>) -> BlogResult<Post> {
        let status = PostStatus::parse(&self.status)
            .ok_or_else(|| BlogError::Internal(format!("Unknown post status: {}", self.status)))?;

        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category {
                id: CategoryId::from_uuid(id),
                name,
                slug: Slug::from_trusted(slug),
                description: self.category_description.unwrap_or_default(),
                parent_id: self.category_parent_id.map(CategoryId::from_uuid),
                created_at: self.category_created_at.unwrap_or(self.created_at),
            }),
            _ => None,
        };

        Ok(Post {
            id: PostId::from_uuid(self.id),
            title: self.title,
            slug: Slug::from_trusted(self.slug),
            summary: self.summary,
            content: self.content,
            status,
            published_at: self.published_at,
            author: AuthorRef {
                id: UserId::from_uuid(self.author_id),
                username: self.author_username,
            },
            category,
            tags,
            featured_image: self.featured_image,
            canonical_url: self.canonical_url,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            reading_time_minutes: self.reading_time_minutes,
            views_count: self.views_count,
            likes_count: self.likes_count,
            allow_comments: self.allow_comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: Uuid,
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl PostTagRow {
    fn into_tag(self) -> Tag {
        Tag {
            id: TagId::from_uuid(self.id),
            name: self.name,
            slug: Slug::from_trusted(self.slug),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl TagRow {
    fn into_tag(self) -> Tag {
        Tag {
            id: TagId::from_uuid(self.id),
            name: self.name,
            slug: Slug::from_trusted(self.slug),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    parent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::from_uuid(self.id),
            name: self.name,
            slug: Slug::from_trusted(self.slug),
            description: self.description,
            parent_id: self.parent_id.map(CategoryId::from_uuid),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Option<Uuid>,
    author_label: Option<String>,
    author_name: Option<String>,
    author_email_hash: Option<String>,
    parent_id: Option<Uuid>,
    content: String,
    is_approved: bool,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::from_uuid(self.id),
            post_id: PostId::from_uuid(self.post_id),
            author_id: self.author_id.map(UserId::from_uuid),
            author_label: self.author_label,
            author_name: self.author_name,
            author_email_hash: self.author_email_hash,
            parent_id: self.parent_id.map(CommentId::from_uuid),
            content: self.content,
            is_approved: self.is_approved,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostViewsRow {
    title: String,
    slug: String,
    views_count: i64,
}

impl PostViewsRow {
    fn into_post_views(self) -> PostViews {
        PostViews {
            title: self.title,
            slug: Slug::from_trusted(self.slug),
            views_count: self.views_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SitemapRow {
    slug: String,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: Uuid,
    uploader_id: Option<Uuid>,
    file_url: String,
    mime_type: String,
    width: Option<i32>,
    height: Option<i32>,
    created_at: DateTime<Utc>,
}

impl MediaRow {
    fn into_media(self) -> MediaAsset {
        MediaAsset {
            id: MediaAssetId::from_uuid(self.id),
            uploader_id: self.uploader_id.map(UserId::from_uuid),
            file_url: self.file_url,
            mime_type: self.mime_type,
            width: self.width,
            height: self.height,
            created_at: self.created_at,
        }
    }
}
