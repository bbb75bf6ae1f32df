//! Staff moderation of comments, taxonomy and media

use std::sync::Arc;

use chrono::Utc;
use kernel::Principal;
use kernel::id::{CommentId, MediaAssetId};
use kernel::pagination::{Page, PageRequest};

use crate::domain::admin::{AdminCapabilities, AdminEntity};
use crate::domain::entities::{Category, Comment, MediaAsset, Tag};
use crate::domain::repository::{CommentRepository, MediaRepository, TaxonomyRepository};
use crate::domain::value_objects::Slug;
use crate::error::{BlogError, BlogResult};

const MAX_NAME_LEN: usize = 100;
const MAX_MIME_LEN: usize = 100;
const MAX_FILE_URL_LEN: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Parent category slug
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagInput {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaInput {
    pub file_url: String,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

pub struct AdminContentUseCase<R>
where
    R: CommentRepository + TaxonomyRepository + MediaRepository,
{
    repo: Arc<R>,
}

impl<R> AdminContentUseCase<R>
where
    R: CommentRepository + TaxonomyRepository + MediaRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    // Comments

    pub async fn list_comments(
        &self,
        is_approved: Option<bool>,
        page: PageRequest,
    ) -> BlogResult<Page<Comment>> {
        let (comments, total) = self.repo.list_comments(is_approved, page).await?;
        if page.is_out_of_range(total) {
            return Err(BlogError::InvalidPage);
        }
        Ok(Page::new(comments, total, page))
    }

    pub async fn approve_comments(&self, ids: &[CommentId]) -> BlogResult<u64> {
        let updated = self.repo.approve_comments(ids).await?;
        tracing::info!(requested = ids.len(), updated, "Comments approved");
        Ok(updated)
    }

    pub async fn delete_comment(&self, id: CommentId) -> BlogResult<()> {
        if !self.repo.delete_comment(id).await? {
            return Err(BlogError::NotFound);
        }
        tracing::info!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    // Taxonomy

    pub async fn list_categories(&self) -> BlogResult<Vec<Category>> {
        self.repo.list_categories().await
    }

    pub async fn create_category(&self, input: CategoryInput) -> BlogResult<Category> {
        let name = required_name(&input.name)?;
        let slug = Slug::parse_or_derive("slug", input.slug.as_deref(), &name)?;
        if self.repo.category_exists(&name, &slug).await? {
            return Err(BlogError::validation(
                "name",
                "category with this name or slug already exists.",
            ));
        }

        let parent_id = match input.parent.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(parent) => Some(
                self.repo
                    .find_category(parent)
                    .await?
                    .ok_or_else(|| {
                        BlogError::validation(
                            "parent",
                            format!("Object with slug={parent} does not exist."),
                        )
                    })?
                    .id,
            ),
        };

        let category = Category::new(
            name,
            slug,
            input.description.unwrap_or_default(),
            parent_id,
        );
        self.repo.create_category(&category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Posts of a deleted category keep existing without one.
    pub async fn delete_category(&self, slug: &str) -> BlogResult<()> {
        if !self.repo.delete_category(slug).await? {
            return Err(BlogError::NotFound);
        }
        tracing::info!(slug, "Category deleted");
        Ok(())
    }

    pub async fn list_tags(&self) -> BlogResult<Vec<Tag>> {
        self.repo.list_tags().await
    }

    pub async fn create_tag(&self, input: TagInput) -> BlogResult<Tag> {
        let name = required_name(&input.name)?;
        let slug = Slug::parse_or_derive("slug", input.slug.as_deref(), &name)?;
        if self.repo.tag_exists(&name, &slug).await? {
            return Err(BlogError::validation(
                "name",
                "tag with this name or slug already exists.",
            ));
        }

        let tag = Tag::new(name, slug);
        self.repo.create_tag(&tag).await?;
        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }

    pub async fn delete_tag(&self, slug: &str) -> BlogResult<()> {
        if !self.repo.delete_tag(slug).await? {
            return Err(BlogError::NotFound);
        }
        tracing::info!(slug, "Tag deleted");
        Ok(())
    }

    // Media

    pub async fn list_media(&self, page: PageRequest) -> BlogResult<Page<MediaAsset>> {
        let (assets, total) = self.repo.list_media(page).await?;
        if page.is_out_of_range(total) {
            return Err(BlogError::InvalidPage);
        }
        Ok(Page::new(assets, total, page))
    }

    /// Register an already uploaded file.
    pub async fn create_media(
        &self,
        input: MediaInput,
        uploader: &Principal,
    ) -> BlogResult<MediaAsset> {
        let file_url = input.file_url.trim();
        if file_url.is_empty() {
            return Err(BlogError::validation("file_url", "This field may not be blank."));
        }
        if file_url.chars().count() > MAX_FILE_URL_LEN {
            return Err(BlogError::validation(
                "file_url",
                format!("Ensure this field has no more than {MAX_FILE_URL_LEN} characters."),
            ));
        }

        let mime_type = input.mime_type.trim();
        if mime_type.is_empty() || !mime_type.contains('/') || mime_type.len() > MAX_MIME_LEN {
            return Err(BlogError::validation("mime_type", "Enter a valid MIME type."));
        }

        for (field, value) in [("width", input.width), ("height", input.height)] {
            if value.is_some_and(|v| v <= 0) {
                return Err(BlogError::validation(
                    field,
                    "Ensure this value is greater than or equal to 1.",
                ));
            }
        }

        let asset = MediaAsset {
            id: MediaAssetId::new(),
            uploader_id: Some(uploader.user_id),
            file_url: file_url.to_string(),
            mime_type: mime_type.to_string(),
            width: input.width,
            height: input.height,
            created_at: Utc::now(),
        };
        self.repo.create_media(&asset).await?;
        tracing::info!(media_id = %asset.id, uploader_id = %uploader.user_id, "Media registered");
        Ok(asset)
    }

    pub async fn delete_media(&self, id: MediaAssetId) -> BlogResult<()> {
        if !self.repo.delete_media(id).await? {
            return Err(BlogError::NotFound);
        }
        tracing::info!(media_id = %id, "Media deleted");
        Ok(())
    }
}

/// Entities managed through the admin surface and their capabilities.
pub fn registry() -> Vec<(AdminEntity, AdminCapabilities)> {
    AdminEntity::ALL
        .iter()
        .map(|entity| (*entity, entity.capabilities()))
        .collect()
}

fn required_name(raw: &str) -> BlogResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(BlogError::validation("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(BlogError::validation(
            "name",
            format!("Ensure this field has no more than {MAX_NAME_LEN} characters."),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_every_entity_once() {
        let entries = registry();
        assert_eq!(entries.len(), AdminEntity::ALL.len());
        let (_, post) = entries
            .iter()
            .find(|(e, _)| *e == AdminEntity::Post)
            .unwrap();
        assert_eq!(post.actions, &["publish", "draft", "archive"]);
    }

    #[test]
    fn test_required_name() {
        assert_eq!(required_name("  Rust ").unwrap(), "Rust");
        assert!(required_name("   ").is_err());
        assert!(required_name(&"x".repeat(101)).is_err());
    }
}
