//! Public read use cases
//!
//! List and detail pages go through the shared cache. Cache failures degrade
//! to a database read and never fail the request.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kernel::pagination::Page;
use platform::cache::CacheService;
use platform::tasks::TaskQueue;
use serde::{Serialize, de::DeserializeOwned};

use crate::application::cache_keys::{detail_cache_key, list_cache_key};
use crate::application::config::BlogConfig;
use crate::application::jobs::BlogJob;
use crate::application::views::{PostDetail, PostListItem, TaxonomyBrief};
use crate::domain::entities::SitemapEntry;
use crate::domain::repository::{PostRepository, PublicPostQuery, TaxonomyRepository};
use crate::error::{BlogError, BlogResult};

pub struct PublicPostsUseCase<R>
where
    R: PostRepository + TaxonomyRepository,
{
    repo: Arc<R>,
    cache: CacheService,
    config: Arc<BlogConfig>,
    jobs: TaskQueue<BlogJob>,
}

impl<R> PublicPostsUseCase<R>
where
    R: PostRepository + TaxonomyRepository,
{
    pub fn new(
        repo: Arc<R>,
        cache: CacheService,
        config: Arc<BlogConfig>,
        jobs: TaskQueue<BlogJob>,
    ) -> Self {
        Self {
            repo,
            cache,
            config,
            jobs,
        }
    }

    pub async fn list(&self, query: PublicPostQuery) -> BlogResult<Page<PostListItem>> {
        let key = list_cache_key(&query);
        if let Some(page) = read_cached(&self.cache, &key).await {
            return Ok(page);
        }

        let (posts, total) = self.repo.list_public(&query, Utc::now()).await?;
        if query.page.is_out_of_range(total) {
            return Err(BlogError::InvalidPage);
        }

        let page = Page::new(
            posts.iter().map(PostListItem::from).collect(),
            total,
            query.page,
        );
        write_cached(&self.cache, &key, &page, self.config.list_cache_ttl).await;
        Ok(page)
    }

    /// Every hit queues a view increment, cached or not.
    pub async fn detail(&self, slug: &str) -> BlogResult<PostDetail> {
        let key = detail_cache_key(slug);
        let detail = match read_cached::<PostDetail>(&self.cache, &key).await {
            Some(detail) => detail,
            None => {
                let post = self
                    .repo
                    .find_public_by_slug(slug, Utc::now())
                    .await?
                    .ok_or(BlogError::NotFound)?;
                let detail = PostDetail::from(&post);
                write_cached(&self.cache, &key, &detail, self.config.detail_cache_ttl).await;
                detail
            }
        };

        self.jobs.dispatch(BlogJob::IncrementViews {
            slug: detail.item.slug.clone(),
        });
        Ok(detail)
    }

    pub async fn categories(&self) -> BlogResult<Vec<TaxonomyBrief>> {
        let categories = self.repo.list_categories().await?;
        Ok(categories.iter().map(TaxonomyBrief::from).collect())
    }

    pub async fn tags(&self) -> BlogResult<Vec<TaxonomyBrief>> {
        let tags = self.repo.list_tags().await?;
        Ok(tags.iter().map(TaxonomyBrief::from).collect())
    }

    /// `urlset` document of every public post.
    pub async fn sitemap(&self) -> BlogResult<String> {
        let entries = self.repo.list_sitemap(Utc::now()).await?;
        Ok(render_sitemap(&self.config.site_url, &entries))
    }
}

pub(crate) async fn read_cached<T: DeserializeOwned>(cache: &CacheService, key: &str) -> Option<T> {
    match cache.get_json(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Cache read failed");
            None
        }
    }
}

pub(crate) async fn write_cached<T: Serialize>(
    cache: &CacheService,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    if let Err(e) = cache.set_json(key, value, Some(ttl)).await {
        tracing::warn!(key, error = %e, "Cache write failed");
    }
}

pub(crate) async fn evict(cache: &CacheService, key: &str) {
    if let Err(e) = cache.del(key).await {
        tracing::warn!(key, error = %e, "Cache eviction failed");
    }
}

fn render_sitemap(site_url: &str, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        let loc = format!("{site_url}/blog/{}", entry.slug);
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            entry.updated_at.format("%Y-%m-%d")
        ));
        xml.push_str("    <changefreq>daily</changefreq>\n");
        xml.push_str("    <priority>0.6</priority>\n");
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Slug;
    use chrono::TimeZone;

    #[test]
    fn test_render_sitemap() {
        let entries = vec![SitemapEntry {
            slug: Slug::from_trusted("hello-world"),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap(),
        }];
        let xml = render_sitemap("https://example.com", &entries);
        assert!(xml.contains("<loc>https://example.com/blog/hello-world</loc>"));
        assert!(xml.contains("<lastmod>2025-03-09</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>0.6</priority>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b<c>"), "a&amp;b&lt;c&gt;");
    }
}
