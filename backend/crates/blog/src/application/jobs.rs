//! Background jobs
//!
//! View counting runs off the request path. A dropped or repeated job only
//! skews the counter.

use std::sync::Arc;

use platform::cache::CacheService;
use platform::tasks::{JobError, JobHandler};

use crate::application::cache_keys::detail_cache_key;
use crate::domain::repository::PostRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogJob {
    IncrementViews { slug: String },
}

pub struct BlogJobHandler<R: PostRepository> {
    repo: Arc<R>,
    cache: CacheService,
}

impl<R: PostRepository> BlogJobHandler<R> {
    pub fn new(repo: Arc<R>, cache: CacheService) -> Self {
        Self { repo, cache }
    }
}

impl<R> JobHandler<BlogJob> for BlogJobHandler<R>
where
    R: PostRepository + Sync + 'static,
{
    async fn handle(&self, job: BlogJob) -> Result<(), JobError> {
        match job {
            BlogJob::IncrementViews { slug } => {
                let found = self
                    .repo
                    .increment_views(&slug)
                    .await
                    .map_err(JobError::new)?;
                if found {
                    self.cache
                        .del(&detail_cache_key(&slug))
                        .await
                        .map_err(JobError::new)?;
                }
                Ok(())
            }
        }
    }
}
