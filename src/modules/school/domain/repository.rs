use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{School, SchoolRating};
use crate::shared::errors::AppResult;

/// Durable catalog consumed by the ingestion service
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<School>>;

    /// Exact name match
    async fn find_by_name(&self, name: &str) -> AppResult<Option<School>>;

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<School>>;

    /// Insert or replace by `school.id`
    async fn upsert(&self, school: School) -> AppResult<School>;

    /// Insert or replace by `(school_id, review_id)`
    async fn upsert_rating(&self, rating: SchoolRating) -> AppResult<()>;

    async fn count(&self) -> AppResult<usize>;

    async fn count_ratings(&self) -> AppResult<usize>;
}
