use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::modules::school::domain::{School, SchoolRating, SchoolRepository};
use crate::shared::errors::AppResult;

/// Process-local catalog backed by concurrent maps
#[derive(Debug, Default)]
pub struct InMemorySchoolRepository {
    schools: DashMap<Uuid, School>,
    external_index: DashMap<String, Uuid>,
    ratings: DashMap<(Uuid, Uuid), SchoolRating>,
}

impl InMemorySchoolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<School> {
        self.schools.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn ratings_for(&self, school_id: &Uuid) -> Vec<SchoolRating> {
        self.ratings
            .iter()
            .filter(|entry| entry.key().0 == *school_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl SchoolRepository for InMemorySchoolRepository {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<School>> {
        // Copy the id out before touching the second map
        let id = self.external_index.get(external_id).map(|entry| *entry.value());
        Ok(id.and_then(|id| self.schools.get(&id).map(|entry| entry.value().clone())))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<School>> {
        Ok(self
            .schools
            .iter()
            .find(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<School>> {
        Ok(self.schools.get(id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, school: School) -> AppResult<School> {
        if let Some(external_id) = &school.external_id {
            self.external_index.insert(external_id.clone(), school.id);
        }
        self.schools.insert(school.id, school.clone());
        Ok(school)
    }

    async fn upsert_rating(&self, rating: SchoolRating) -> AppResult<()> {
        self.ratings
            .insert((rating.school_id, rating.review_id), rating);
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.schools.len())
    }

    async fn count_ratings(&self) -> AppResult<usize> {
        Ok(self.ratings.len())
    }
}
