use crate::error::Result;
use crate::ids::IntoRecordId;
use crate::models::{Genre, GenreUpdate, NewGenre};
use crate::repositories::RecordRepository;

#[derive(Clone)]
pub struct GenreService {
    repo: RecordRepository<Genre>,
}

impl GenreService {
    pub fn new(repo: RecordRepository<Genre>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> Result<Vec<Genre>> {
        self.repo.fetch_all(self.repo.query()).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<Genre> {
        self.repo.find_by_id(id).await
    }

    pub async fn create(&self, genre: &NewGenre) -> Result<Option<Genre>> {
        self.repo.create(genre).await
    }

    pub async fn update(&self, id: impl IntoRecordId, patch: &GenreUpdate) -> Result<Option<Genre>> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool> {
        self.repo.delete(id).await
    }
}
