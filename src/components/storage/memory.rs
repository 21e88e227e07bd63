use super::records::{
    validate_appointment, validate_provider, validate_review, validate_service, Dataset,
};
use super::BookingStore;
use crate::components::availability::models::{Appointment, Provider, Service};
use crate::components::reviews::Review;
use crate::error::BookingResult;
use crate::utils::time::parse_date;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory store, also the cache behind [`super::JsonFileStore`]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<Dataset>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an already validated dataset
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
        }
    }

    /// Copy of everything currently stored
    pub async fn snapshot(&self) -> Dataset {
        self.data.read().await.clone()
    }

    /// Swap in a new dataset
    pub(super) async fn replace(&self, dataset: Dataset) {
        *self.data.write().await = dataset;
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn providers(&self) -> BookingResult<Vec<Provider>> {
        Ok(self.data.read().await.providers.clone())
    }

    async fn provider(&self, id: &str) -> BookingResult<Option<Provider>> {
        let data = self.data.read().await;
        Ok(data.providers.iter().find(|p| p.id == id).cloned())
    }

    async fn services(&self) -> BookingResult<Vec<Service>> {
        Ok(self.data.read().await.services.clone())
    }

    async fn service(&self, id: &str) -> BookingResult<Option<Service>> {
        let data = self.data.read().await;
        Ok(data.services.iter().find(|s| s.id == id).cloned())
    }

    async fn appointments(&self) -> BookingResult<Vec<Appointment>> {
        Ok(self.data.read().await.appointments.clone())
    }

    async fn appointment(&self, id: &str) -> BookingResult<Option<Appointment>> {
        let data = self.data.read().await;
        Ok(data.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn appointments_for(
        &self,
        provider_id: &str,
        date: &str,
    ) -> BookingResult<Vec<Appointment>> {
        // Stored dates are not always zero-padded
        let day = parse_date(date).ok();
        let data = self.data.read().await;
        Ok(data
            .appointments
            .iter()
            .filter(|a| a.provider_id == provider_id)
            .filter(|a| a.date == date || (day.is_some() && parse_date(&a.date).ok() == day))
            .cloned()
            .collect())
    }

    async fn reviews(&self) -> BookingResult<Vec<Review>> {
        Ok(self.data.read().await.reviews.clone())
    }

    async fn review(&self, id: &str) -> BookingResult<Option<Review>> {
        let data = self.data.read().await;
        Ok(data.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn save_provider(&self, provider: Provider) -> BookingResult<()> {
        validate_provider(&provider)?;
        self.data.write().await.upsert_provider(provider);
        Ok(())
    }

    async fn save_service(&self, service: Service) -> BookingResult<()> {
        validate_service(&service)?;
        self.data.write().await.upsert_service(service);
        Ok(())
    }

    async fn save_appointment(&self, appointment: Appointment) -> BookingResult<()> {
        validate_appointment(&appointment)?;
        self.data.write().await.upsert_appointment(appointment);
        Ok(())
    }

    async fn save_review(&self, review: Review) -> BookingResult<()> {
        validate_review(&review)?;
        self.data.write().await.upsert_review(review);
        Ok(())
    }

    async fn delete_provider(&self, id: &str) -> BookingResult<bool> {
        Ok(self.data.write().await.remove_provider(id))
    }

    async fn delete_service(&self, id: &str) -> BookingResult<bool> {
        Ok(self.data.write().await.remove_service(id))
    }

    async fn delete_appointment(&self, id: &str) -> BookingResult<bool> {
        Ok(self.data.write().await.remove_appointment(id))
    }

    async fn delete_review(&self, id: &str) -> BookingResult<bool> {
        Ok(self.data.write().await.remove_review(id))
    }
}
