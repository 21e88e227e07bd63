mod json_file;
mod memory;
pub mod records;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
pub use records::Dataset;

use crate::components::availability::models::{Appointment, Provider, Service};
use crate::components::reviews::Review;
use crate::error::BookingResult;
use async_trait::async_trait;

/// Storage for providers, services, appointments and reviews.
///
/// The calculator never talks to a store; the booking actor loads what it
/// needs through this trait and hands plain records to the calculator.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// All providers
    async fn providers(&self) -> BookingResult<Vec<Provider>>;

    async fn provider(&self, id: &str) -> BookingResult<Option<Provider>>;

    /// All services
    async fn services(&self) -> BookingResult<Vec<Service>>;

    async fn service(&self, id: &str) -> BookingResult<Option<Service>>;

    /// All appointments, any provider and status
    async fn appointments(&self) -> BookingResult<Vec<Appointment>>;

    async fn appointment(&self, id: &str) -> BookingResult<Option<Appointment>>;

    /// Appointments of a provider on a YYYY-MM-DD date, any status
    async fn appointments_for(
        &self,
        provider_id: &str,
        date: &str,
    ) -> BookingResult<Vec<Appointment>>;

    /// All reviews
    async fn reviews(&self) -> BookingResult<Vec<Review>>;

    async fn review(&self, id: &str) -> BookingResult<Option<Review>>;

    /// Insert or replace a provider
    async fn save_provider(&self, provider: Provider) -> BookingResult<()>;

    /// Insert or replace a service
    async fn save_service(&self, service: Service) -> BookingResult<()>;

    /// Insert or replace an appointment
    async fn save_appointment(&self, appointment: Appointment) -> BookingResult<()>;

    /// Insert or replace a review
    async fn save_review(&self, review: Review) -> BookingResult<()>;

    /// Delete a provider, returning whether it existed
    async fn delete_provider(&self, id: &str) -> BookingResult<bool>;

    /// Delete a service, returning whether it existed
    async fn delete_service(&self, id: &str) -> BookingResult<bool>;

    /// Delete an appointment, returning whether it existed
    async fn delete_appointment(&self, id: &str) -> BookingResult<bool>;

    /// Delete a review, returning whether it existed
    async fn delete_review(&self, id: &str) -> BookingResult<bool>;
}
