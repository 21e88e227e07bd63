use super::actor::{BookingActor, BookingActorHandle};
use super::models::{BookingRequest, RescheduleRequest};
use crate::components::availability::models::{
    Appointment, AppointmentStatus, Availability, Provider, Service, SlotOptions,
};
use crate::components::reviews::{Review, ReviewRequest, ReviewUpdate};
use crate::components::storage::BookingStore;
use crate::error::BookingResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Booking actor
#[derive(Clone)]
pub struct BookingHandle {
    actor_handle: BookingActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl BookingHandle {
    /// Create a new BookingHandle and spawn the actor
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        let (mut actor, handle) = BookingActor::new(store);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Bookable slots of a provider for a service on a date
    pub async fn available_slots(
        &self,
        provider_id: impl Into<String>,
        service_id: impl Into<String>,
        date: impl Into<String>,
        options: SlotOptions,
    ) -> BookingResult<Availability> {
        self.actor_handle
            .available_slots(provider_id, service_id, date, options)
            .await
    }

    /// Book a slot; fails with `SlotNoLongerAvailable` if it was taken meanwhile
    pub async fn book(&self, request: BookingRequest) -> BookingResult<Appointment> {
        self.actor_handle.book(request).await
    }

    pub async fn reschedule(&self, request: RescheduleRequest) -> BookingResult<Appointment> {
        self.actor_handle.reschedule(request).await
    }

    pub async fn set_status(
        &self,
        appointment_id: impl Into<String>,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment> {
        self.actor_handle.set_status(appointment_id, status).await
    }

    /// Cancel a booking, freeing its slot
    pub async fn cancel(&self, appointment_id: impl Into<String>) -> BookingResult<Appointment> {
        self.set_status(appointment_id, AppointmentStatus::Cancelled)
            .await
    }

    /// Providers that offer a service
    pub async fn providers_for_service(
        &self,
        service_id: impl Into<String>,
    ) -> BookingResult<Vec<Provider>> {
        self.actor_handle.providers_for_service(service_id).await
    }

    /// Appointments of a provider on a date, ordered by start time
    pub async fn appointments_for(
        &self,
        provider_id: impl Into<String>,
        date: impl Into<String>,
    ) -> BookingResult<Vec<Appointment>> {
        self.actor_handle.appointments_for(provider_id, date).await
    }

    /// Remove an appointment together with its review
    pub async fn delete_appointment(&self, appointment_id: impl Into<String>) -> BookingResult<()> {
        self.actor_handle.delete_appointment(appointment_id).await
    }

    pub async fn providers(&self) -> BookingResult<Vec<Provider>> {
        self.actor_handle.providers().await
    }

    /// Add or replace a provider. Every offered service must exist, and the
    /// average rating is recomputed from the stored reviews.
    pub async fn save_provider(&self, provider: Provider) -> BookingResult<Provider> {
        self.actor_handle.save_provider(provider).await
    }

    /// Fails while the provider has pending or confirmed appointments
    pub async fn delete_provider(&self, provider_id: impl Into<String>) -> BookingResult<()> {
        self.actor_handle.delete_provider(provider_id).await
    }

    pub async fn services(&self) -> BookingResult<Vec<Service>> {
        self.actor_handle.services().await
    }

    pub async fn save_service(&self, service: Service) -> BookingResult<Service> {
        self.actor_handle.save_service(service).await
    }

    /// Fails while pending or confirmed appointments use the service;
    /// otherwise it is also removed from every provider offering it
    pub async fn delete_service(&self, service_id: impl Into<String>) -> BookingResult<()> {
        self.actor_handle.delete_service(service_id).await
    }

    /// Review a completed appointment; the provider's rating follows
    pub async fn add_review(&self, request: ReviewRequest) -> BookingResult<Review> {
        self.actor_handle.add_review(request).await
    }

    pub async fn update_review(
        &self,
        review_id: impl Into<String>,
        update: ReviewUpdate,
    ) -> BookingResult<Review> {
        self.actor_handle.update_review(review_id, update).await
    }

    /// Attach the provider's response to a review
    pub async fn respond_to_review(
        &self,
        review_id: impl Into<String>,
        response: impl Into<String>,
    ) -> BookingResult<Review> {
        self.actor_handle
            .respond_to_review(review_id, response)
            .await
    }

    pub async fn delete_review(&self, review_id: impl Into<String>) -> BookingResult<()> {
        self.actor_handle.delete_review(review_id).await
    }

    /// Reviews of a provider, newest first
    pub async fn reviews_for(&self, provider_id: impl Into<String>) -> BookingResult<Vec<Review>> {
        self.actor_handle.reviews_for(provider_id).await
    }

    /// Stop the actor
    pub async fn shutdown(&self) -> BookingResult<()> {
        self.actor_handle.shutdown().await
    }
}
