use super::models::{BookingRequest, RescheduleRequest};
use crate::components::availability::calculator::{
    compute_available_slots, providers_for_service, verify_slot,
};
use crate::components::availability::models::{
    Appointment, AppointmentStatus, Availability, Provider, Service, SlotOptions,
};
use crate::components::reviews::{
    average_rating, validate_rating, Review, ReviewRequest, ReviewUpdate,
};
use crate::components::storage::BookingStore;
use crate::error::{invalid_input, not_found, other_error, BookingResult, Error};
use crate::utils::time::{format_date, parse_date};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

type Reply<T> = oneshot::Sender<BookingResult<T>>;

/// Commands that can be sent to the Booking actor
pub enum BookingCommand {
    Availability {
        provider_id: String,
        service_id: String,
        date: String,
        options: SlotOptions,
        reply: Reply<Availability>,
    },
    Book(BookingRequest, Reply<Appointment>),
    Reschedule(RescheduleRequest, Reply<Appointment>),
    SetStatus {
        appointment_id: String,
        status: AppointmentStatus,
        reply: Reply<Appointment>,
    },
    ProvidersForService(String, Reply<Vec<Provider>>),
    AppointmentsFor {
        provider_id: String,
        date: String,
        reply: Reply<Vec<Appointment>>,
    },
    DeleteAppointment(String, Reply<()>),
    Providers(Reply<Vec<Provider>>),
    SaveProvider(Provider, Reply<Provider>),
    DeleteProvider(String, Reply<()>),
    Services(Reply<Vec<Service>>),
    SaveService(Service, Reply<Service>),
    DeleteService(String, Reply<()>),
    AddReview(ReviewRequest, Reply<Review>),
    UpdateReview {
        review_id: String,
        update: ReviewUpdate,
        reply: Reply<Review>,
    },
    RespondToReview {
        review_id: String,
        response: String,
        reply: Reply<Review>,
    },
    DeleteReview(String, Reply<()>),
    ReviewsFor(String, Reply<Vec<Review>>),
    Shutdown,
}

/// The Booking actor. It is the only writer of appointments, so the
/// re-check before a commit cannot interleave with another commit.
pub struct BookingActor {
    store: Arc<dyn BookingStore>,
    command_rx: mpsc::Receiver<BookingCommand>,
}

/// Handle for communicating with the Booking actor
#[derive(Clone)]
pub struct BookingActorHandle {
    command_tx: mpsc::Sender<BookingCommand>,
}

impl BookingActorHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> BookingCommand,
    ) -> BookingResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|e| other_error(&format!("Actor mailbox error: {}", e)))?;

        reply_rx
            .await
            .map_err(|_| other_error("Response channel closed"))?
    }

    /// Bookable slots of a provider for a service on a date
    pub async fn available_slots(
        &self,
        provider_id: impl Into<String>,
        service_id: impl Into<String>,
        date: impl Into<String>,
        options: SlotOptions,
    ) -> BookingResult<Availability> {
        let provider_id = provider_id.into();
        let service_id = service_id.into();
        let date = date.into();
        self.request(|reply| BookingCommand::Availability {
            provider_id,
            service_id,
            date,
            options,
            reply,
        })
        .await
    }

    /// Commit a new booking
    pub async fn book(&self, request: BookingRequest) -> BookingResult<Appointment> {
        self.request(|reply| BookingCommand::Book(request, reply))
            .await
    }

    /// Move an existing booking
    pub async fn reschedule(&self, request: RescheduleRequest) -> BookingResult<Appointment> {
        self.request(|reply| BookingCommand::Reschedule(request, reply))
            .await
    }

    /// Change the status of a booking
    pub async fn set_status(
        &self,
        appointment_id: impl Into<String>,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment> {
        let appointment_id = appointment_id.into();
        self.request(|reply| BookingCommand::SetStatus {
            appointment_id,
            status,
            reply,
        })
        .await
    }

    /// Providers that offer a service
    pub async fn providers_for_service(
        &self,
        service_id: impl Into<String>,
    ) -> BookingResult<Vec<Provider>> {
        let service_id = service_id.into();
        self.request(|reply| BookingCommand::ProvidersForService(service_id, reply))
            .await
    }

    /// All appointments of a provider on a date, ordered by start time
    pub async fn appointments_for(
        &self,
        provider_id: impl Into<String>,
        date: impl Into<String>,
    ) -> BookingResult<Vec<Appointment>> {
        let provider_id = provider_id.into();
        let date = date.into();
        self.request(|reply| BookingCommand::AppointmentsFor {
            provider_id,
            date,
            reply,
        })
        .await
    }

    /// Remove an appointment and its review
    pub async fn delete_appointment(
        &self,
        appointment_id: impl Into<String>,
    ) -> BookingResult<()> {
        let appointment_id = appointment_id.into();
        self.request(|reply| BookingCommand::DeleteAppointment(appointment_id, reply))
            .await
    }

    /// All providers
    pub async fn providers(&self) -> BookingResult<Vec<Provider>> {
        self.request(BookingCommand::Providers).await
    }

    /// Add or replace a provider
    pub async fn save_provider(&self, provider: Provider) -> BookingResult<Provider> {
        self.request(|reply| BookingCommand::SaveProvider(provider, reply))
            .await
    }

    /// Remove a provider without open appointments
    pub async fn delete_provider(&self, provider_id: impl Into<String>) -> BookingResult<()> {
        let provider_id = provider_id.into();
        self.request(|reply| BookingCommand::DeleteProvider(provider_id, reply))
            .await
    }

    /// All services
    pub async fn services(&self) -> BookingResult<Vec<Service>> {
        self.request(BookingCommand::Services).await
    }

    /// Add or replace a service
    pub async fn save_service(&self, service: Service) -> BookingResult<Service> {
        self.request(|reply| BookingCommand::SaveService(service, reply))
            .await
    }

    /// Remove a service without open appointments
    pub async fn delete_service(&self, service_id: impl Into<String>) -> BookingResult<()> {
        let service_id = service_id.into();
        self.request(|reply| BookingCommand::DeleteService(service_id, reply))
            .await
    }

    /// Review a completed appointment
    pub async fn add_review(&self, request: ReviewRequest) -> BookingResult<Review> {
        self.request(|reply| BookingCommand::AddReview(request, reply))
            .await
    }

    /// Change the rating or comment of a review
    pub async fn update_review(
        &self,
        review_id: impl Into<String>,
        update: ReviewUpdate,
    ) -> BookingResult<Review> {
        let review_id = review_id.into();
        self.request(|reply| BookingCommand::UpdateReview {
            review_id,
            update,
            reply,
        })
        .await
    }

    /// Store the provider's answer to a review
    pub async fn respond_to_review(
        &self,
        review_id: impl Into<String>,
        response: impl Into<String>,
    ) -> BookingResult<Review> {
        let review_id = review_id.into();
        let response = response.into();
        self.request(|reply| BookingCommand::RespondToReview {
            review_id,
            response,
            reply,
        })
        .await
    }

    /// Remove a review
    pub async fn delete_review(&self, review_id: impl Into<String>) -> BookingResult<()> {
        let review_id = review_id.into();
        self.request(|reply| BookingCommand::DeleteReview(review_id, reply))
            .await
    }

    /// Reviews of a provider, newest first
    pub async fn reviews_for(&self, provider_id: impl Into<String>) -> BookingResult<Vec<Review>> {
        let provider_id = provider_id.into();
        self.request(|reply| BookingCommand::ReviewsFor(provider_id, reply))
            .await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BookingResult<()> {
        self.command_tx
            .send(BookingCommand::Shutdown)
            .await
            .map_err(|e| other_error(&format!("Actor mailbox error: {}", e)))
    }
}

impl BookingActor {
    /// Create a new Booking actor and its handle
    pub fn new(store: Arc<dyn BookingStore>) -> (Self, BookingActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self { store, command_rx };
        let handle = BookingActorHandle { command_tx };

        (actor, handle)
    }

    /// Run the actor's main loop
    pub async fn run(&mut self) {
        info!("Booking actor started");

        while let Some(command) = self.command_rx.recv().await {
            match command {
                BookingCommand::Availability {
                    provider_id,
                    service_id,
                    date,
                    options,
                    reply,
                } => {
                    let result = self
                        .available_slots(&provider_id, &service_id, &date, &options)
                        .await;
                    let _ = reply.send(result);
                }
                BookingCommand::Book(request, reply) => {
                    let _ = reply.send(self.book(request).await);
                }
                BookingCommand::Reschedule(request, reply) => {
                    let _ = reply.send(self.reschedule(request).await);
                }
                BookingCommand::SetStatus {
                    appointment_id,
                    status,
                    reply,
                } => {
                    let _ = reply.send(self.set_status(&appointment_id, status).await);
                }
                BookingCommand::ProvidersForService(service_id, reply) => {
                    let _ = reply.send(self.providers_for_service(&service_id).await);
                }
                BookingCommand::AppointmentsFor {
                    provider_id,
                    date,
                    reply,
                } => {
                    let _ = reply.send(self.appointments_for(&provider_id, &date).await);
                }
                BookingCommand::DeleteAppointment(appointment_id, reply) => {
                    let _ = reply.send(self.delete_appointment(&appointment_id).await);
                }
                BookingCommand::Providers(reply) => {
                    let _ = reply.send(self.store.providers().await);
                }
                BookingCommand::SaveProvider(provider, reply) => {
                    let _ = reply.send(self.save_provider(provider).await);
                }
                BookingCommand::DeleteProvider(provider_id, reply) => {
                    let _ = reply.send(self.delete_provider(&provider_id).await);
                }
                BookingCommand::Services(reply) => {
                    let _ = reply.send(self.store.services().await);
                }
                BookingCommand::SaveService(service, reply) => {
                    let _ = reply.send(self.save_service(service).await);
                }
                BookingCommand::DeleteService(service_id, reply) => {
                    let _ = reply.send(self.delete_service(&service_id).await);
                }
                BookingCommand::AddReview(request, reply) => {
                    let _ = reply.send(self.add_review(request).await);
                }
                BookingCommand::UpdateReview {
                    review_id,
                    update,
                    reply,
                } => {
                    let _ = reply.send(self.update_review(&review_id, update).await);
                }
                BookingCommand::RespondToReview {
                    review_id,
                    response,
                    reply,
                } => {
                    let _ = reply.send(self.respond_to_review(&review_id, &response).await);
                }
                BookingCommand::DeleteReview(review_id, reply) => {
                    let _ = reply.send(self.delete_review(&review_id).await);
                }
                BookingCommand::ReviewsFor(provider_id, reply) => {
                    let _ = reply.send(self.reviews_for(&provider_id).await);
                }
                BookingCommand::Shutdown => {
                    info!("Booking actor shutting down");
                    break;
                }
            }
        }
    }

    async fn require_provider(&self, id: &str) -> BookingResult<Provider> {
        self.store
            .provider(id)
            .await?
            .ok_or_else(|| not_found("provider", id))
    }

    async fn require_service(&self, id: &str) -> BookingResult<Service> {
        self.store
            .service(id)
            .await?
            .ok_or_else(|| not_found("service", id))
    }

    async fn require_appointment(&self, id: &str) -> BookingResult<Appointment> {
        self.store
            .appointment(id)
            .await?
            .ok_or_else(|| not_found("appointment", id))
    }

    async fn require_review(&self, id: &str) -> BookingResult<Review> {
        self.store
            .review(id)
            .await?
            .ok_or_else(|| not_found("review", id))
    }

    async fn available_slots(
        &self,
        provider_id: &str,
        service_id: &str,
        date: &str,
        options: &SlotOptions,
    ) -> BookingResult<Availability> {
        let provider = self.require_provider(provider_id).await?;
        let service = self.require_service(service_id).await?;
        let date = format_date(parse_date(date)?);

        let existing = self.store.appointments_for(&provider.id, &date).await?;
        compute_available_slots(&provider, &service, &date, &existing, options)
    }

    async fn book(&self, request: BookingRequest) -> BookingResult<Appointment> {
        if request.customer_name.trim().is_empty() || request.customer_phone.trim().is_empty() {
            return Err(invalid_input("Customer name and phone are required"));
        }

        let provider = self.require_provider(&request.provider_id).await?;
        let service = self.require_service(&request.service_id).await?;
        let date = format_date(parse_date(&request.date)?);

        // Re-check against the latest data immediately before the write
        let existing = self.store.appointments_for(&provider.id, &date).await?;
        let times = verify_slot(&provider, &service, &date, &request.start_time, &existing, None)
            .inspect_err(|e| warn!("Rejected booking with provider {}: {}", provider.id, e))?;

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            provider_id: provider.id,
            service_id: service.id,
            date: times.date,
            start_time: times.start_time,
            end_time: times.end_time,
            status: AppointmentStatus::Pending,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.trim().to_string(),
            notes: request.notes,
            created_at: Some(Utc::now()),
        };

        self.store.save_appointment(appointment.clone()).await?;
        info!(
            "Booked appointment {} with provider {} on {} {}-{}",
            appointment.id,
            appointment.provider_id,
            appointment.date,
            appointment.start_time,
            appointment.end_time
        );

        Ok(appointment)
    }

    async fn reschedule(&self, request: RescheduleRequest) -> BookingResult<Appointment> {
        let mut appointment = self.require_appointment(&request.appointment_id).await?;
        if appointment.status.is_terminal() {
            return Err(invalid_input(&format!(
                "Appointment {} is {} and cannot be rescheduled",
                appointment.id, appointment.status
            )));
        }

        let provider_id = request
            .provider_id
            .unwrap_or_else(|| appointment.provider_id.clone());
        let provider = self.require_provider(&provider_id).await?;
        let service = self.require_service(&appointment.service_id).await?;
        let date = request.date.as_deref().unwrap_or(&appointment.date);
        let date = format_date(parse_date(date)?);

        // The appointment's own current slot must not block it
        let existing = self.store.appointments_for(&provider.id, &date).await?;
        let times = verify_slot(
            &provider,
            &service,
            &date,
            &request.start_time,
            &existing,
            Some(&appointment.id),
        )
        .inspect_err(|e| warn!("Rejected reschedule of {}: {}", appointment.id, e))?;

        appointment.provider_id = provider.id;
        appointment.date = times.date;
        appointment.start_time = times.start_time;
        appointment.end_time = times.end_time;

        self.store.save_appointment(appointment.clone()).await?;
        info!(
            "Rescheduled appointment {} to provider {} on {} {}-{}",
            appointment.id,
            appointment.provider_id,
            appointment.date,
            appointment.start_time,
            appointment.end_time
        );

        Ok(appointment)
    }

    async fn set_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment> {
        let mut appointment = self.require_appointment(appointment_id).await?;
        if !appointment.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: appointment.status,
                to: status,
            });
        }

        appointment.status = status;
        self.store.save_appointment(appointment.clone()).await?;
        info!("Appointment {} is now {}", appointment.id, status);

        Ok(appointment)
    }

    async fn providers_for_service(&self, service_id: &str) -> BookingResult<Vec<Provider>> {
        let providers = self.store.providers().await?;
        Ok(providers_for_service(&providers, service_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn appointments_for(
        &self,
        provider_id: &str,
        date: &str,
    ) -> BookingResult<Vec<Appointment>> {
        let date = format_date(parse_date(date)?);
        let mut appointments = self.store.appointments_for(provider_id, &date).await?;
        appointments.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(appointments)
    }

    async fn delete_appointment(&self, appointment_id: &str) -> BookingResult<()> {
        let appointment = self.require_appointment(appointment_id).await?;
        self.store.delete_appointment(&appointment.id).await?;

        let reviews = self.store.reviews().await?;
        let orphaned: Vec<&Review> = reviews
            .iter()
            .filter(|r| r.appointment_id == appointment.id)
            .collect();
        for review in &orphaned {
            self.store.delete_review(&review.id).await?;
        }
        if !orphaned.is_empty() {
            self.refresh_rating(&appointment.provider_id).await?;
        }

        info!("Deleted appointment {}", appointment.id);
        Ok(())
    }

    /// Appointments that still hold a slot in the future workflow
    async fn open_appointments(
        &self,
        matches: impl Fn(&Appointment) -> bool,
    ) -> BookingResult<usize> {
        Ok(self
            .store
            .appointments()
            .await?
            .iter()
            .filter(|a| !a.status.is_terminal() && matches(a))
            .count())
    }

    async fn save_provider(&self, mut provider: Provider) -> BookingResult<Provider> {
        for service_id in &provider.service_ids {
            self.require_service(service_id).await?;
        }

        // The rating always follows the stored reviews
        provider.average_rating = average_rating(&self.store.reviews().await?, &provider.id);
        self.store.save_provider(provider.clone()).await?;
        info!("Saved provider {} ({})", provider.id, provider.name);

        Ok(provider)
    }

    async fn delete_provider(&self, provider_id: &str) -> BookingResult<()> {
        let provider = self.require_provider(provider_id).await?;
        let open = self
            .open_appointments(|a| a.provider_id == provider.id)
            .await?;
        if open > 0 {
            return Err(invalid_input(&format!(
                "Provider {} still has {} open appointments",
                provider.id, open
            )));
        }

        self.store.delete_provider(&provider.id).await?;
        info!("Deleted provider {}", provider.id);
        Ok(())
    }

    async fn save_service(&self, service: Service) -> BookingResult<Service> {
        self.store.save_service(service.clone()).await?;
        info!("Saved service {} ({})", service.id, service.name);
        Ok(service)
    }

    async fn delete_service(&self, service_id: &str) -> BookingResult<()> {
        let service = self.require_service(service_id).await?;
        let open = self
            .open_appointments(|a| a.service_id == service.id)
            .await?;
        if open > 0 {
            return Err(invalid_input(&format!(
                "Service {} still has {} open appointments",
                service.id, open
            )));
        }

        for mut provider in self.store.providers().await? {
            if provider.service_ids.remove(&service.id) {
                self.store.save_provider(provider).await?;
            }
        }

        self.store.delete_service(&service.id).await?;
        info!("Deleted service {}", service.id);
        Ok(())
    }

    async fn add_review(&self, request: ReviewRequest) -> BookingResult<Review> {
        validate_rating(request.rating)?;
        let appointment = self.require_appointment(&request.appointment_id).await?;
        if appointment.status != AppointmentStatus::Completed {
            return Err(Error::ReviewNotAllowed {
                appointment_id: appointment.id,
                status: appointment.status,
            });
        }

        let reviews = self.store.reviews().await?;
        if reviews.iter().any(|r| r.appointment_id == appointment.id) {
            return Err(Error::AlreadyReviewed(appointment.id));
        }

        let review = Review {
            id: Uuid::new_v4().to_string(),
            appointment_id: appointment.id,
            provider_id: appointment.provider_id,
            service_id: appointment.service_id,
            customer_name: appointment.customer_name,
            rating: request.rating,
            comment: request.comment.trim().to_string(),
            response: None,
            created_at: Some(Utc::now()),
        };

        self.store.save_review(review.clone()).await?;
        info!(
            "Added {}-star review {} for provider {}",
            review.rating, review.id, review.provider_id
        );
        self.refresh_rating(&review.provider_id).await?;

        Ok(review)
    }

    async fn update_review(&self, review_id: &str, update: ReviewUpdate) -> BookingResult<Review> {
        let mut review = self.require_review(review_id).await?;
        if let Some(rating) = update.rating {
            validate_rating(rating)?;
            review.rating = rating;
        }
        if let Some(comment) = update.comment {
            review.comment = comment.trim().to_string();
        }

        self.store.save_review(review.clone()).await?;
        self.refresh_rating(&review.provider_id).await?;
        Ok(review)
    }

    async fn respond_to_review(&self, review_id: &str, response: &str) -> BookingResult<Review> {
        let response = response.trim();
        if response.is_empty() {
            return Err(invalid_input("Response must not be empty"));
        }

        let mut review = self.require_review(review_id).await?;
        review.response = Some(response.to_string());
        self.store.save_review(review.clone()).await?;
        Ok(review)
    }

    async fn delete_review(&self, review_id: &str) -> BookingResult<()> {
        let review = self.require_review(review_id).await?;
        self.store.delete_review(&review.id).await?;
        info!("Deleted review {}", review.id);
        self.refresh_rating(&review.provider_id).await
    }

    async fn reviews_for(&self, provider_id: &str) -> BookingResult<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .store
            .reviews()
            .await?
            .into_iter()
            .filter(|r| r.provider_id == provider_id)
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// Recompute a provider's average rating from its reviews
    async fn refresh_rating(&self, provider_id: &str) -> BookingResult<()> {
        let Some(mut provider) = self.store.provider(provider_id).await? else {
            return Ok(());
        };

        let rating = average_rating(&self.store.reviews().await?, provider_id);
        if provider.average_rating != rating {
            provider.average_rating = rating;
            self.store.save_provider(provider).await?;
            debug!("Provider {} is now rated {:.1}", provider_id, rating);
        }
        Ok(())
    }
}
