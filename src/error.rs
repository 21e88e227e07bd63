use crate::components::availability::models::AppointmentStatus;
use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Invalid input: {0}")]
    #[diagnostic(code(salon_booking::invalid_input))]
    InvalidInput(String),

    #[error("Provider {provider_id} does not offer service {service_id}")]
    #[diagnostic(code(salon_booking::service_not_offered))]
    ServiceNotOffered {
        provider_id: String,
        service_id: String,
    },

    #[error("Provider {provider_id} is not working at {start_time} on {date}")]
    #[diagnostic(
        code(salon_booking::outside_working_hours),
        help("Choose a time inside the provider's working hours")
    )]
    OutsideWorkingHours {
        provider_id: String,
        date: String,
        start_time: String,
    },

    #[error("Provider {provider_id} already has {limit} appointments on {date}")]
    #[diagnostic(
        code(salon_booking::capacity_reached),
        help("Choose another date or another provider")
    )]
    CapacityReached {
        provider_id: String,
        date: String,
        limit: u32,
    },

    #[error("The slot {start_time} on {date} is no longer available for provider {provider_id}")]
    #[diagnostic(
        code(salon_booking::slot_no_longer_available),
        help("Please pick another time")
    )]
    SlotNoLongerAvailable {
        provider_id: String,
        date: String,
        start_time: String,
    },

    #[error("Cannot change appointment status from {from} to {to}")]
    #[diagnostic(code(salon_booking::invalid_transition))]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment {appointment_id} is {status} and cannot be reviewed")]
    #[diagnostic(
        code(salon_booking::review_not_allowed),
        help("Only completed appointments can be reviewed")
    )]
    ReviewNotAllowed {
        appointment_id: String,
        status: AppointmentStatus,
    },

    #[error("Appointment {0} already has a review")]
    #[diagnostic(code(salon_booking::already_reviewed))]
    AlreadyReviewed(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(salon_booking::not_found))]
    NotFound(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(salon_booking::storage))]
    Storage(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(salon_booking::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(salon_booking::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(salon_booking::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(salon_booking::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(salon_booking::other))]
    Other(String),
}

/// Problems with individual stored records that are skipped rather than
/// failing the whole calculation
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DataWarning {
    #[error("Skipped schedule entry for day {day_of_week}: {reason}")]
    #[diagnostic(code(salon_booking::malformed_schedule_entry))]
    MalformedScheduleEntry { day_of_week: u8, reason: String },

    #[error("Skipped appointment {appointment_id}: {reason}")]
    #[diagnostic(code(salon_booking::malformed_appointment_entry))]
    MalformedAppointmentEntry {
        appointment_id: String,
        reason: String,
    },

    #[error("Ignored duplicate schedule entry for day {day_of_week}")]
    #[diagnostic(code(salon_booking::duplicate_schedule_day))]
    DuplicateScheduleDay { day_of_week: u8 },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BookingResult<T> = Result<T, Error>;

/// Helper to create invalid input errors
pub fn invalid_input(message: &str) -> Error {
    Error::InvalidInput(message.to_string())
}

/// Helper to create not found errors
pub fn not_found(what: &str, id: &str) -> Error {
    Error::NotFound(format!("{} '{}'", what, id))
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid value for environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
