//! Booking commits. All writes go through a single actor so that the
//! availability re-check and the write happen back to back.

mod actor;
mod handle;
pub mod models;

pub use handle::BookingHandle;
pub use models::{BookingRequest, RescheduleRequest};
