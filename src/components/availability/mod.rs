//! Pure calculation of bookable slots from a provider's weekly schedule and
//! existing appointments. Nothing here performs I/O.

pub mod calculator;
pub mod models;

pub use calculator::{
    calculate_end_time, compute_available_slots, count_active_appointments, has_conflict,
    is_within_working_hours, overlaps, providers_for_service, verify_slot, WorkingHours,
};
pub use models::{
    Appointment, AppointmentStatus, Availability, Granularity, HalfDay, Provider, Service, Slot,
    SlotOptions, SlotTimes, WorkScheduleEntry,
};
