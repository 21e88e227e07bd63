use crate::error::{invalid_input, BookingResult, DataWarning, Error};
use crate::utils::time::format_minutes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

fn default_true() -> bool {
    true
}

/// Working hours of a provider on one day of the week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkScheduleEntry {
    /// 0 = Sunday ... 6 = Saturday
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_working: bool,
}

impl WorkScheduleEntry {
    /// Create a working day entry
    pub fn working(day_of_week: u8, start_time: &str, end_time: &str) -> Self {
        Self {
            day_of_week,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            is_working: true,
        }
    }

    /// Create a day off entry
    pub fn day_off(day_of_week: u8) -> Self {
        Self {
            day_of_week,
            start_time: String::new(),
            end_time: String::new(),
            is_working: false,
        }
    }
}

/// A bookable person (called employee in stored data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub work_schedule: Vec<WorkScheduleEntry>,
    pub max_appointments_per_day: u32,
    pub service_ids: BTreeSet<String>,
    /// Mean review rating rounded to one decimal, 0 when unrated
    #[serde(default)]
    pub average_rating: f64,
}

impl Provider {
    /// Whether this provider can be booked for the given service
    pub fn offers(&self, service_id: &str) -> bool {
        self.service_ids.contains(service_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled appointments never block a slot or count toward the daily cap
    pub fn is_active(self) -> bool {
        self != AppointmentStatus::Cancelled
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Allowed transitions: pending -> confirmed -> completed, and
    /// cancellation from any non-terminal state
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for AppointmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(invalid_input(&format!("Unknown appointment status: {}", other))),
        }
    }
}

/// An existing booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    #[serde(alias = "employeeId")]
    pub provider_id: String,
    #[serde(default)]
    pub service_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub start_time: String,
    /// HH:MM, stored at creation as start + service duration
    pub end_time: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fixed half-day booking windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfDay {
    Morning,
    Afternoon,
}

impl HalfDay {
    pub const ALL: [HalfDay; 2] = [HalfDay::Morning, HalfDay::Afternoon];

    /// Window bounds in minutes since midnight, end exclusive
    pub fn bounds(self) -> (u32, u32) {
        match self {
            HalfDay::Morning => (8 * 60, 12 * 60),
            HalfDay::Afternoon => (13 * 60, 17 * 60),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HalfDay::Morning => "morning",
            HalfDay::Afternoon => "afternoon",
        }
    }
}

/// A bookable start time or half-day window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Slot {
    Start(String),
    HalfDay(HalfDay),
}

impl Slot {
    /// The HH:MM start time a booking for this slot would use
    pub fn start_time(&self) -> String {
        match self {
            Slot::Start(time) => time.clone(),
            Slot::HalfDay(window) => format_minutes(window.bounds().0),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Start(time) => f.write_str(time),
            Slot::HalfDay(window) => f.write_str(window.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Start times stepped from the start of working hours
    Fine { step_minutes: u32 },
    /// The fixed morning and afternoon windows
    HalfDay,
}

impl Granularity {
    /// Build from a configuration name ("fine" or "half-day")
    pub fn from_name(name: &str, step_minutes: u32) -> BookingResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fine" => Ok(Granularity::Fine { step_minutes }),
            "half-day" | "half_day" | "halfday" => Ok(Granularity::HalfDay),
            other => Err(invalid_input(&format!(
                "Unknown slot granularity '{}', expected 'fine' or 'half-day'",
                other
            ))),
        }
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Fine { step_minutes: 30 }
    }
}

/// Options controlling slot generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotOptions {
    pub granularity: Granularity,
    /// Appointment being rescheduled, ignored during the calculation
    pub exclude_appointment_id: Option<String>,
}

impl SlotOptions {
    pub fn fine(step_minutes: u32) -> Self {
        Self {
            granularity: Granularity::Fine { step_minutes },
            exclude_appointment_id: None,
        }
    }

    pub fn half_day() -> Self {
        Self {
            granularity: Granularity::HalfDay,
            exclude_appointment_id: None,
        }
    }

    pub fn excluding(mut self, appointment_id: impl Into<String>) -> Self {
        self.exclude_appointment_id = Some(appointment_id.into());
        self
    }
}

/// Result of an availability calculation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Availability {
    /// Canonical YYYY-MM-DD date the slots belong to
    pub date: String,
    pub slots: Vec<Slot>,
    /// Records that were skipped while computing the slots
    pub warnings: Vec<DataWarning>,
}

impl Availability {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots rendered as strings, in chronological order
    pub fn labels(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.to_string()).collect()
    }
}

/// Start and end time to store for a verified booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTimes {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use AppointmentStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));

        assert!(Completed.is_active());
        assert!(!Cancelled.is_active());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "Confirmed".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Confirmed
        );
        assert_eq!(
            "canceled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!("archived".parse::<AppointmentStatus>().is_err());

        // Stored data is not consistent about case
        let status: AppointmentStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(status, AppointmentStatus::Completed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"completed\"");
        assert!(serde_json::from_str::<AppointmentStatus>("\"lost\"").is_err());
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(Slot::Start("09:30".to_string()).to_string(), "09:30");
        assert_eq!(Slot::HalfDay(HalfDay::Morning).to_string(), "morning");
        assert_eq!(Slot::HalfDay(HalfDay::Afternoon).start_time(), "13:00");
    }

    #[test]
    fn test_granularity_from_name() {
        assert_eq!(
            Granularity::from_name("fine", 15).unwrap(),
            Granularity::Fine { step_minutes: 15 }
        );
        assert_eq!(Granularity::from_name("Half-Day", 15).unwrap(), Granularity::HalfDay);
        assert!(Granularity::from_name("hourly", 60).is_err());
    }

    #[test]
    fn test_appointment_accepts_employee_id() {
        let json = r#"{
            "id": "a1",
            "employeeId": "e1",
            "serviceId": "s1",
            "date": "2024-01-01",
            "startTime": "10:00",
            "endTime": "10:30",
            "status": "confirmed"
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.provider_id, "e1");
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert!(appointment.created_at.is_none());
    }
}
