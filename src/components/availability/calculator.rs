use super::models::{
    Appointment, Availability, Granularity, HalfDay, Provider, Service, Slot, SlotOptions,
    SlotTimes, WorkScheduleEntry,
};
use crate::error::{invalid_input, BookingResult, DataWarning, Error};
use crate::utils::time::{
    format_date, format_minutes, parse_date, to_minutes, weekday_index, MINUTES_PER_DAY,
};
use tracing::{debug, warn};

/// Working hours of one day in minutes since midnight, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub start: u32,
    pub end: u32,
}

impl WorkingHours {
    /// Whether [start, end) lies entirely inside these hours
    pub fn contains(&self, start: u32, end: u32) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Half-open interval overlap. Intervals that only touch do not overlap.
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && a_end > b_start
}

/// Parse the working hours of a schedule entry
pub(crate) fn parse_hours(entry: &WorkScheduleEntry) -> Result<WorkingHours, String> {
    let start = to_minutes(&entry.start_time)
        .ok_or_else(|| format!("invalid start time '{}'", entry.start_time))?;
    let end = to_minutes(&entry.end_time)
        .ok_or_else(|| format!("invalid end time '{}'", entry.end_time))?;
    if start >= end {
        return Err(format!(
            "start time {} is not before end time {}",
            entry.start_time, entry.end_time
        ));
    }
    Ok(WorkingHours { start, end })
}

fn appointment_interval(appointment: &Appointment) -> Result<(u32, u32), String> {
    let start = to_minutes(&appointment.start_time)
        .ok_or_else(|| format!("invalid start time '{}'", appointment.start_time))?;
    let end = to_minutes(&appointment.end_time)
        .ok_or_else(|| format!("invalid end time '{}'", appointment.end_time))?;
    if start >= end {
        return Err(format!(
            "start time {} is not before end time {}",
            appointment.start_time, appointment.end_time
        ));
    }
    Ok((start, end))
}

/// Non-cancelled appointment of this provider on this date, other than the excluded one
fn is_blocking(
    appointment: &Appointment,
    provider_id: &str,
    date: &str,
    exclude: Option<&str>,
) -> bool {
    appointment.status.is_active()
        && appointment.provider_id == provider_id
        && same_date(&appointment.date, date)
        && exclude.map_or(true, |id| appointment.id != id)
}

/// Compare a stored date, which may lack zero padding, with a canonical one
fn same_date(stored: &str, canonical: &str) -> bool {
    stored == canonical
        || parse_date(stored)
            .map(|d| format_date(d) == canonical)
            .unwrap_or(false)
}

fn canonical_date(date: &str) -> String {
    parse_date(date)
        .map(format_date)
        .unwrap_or_else(|_| date.to_string())
}

fn service_duration(service: &Service) -> BookingResult<u32> {
    u32::try_from(service.duration_minutes)
        .ok()
        .filter(|duration| *duration > 0)
        .ok_or_else(|| {
            invalid_input(&format!(
                "Service {} has invalid duration {} minutes",
                service.id, service.duration_minutes
            ))
        })
}

fn ensure_offered(provider: &Provider, service: &Service) -> BookingResult<()> {
    if provider.offers(&service.id) {
        Ok(())
    } else {
        Err(Error::ServiceNotOffered {
            provider_id: provider.id.clone(),
            service_id: service.id.clone(),
        })
    }
}

fn validate_schedule_days(provider: &Provider) -> BookingResult<()> {
    match provider.work_schedule.iter().find(|e| e.day_of_week > 6) {
        Some(entry) => Err(invalid_input(&format!(
            "Provider {} has a schedule entry for day {}, expected 0-6",
            provider.id, entry.day_of_week
        ))),
        None => Ok(()),
    }
}

/// First schedule entry for the day wins
fn resolve_working_hours(
    schedule: &[WorkScheduleEntry],
    day_of_week: u8,
    warnings: &mut Vec<DataWarning>,
) -> Option<WorkingHours> {
    let mut matching = schedule.iter().filter(|e| e.day_of_week == day_of_week);
    let entry = matching.next()?;

    if matching.next().is_some() {
        warn!("Multiple schedule entries for day {}, using the first", day_of_week);
        warnings.push(DataWarning::DuplicateScheduleDay { day_of_week });
    }

    if !entry.is_working {
        return None;
    }

    match parse_hours(entry) {
        Ok(hours) => Some(hours),
        Err(reason) => {
            warn!("Skipping schedule entry for day {}: {}", day_of_week, reason);
            warnings.push(DataWarning::MalformedScheduleEntry {
                day_of_week,
                reason,
            });
            None
        }
    }
}

/// Working hours and bookings of one provider on one date
struct DayPlan {
    date: String,
    hours: Option<WorkingHours>,
    active_count: usize,
    booked: Vec<(u32, u32)>,
    warnings: Vec<DataWarning>,
}

impl DayPlan {
    fn resolve(
        provider: &Provider,
        date: &str,
        existing: &[Appointment],
        exclude: Option<&str>,
    ) -> BookingResult<Self> {
        validate_schedule_days(provider)?;
        let parsed = parse_date(date)?;
        let date = format_date(parsed);

        let mut warnings = Vec::new();
        let weekday = weekday_index(parsed);
        let hours = resolve_working_hours(&provider.work_schedule, weekday, &mut warnings);

        let active: Vec<&Appointment> = existing
            .iter()
            .filter(|a| is_blocking(a, &provider.id, &date, exclude))
            .collect();

        // Unparsable bookings still count toward the cap
        let mut booked = Vec::with_capacity(active.len());
        for appointment in &active {
            match appointment_interval(appointment) {
                Ok(interval) => booked.push(interval),
                Err(reason) => {
                    warn!(
                        "Skipping appointment {} in conflict check: {}",
                        appointment.id, reason
                    );
                    warnings.push(DataWarning::MalformedAppointmentEntry {
                        appointment_id: appointment.id.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(Self {
            date,
            hours,
            active_count: active.len(),
            booked,
            warnings,
        })
    }

    fn is_free(&self, start: u32, end: u32) -> bool {
        !self
            .booked
            .iter()
            .any(|&(booked_start, booked_end)| overlaps(start, end, booked_start, booked_end))
    }

    fn at_capacity(&self, provider: &Provider) -> bool {
        self.active_count >= provider.max_appointments_per_day as usize
    }
}

/// Compute the bookable slots of a provider for a service on a date.
///
/// An empty result means the provider does not work that day, the daily cap
/// is reached, or every candidate conflicts with an existing booking. Errors
/// are returned for malformed input, and `ServiceNotOffered` when the
/// provider does not offer the service. The appointments may include other
/// providers and dates; they are filtered here.
pub fn compute_available_slots(
    provider: &Provider,
    service: &Service,
    date: &str,
    existing: &[Appointment],
    options: &SlotOptions,
) -> BookingResult<Availability> {
    let duration = service_duration(service)?;
    if let Granularity::Fine { step_minutes: 0 } = options.granularity {
        return Err(invalid_input("Slot step must be greater than zero"));
    }
    ensure_offered(provider, service)?;

    let mut plan = DayPlan::resolve(
        provider,
        date,
        existing,
        options.exclude_appointment_id.as_deref(),
    )?;

    let mut availability = Availability {
        date: plan.date.clone(),
        slots: Vec::new(),
        warnings: std::mem::take(&mut plan.warnings),
    };

    let Some(hours) = plan.hours else {
        debug!("Provider {} is not working on {}", provider.id, plan.date);
        return Ok(availability);
    };

    if plan.at_capacity(provider) {
        debug!(
            "Provider {} has reached {} appointments on {}",
            provider.id, provider.max_appointments_per_day, plan.date
        );
        return Ok(availability);
    }

    match options.granularity {
        Granularity::Fine { step_minutes } => {
            let mut start = hours.start;
            loop {
                let end = match start.checked_add(duration) {
                    Some(end) if end <= hours.end => end,
                    _ => break,
                };
                if plan.is_free(start, end) {
                    availability.slots.push(Slot::Start(format_minutes(start)));
                }
                start = match start.checked_add(step_minutes) {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        Granularity::HalfDay => {
            for window in HalfDay::ALL {
                let (start, end) = window.bounds();
                if hours.contains(start, end) && duration <= end - start && plan.is_free(start, end)
                {
                    availability.slots.push(Slot::HalfDay(window));
                }
            }
        }
    }

    Ok(availability)
}

/// Check that a booking starting at `start_time` can be committed against
/// the latest appointments, returning the times to store.
///
/// Runs the same day resolution and overlap test as
/// [`compute_available_slots`], for any start time.
pub fn verify_slot(
    provider: &Provider,
    service: &Service,
    date: &str,
    start_time: &str,
    existing: &[Appointment],
    exclude_appointment_id: Option<&str>,
) -> BookingResult<SlotTimes> {
    ensure_offered(provider, service)?;
    let duration = service_duration(service)?;
    let start = to_minutes(start_time).ok_or_else(|| {
        invalid_input(&format!("Invalid start time '{}', expected HH:MM", start_time))
    })?;

    let plan = DayPlan::resolve(provider, date, existing, exclude_appointment_id)?;

    let outside = || Error::OutsideWorkingHours {
        provider_id: provider.id.clone(),
        date: plan.date.clone(),
        start_time: format_minutes(start),
    };
    let hours = plan.hours.ok_or_else(outside)?;
    let end = start
        .checked_add(duration)
        .filter(|end| hours.contains(start, *end))
        .ok_or_else(outside)?;

    if plan.at_capacity(provider) {
        return Err(Error::CapacityReached {
            provider_id: provider.id.clone(),
            date: plan.date,
            limit: provider.max_appointments_per_day,
        });
    }

    if !plan.is_free(start, end) {
        return Err(Error::SlotNoLongerAvailable {
            provider_id: provider.id.clone(),
            date: plan.date,
            start_time: format_minutes(start),
        });
    }

    Ok(SlotTimes {
        date: plan.date,
        start_time: format_minutes(start),
        end_time: format_minutes(end),
    })
}

/// End time of a booking, or None if it would run past midnight
pub fn calculate_end_time(start_time: &str, duration_minutes: u32) -> Option<String> {
    let end = to_minutes(start_time)?.checked_add(duration_minutes)?;
    (end < MINUTES_PER_DAY).then(|| format_minutes(end))
}

/// Whether [start_time, end_time) lies within the provider's working hours on `date`
pub fn is_within_working_hours(
    provider: &Provider,
    date: &str,
    start_time: &str,
    end_time: &str,
) -> BookingResult<bool> {
    validate_schedule_days(provider)?;
    let parsed = parse_date(date)?;
    let start = to_minutes(start_time)
        .ok_or_else(|| invalid_input(&format!("Invalid start time '{}'", start_time)))?;
    let end = to_minutes(end_time)
        .ok_or_else(|| invalid_input(&format!("Invalid end time '{}'", end_time)))?;

    let mut warnings = Vec::new();
    Ok(
        resolve_working_hours(&provider.work_schedule, weekday_index(parsed), &mut warnings)
            .is_some_and(|hours| start < end && hours.contains(start, end)),
    )
}

/// Number of non-cancelled appointments of a provider on a date
pub fn count_active_appointments(
    appointments: &[Appointment],
    provider_id: &str,
    date: &str,
) -> usize {
    let date = canonical_date(date);
    appointments
        .iter()
        .filter(|a| is_blocking(a, provider_id, &date, None))
        .count()
}

/// Whether [start_time, end_time) overlaps a non-cancelled appointment of the
/// provider on the date. Appointments with unparsable times are ignored.
pub fn has_conflict(
    appointments: &[Appointment],
    provider_id: &str,
    date: &str,
    start_time: &str,
    end_time: &str,
    exclude_appointment_id: Option<&str>,
) -> BookingResult<bool> {
    let start = to_minutes(start_time)
        .ok_or_else(|| invalid_input(&format!("Invalid start time '{}'", start_time)))?;
    let end = to_minutes(end_time)
        .ok_or_else(|| invalid_input(&format!("Invalid end time '{}'", end_time)))?;

    let date = canonical_date(date);
    Ok(appointments
        .iter()
        .filter(|a| is_blocking(a, provider_id, &date, exclude_appointment_id))
        .filter_map(|a| appointment_interval(a).ok())
        .any(|(s, e)| overlaps(start, end, s, e)))
}

/// Providers that can be booked for a service
pub fn providers_for_service<'a>(providers: &'a [Provider], service_id: &str) -> Vec<&'a Provider> {
    providers.iter().filter(|p| p.offers(service_id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::availability::models::AppointmentStatus;

    // 2024-01-01 was a Monday
    const MONDAY: &str = "2024-01-01";
    const SUNDAY: &str = "2024-01-07";

    fn provider() -> Provider {
        Provider {
            id: "p1".to_string(),
            name: "Linh".to_string(),
            work_schedule: vec![
                WorkScheduleEntry::working(1, "09:00", "17:00"),
                WorkScheduleEntry::day_off(2),
            ],
            max_appointments_per_day: 10,
            average_rating: 0.0,
            service_ids: ["s1".to_string()].into_iter().collect(),
        }
    }

    fn service(duration_minutes: i64) -> Service {
        Service {
            id: "s1".to_string(),
            name: "Haircut".to_string(),
            duration_minutes,
            price: 150_000.0,
            description: None,
        }
    }

    fn appointment(id: &str, start: &str, end: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.to_string(),
            provider_id: "p1".to_string(),
            service_id: "s1".to_string(),
            date: MONDAY.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            status,
            customer_name: "Mai".to_string(),
            customer_phone: "0900000000".to_string(),
            notes: None,
            created_at: None,
        }
    }

    fn labels(availability: &Availability) -> Vec<String> {
        availability.labels()
    }

    #[test]
    fn test_full_free_day() {
        let result =
            compute_available_slots(&provider(), &service(30), MONDAY, &[], &SlotOptions::fine(30))
                .unwrap();

        let slots = labels(&result);
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("16:30"));
        assert!(!slots.contains(&"17:00".to_string()));
        assert_eq!(result.date, MONDAY);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_last_slot_ends_at_closing() {
        let result =
            compute_available_slots(&provider(), &service(45), MONDAY, &[], &SlotOptions::fine(15))
                .unwrap();
        // 16:15 + 45 minutes ends exactly at 17:00
        assert_eq!(result.slots.last(), Some(&Slot::Start("16:15".to_string())));
    }

    #[test]
    fn test_existing_booking_blocks_overlapping_starts() {
        let existing = vec![appointment("a1", "10:00", "10:30", AppointmentStatus::Confirmed)];

        let thirty = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(30),
        )
        .unwrap();
        let slots = labels(&thirty);
        assert_eq!(slots.len(), 15);
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"10:30".to_string()));

        let fifteen = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(15),
        )
        .unwrap();
        let slots = labels(&fifteen);
        assert!(!slots.contains(&"09:45".to_string()));
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(!slots.contains(&"10:15".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"10:30".to_string()));
    }

    #[test]
    fn test_capacity_reached() {
        let mut provider = provider();
        provider.max_appointments_per_day = 1;
        let existing = vec![appointment("a1", "15:00", "15:30", AppointmentStatus::Confirmed)];

        let options = SlotOptions::fine(30);
        let result =
            compute_available_slots(&provider, &service(30), MONDAY, &existing, &options).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_non_working_days() {
        // No entry for Sunday
        let result =
            compute_available_slots(&provider(), &service(30), SUNDAY, &[], &SlotOptions::fine(30))
                .unwrap();
        assert!(result.is_empty());

        // Tuesday is marked as a day off
        let result = compute_available_slots(
            &provider(),
            &service(30),
            "2024-01-02",
            &[],
            &SlotOptions::fine(30),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_cancelled_booking_does_not_block() {
        let existing = vec![appointment("a1", "14:00", "14:30", AppointmentStatus::Cancelled)];
        let result = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(30),
        )
        .unwrap();
        assert!(labels(&result).contains(&"14:00".to_string()));
        assert_eq!(result.slots.len(), 16);
    }

    #[test]
    fn test_excluded_appointment_reappears() {
        let existing = vec![appointment("a1", "11:00", "11:30", AppointmentStatus::Confirmed)];

        let without = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(30),
        )
        .unwrap();
        assert!(!labels(&without).contains(&"11:00".to_string()));

        let with = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(30).excluding("a1"),
        )
        .unwrap();
        assert!(labels(&with).contains(&"11:00".to_string()));
    }

    #[test]
    fn test_excluded_appointment_frees_capacity() {
        let mut provider = provider();
        provider.max_appointments_per_day = 1;
        let existing = vec![appointment("a1", "11:00", "11:30", AppointmentStatus::Pending)];

        let result = compute_available_slots(
            &provider,
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(30).excluding("a1"),
        )
        .unwrap();
        assert_eq!(result.slots.len(), 16);
    }

    #[test]
    fn test_other_providers_and_dates_are_ignored() {
        let mut other_provider = appointment("a1", "09:00", "17:00", AppointmentStatus::Confirmed);
        other_provider.provider_id = "p2".to_string();
        let mut other_date = appointment("a2", "09:00", "17:00", AppointmentStatus::Confirmed);
        other_date.date = "2024-01-08".to_string();

        let result = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &[other_provider, other_date],
            &SlotOptions::fine(30),
        )
        .unwrap();
        assert_eq!(result.slots.len(), 16);
    }

    #[test]
    fn test_touching_intervals_are_free() {
        let existing = vec![
            appointment("a1", "09:00", "10:00", AppointmentStatus::Confirmed),
            appointment("a2", "11:00", "12:00", AppointmentStatus::Confirmed),
        ];
        let result = compute_available_slots(
            &provider(),
            &service(60),
            MONDAY,
            &existing,
            &SlotOptions::fine(60),
        )
        .unwrap();
        assert_eq!(
            labels(&result),
            vec!["10:00", "12:00", "13:00", "14:00", "15:00", "16:00"]
        );
    }

    #[test]
    fn test_half_day_windows() {
        let mut provider = provider();
        provider.work_schedule = vec![WorkScheduleEntry::working(1, "08:00", "17:00")];

        let result =
            compute_available_slots(&provider, &service(60), MONDAY, &[], &SlotOptions::half_day())
                .unwrap();
        assert_eq!(
            result.slots,
            vec![
                Slot::HalfDay(HalfDay::Morning),
                Slot::HalfDay(HalfDay::Afternoon)
            ]
        );

        // A booking inside the morning blocks only that window
        let existing = vec![appointment("a1", "11:30", "12:00", AppointmentStatus::Pending)];
        let result = compute_available_slots(
            &provider,
            &service(60),
            MONDAY,
            &existing,
            &SlotOptions::half_day(),
        )
        .unwrap();
        assert_eq!(result.labels(), vec!["afternoon"]);

        // 09:00-17:00 does not cover the whole morning window
        let result = compute_available_slots(
            &self::provider(),
            &service(60),
            MONDAY,
            &[],
            &SlotOptions::half_day(),
        )
        .unwrap();
        assert_eq!(result.labels(), vec!["afternoon"]);
    }

    #[test]
    fn test_invalid_input() {
        let options = SlotOptions::fine(30);
        assert!(matches!(
            compute_available_slots(&provider(), &service(0), MONDAY, &[], &options),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            compute_available_slots(&provider(), &service(-15), MONDAY, &[], &options),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            compute_available_slots(&provider(), &service(30), "2024-02-30", &[], &options),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            compute_available_slots(&provider(), &service(30), MONDAY, &[], &SlotOptions::fine(0)),
            Err(Error::InvalidInput(_))
        ));

        let mut bad_day = provider();
        bad_day.work_schedule.push(WorkScheduleEntry::working(7, "09:00", "17:00"));
        assert!(matches!(
            compute_available_slots(&bad_day, &service(30), MONDAY, &[], &options),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_service_not_offered() {
        let mut other = service(30);
        other.id = "s2".to_string();
        assert!(matches!(
            compute_available_slots(&provider(), &other, MONDAY, &[], &SlotOptions::fine(30)),
            Err(Error::ServiceNotOffered { .. })
        ));
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let existing = vec![
            appointment("bad", "Invalid Date", "10:30", AppointmentStatus::Confirmed),
            appointment("a1", "10:00", "10:30", AppointmentStatus::Confirmed),
        ];
        let result = compute_available_slots(
            &provider(),
            &service(30),
            MONDAY,
            &existing,
            &SlotOptions::fine(30),
        )
        .unwrap();
        assert_eq!(result.slots.len(), 15);
        assert_eq!(
            result.warnings,
            vec![DataWarning::MalformedAppointmentEntry {
                appointment_id: "bad".to_string(),
                reason: "invalid start time 'Invalid Date'".to_string(),
            }]
        );

        let mut provider = provider();
        provider.work_schedule = vec![WorkScheduleEntry::working(1, "17:00", "09:00")];
        let result =
            compute_available_slots(&provider, &service(30), MONDAY, &[], &SlotOptions::fine(30))
                .unwrap();
        assert!(result.is_empty());
        assert!(matches!(
            result.warnings.as_slice(),
            [DataWarning::MalformedScheduleEntry { day_of_week: 1, .. }]
        ));
    }

    #[test]
    fn test_duplicate_schedule_day_uses_first() {
        let mut provider = provider();
        provider.work_schedule = vec![
            WorkScheduleEntry::working(1, "09:00", "10:00"),
            WorkScheduleEntry::working(1, "13:00", "17:00"),
        ];
        let result =
            compute_available_slots(&provider, &service(30), MONDAY, &[], &SlotOptions::fine(30))
                .unwrap();
        assert_eq!(result.labels(), vec!["09:00", "09:30"]);
        assert_eq!(
            result.warnings,
            vec![DataWarning::DuplicateScheduleDay { day_of_week: 1 }]
        );
    }

    #[test]
    fn test_idempotent() {
        let existing = vec![
            appointment("a1", "10:00", "10:45", AppointmentStatus::Confirmed),
            appointment("a2", "13:15", "14:00", AppointmentStatus::Pending),
        ];
        let options = SlotOptions::fine(15);
        let (provider, service) = (provider(), service(40));
        let first =
            compute_available_slots(&provider, &service, MONDAY, &existing, &options).unwrap();
        let second =
            compute_available_slots(&provider, &service, MONDAY, &existing, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_verify_slot() {
        let existing = vec![appointment("a1", "10:00", "10:30", AppointmentStatus::Confirmed)];

        let times =
            verify_slot(&provider(), &service(45), MONDAY, "10:30", &existing, None).unwrap();
        assert_eq!(times.start_time, "10:30");
        assert_eq!(times.end_time, "11:15");

        // Not aligned to any step, still allowed
        assert!(verify_slot(&provider(), &service(20), MONDAY, "09:37", &existing, None).is_ok());

        assert!(matches!(
            verify_slot(&provider(), &service(30), MONDAY, "09:45", &existing, None),
            Err(Error::SlotNoLongerAvailable { .. })
        ));
        assert!(
            verify_slot(&provider(), &service(30), MONDAY, "10:00", &existing, Some("a1")).is_ok()
        );

        assert!(matches!(
            verify_slot(&provider(), &service(30), MONDAY, "16:45", &existing, None),
            Err(Error::OutsideWorkingHours { .. })
        ));
        assert!(matches!(
            verify_slot(&provider(), &service(30), SUNDAY, "10:00", &[], None),
            Err(Error::OutsideWorkingHours { .. })
        ));
        assert!(matches!(
            verify_slot(&provider(), &service(30), MONDAY, "25:00", &[], None),
            Err(Error::InvalidInput(_))
        ));

        let mut full = provider();
        full.max_appointments_per_day = 1;
        assert!(matches!(
            verify_slot(&full, &service(30), MONDAY, "14:00", &existing, None),
            Err(Error::CapacityReached { limit: 1, .. })
        ));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(calculate_end_time("09:30", 45), Some("10:15".to_string()));
        assert_eq!(calculate_end_time("23:30", 45), None);
        assert_eq!(calculate_end_time("bad", 45), None);

        assert!(is_within_working_hours(&provider(), MONDAY, "09:00", "17:00").unwrap());
        assert!(!is_within_working_hours(&provider(), MONDAY, "08:30", "09:30").unwrap());
        assert!(!is_within_working_hours(&provider(), SUNDAY, "10:00", "11:00").unwrap());

        let existing = vec![
            appointment("a1", "10:00", "10:30", AppointmentStatus::Confirmed),
            appointment("a2", "11:00", "11:30", AppointmentStatus::Cancelled),
        ];
        assert_eq!(count_active_appointments(&existing, "p1", MONDAY), 1);
        assert_eq!(count_active_appointments(&existing, "p2", MONDAY), 0);

        assert!(has_conflict(&existing, "p1", MONDAY, "10:15", "10:45", None).unwrap());
        assert!(!has_conflict(&existing, "p1", MONDAY, "10:15", "10:45", Some("a1")).unwrap());
        assert!(!has_conflict(&existing, "p1", MONDAY, "11:00", "11:30", None).unwrap());
        assert!(!has_conflict(&existing, "p1", MONDAY, "10:30", "11:00", None).unwrap());

        let mut colorist = provider();
        colorist.id = "p2".to_string();
        colorist.service_ids = ["s2".to_string()].into_iter().collect();
        let providers = vec![provider(), colorist];
        let offering = providers_for_service(&providers, "s2");
        assert_eq!(offering.len(), 1);
        assert_eq!(offering[0].id, "p2");
    }

    #[test]
    fn test_unpadded_dates_match() {
        let mut stored = appointment("a1", "10:00", "10:30", AppointmentStatus::Confirmed);
        stored.date = "2024-1-1".to_string();
        let existing = vec![stored];

        assert_eq!(count_active_appointments(&existing, "p1", MONDAY), 1);
        let result = compute_available_slots(
            &provider(),
            &service(30),
            "2024-1-1",
            &existing,
            &SlotOptions::fine(30),
        )
        .unwrap();
        assert_eq!(result.date, MONDAY);
        assert!(!labels(&result).contains(&"10:00".to_string()));
    }
}
