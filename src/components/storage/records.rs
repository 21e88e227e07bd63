//! Stored record shapes and their validation into domain types.
//!
//! Stored data is loosely typed: providers may carry numeric `workSchedule`
//! entries or English day-name `workingHours` entries, and may list their
//! services under `services` or `serviceIds`. Everything is normalized here
//! so the rest of the crate only sees domain types.

use crate::components::availability::calculator::parse_hours;
use crate::components::availability::models::{Appointment, Provider, Service, WorkScheduleEntry};
use crate::components::reviews::{validate_rating, Review};
use crate::error::{invalid_input, BookingResult};
use crate::utils::time::{parse_date, to_minutes, weekday_from_name};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Daily cap given to providers whose record does not set one
pub const DEFAULT_MAX_APPOINTMENTS_PER_DAY: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub day_of_week: i64,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_working: Option<bool>,
}

/// Working hours keyed by English day name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHoursRecord {
    pub day: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_working: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "services")]
    pub service_ids: Vec<String>,
    #[serde(default)]
    pub max_appointments_per_day: Option<i64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_schedule: Vec<ScheduleRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub working_hours: Vec<WorkingHoursRecord>,
}

impl ScheduleRecord {
    fn into_entry(self) -> Result<WorkScheduleEntry, String> {
        let day_of_week = u8::try_from(self.day_of_week)
            .ok()
            .filter(|day| *day <= 6)
            .ok_or_else(|| format!("day of week {} is outside 0-6", self.day_of_week))?;
        Ok(WorkScheduleEntry {
            day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            is_working: self.is_working.unwrap_or(true),
        })
    }
}

impl WorkingHoursRecord {
    fn into_entry(self) -> Result<WorkScheduleEntry, String> {
        let day_of_week =
            weekday_from_name(&self.day).ok_or_else(|| format!("unknown day name '{}'", self.day))?;
        if !self.is_working {
            return Ok(WorkScheduleEntry::day_off(day_of_week));
        }
        match (self.start_time, self.end_time) {
            (Some(start_time), Some(end_time)) => Ok(WorkScheduleEntry {
                day_of_week,
                start_time,
                end_time,
                is_working: true,
            }),
            _ => Err(format!("working day '{}' is missing its hours", self.day)),
        }
    }
}

impl ProviderRecord {
    /// Normalize into a provider. Unusable schedule entries are dropped with a
    /// warning; a missing id or a cap below one rejects the whole record.
    pub fn into_provider(self) -> BookingResult<Provider> {
        if self.id.trim().is_empty() {
            return Err(invalid_input("Provider record without an id"));
        }

        let max_appointments_per_day = match self.max_appointments_per_day {
            None => DEFAULT_MAX_APPOINTMENTS_PER_DAY,
            Some(max) => u32::try_from(max).ok().filter(|max| *max >= 1).ok_or_else(|| {
                invalid_input(&format!(
                    "Provider {} has invalid maxAppointmentsPerDay {}",
                    self.id, max
                ))
            })?,
        };

        let average_rating = match self.average_rating {
            Some(rating) if rating.is_finite() && (0.0..=5.0).contains(&rating) => rating,
            Some(rating) => {
                warn!("Resetting invalid averageRating {} of provider {}", rating, self.id);
                0.0
            }
            None => 0.0,
        };

        let entries = self
            .work_schedule
            .into_iter()
            .map(ScheduleRecord::into_entry)
            .chain(self.working_hours.into_iter().map(WorkingHoursRecord::into_entry));

        let mut seen_days = HashSet::new();
        let mut work_schedule = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(reason) => {
                    warn!("Dropping schedule entry of provider {}: {}", self.id, reason);
                    continue;
                }
            };
            if entry.is_working {
                if let Err(reason) = parse_hours(&entry) {
                    warn!("Dropping schedule entry of provider {}: {}", self.id, reason);
                    continue;
                }
            }
            if !seen_days.insert(entry.day_of_week) {
                warn!(
                    "Dropping duplicate schedule entry of provider {} for day {}",
                    self.id, entry.day_of_week
                );
                continue;
            }
            work_schedule.push(entry);
        }

        Ok(Provider {
            id: self.id,
            name: self.name,
            work_schedule,
            max_appointments_per_day,
            service_ids: self.service_ids.into_iter().collect(),
            average_rating,
        })
    }
}

impl From<&Provider> for ProviderRecord {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id.clone(),
            name: provider.name.clone(),
            service_ids: provider.service_ids.iter().cloned().collect(),
            max_appointments_per_day: Some(i64::from(provider.max_appointments_per_day)),
            average_rating: Some(provider.average_rating),
            work_schedule: provider
                .work_schedule
                .iter()
                .map(|entry| ScheduleRecord {
                    day_of_week: i64::from(entry.day_of_week),
                    start_time: entry.start_time.clone(),
                    end_time: entry.end_time.clone(),
                    is_working: Some(entry.is_working),
                })
                .collect(),
            working_hours: Vec::new(),
        }
    }
}

/// Reject providers that would make availability ambiguous
pub fn validate_provider(provider: &Provider) -> BookingResult<()> {
    if provider.id.trim().is_empty() {
        return Err(invalid_input("Provider id must not be empty"));
    }
    if provider.max_appointments_per_day < 1 {
        return Err(invalid_input(&format!(
            "Provider {} must allow at least one appointment per day",
            provider.id
        )));
    }

    let mut seen_days = HashSet::new();
    for entry in &provider.work_schedule {
        if entry.day_of_week > 6 {
            return Err(invalid_input(&format!(
                "Provider {} has a schedule entry for day {}, expected 0-6",
                provider.id, entry.day_of_week
            )));
        }
        if !seen_days.insert(entry.day_of_week) {
            return Err(invalid_input(&format!(
                "Provider {} has more than one schedule entry for day {}",
                provider.id, entry.day_of_week
            )));
        }
        if entry.is_working {
            parse_hours(entry).map_err(|reason| {
                invalid_input(&format!(
                    "Provider {} schedule for day {}: {}",
                    provider.id, entry.day_of_week, reason
                ))
            })?;
        }
    }
    Ok(())
}

pub fn validate_service(service: &Service) -> BookingResult<()> {
    if service.id.trim().is_empty() {
        return Err(invalid_input("Service id must not be empty"));
    }
    if service.duration_minutes <= 0 {
        return Err(invalid_input(&format!(
            "Service {} must have a positive duration",
            service.id
        )));
    }
    Ok(())
}

pub fn validate_appointment(appointment: &Appointment) -> BookingResult<()> {
    if appointment.id.trim().is_empty() {
        return Err(invalid_input("Appointment id must not be empty"));
    }
    parse_date(&appointment.date)?;
    let start = to_minutes(&appointment.start_time);
    let end = to_minutes(&appointment.end_time);
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(()),
        _ => Err(invalid_input(&format!(
            "Appointment {} has invalid times {}-{}",
            appointment.id, appointment.start_time, appointment.end_time
        ))),
    }
}

pub fn validate_review(review: &Review) -> BookingResult<()> {
    if review.id.trim().is_empty() || review.appointment_id.trim().is_empty() {
        return Err(invalid_input("Review id and appointment id must not be empty"));
    }
    validate_rating(review.rating)
}

/// Validated contents of a store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub providers: Vec<Provider>,
    pub services: Vec<Service>,
    pub appointments: Vec<Appointment>,
    pub reviews: Vec<Review>,
}

/// Replace the item with the same id or append it
fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

/// Remove the item with this id, returning whether it was present
fn remove<T>(items: &mut Vec<T>, target: &str, id: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| id(item) != target);
    items.len() != before
}

impl Dataset {
    pub fn upsert_provider(&mut self, provider: Provider) {
        upsert(&mut self.providers, provider, |p| p.id.as_str());
    }

    pub fn upsert_service(&mut self, service: Service) {
        upsert(&mut self.services, service, |s| s.id.as_str());
    }

    pub fn upsert_appointment(&mut self, appointment: Appointment) {
        upsert(&mut self.appointments, appointment, |a| a.id.as_str());
    }

    pub fn upsert_review(&mut self, review: Review) {
        upsert(&mut self.reviews, review, |r| r.id.as_str());
    }

    pub fn remove_provider(&mut self, id: &str) -> bool {
        remove(&mut self.providers, id, |p| p.id.as_str())
    }

    pub fn remove_service(&mut self, id: &str) -> bool {
        remove(&mut self.services, id, |s| s.id.as_str())
    }

    pub fn remove_appointment(&mut self, id: &str) -> bool {
        remove(&mut self.appointments, id, |a| a.id.as_str())
    }

    pub fn remove_review(&mut self, id: &str) -> bool {
        remove(&mut self.reviews, id, |r| r.id.as_str())
    }
}

/// On-disk document as read. Records stay untyped until each one is
/// converted, so a single bad record is skipped instead of failing the load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetRecord {
    #[serde(default, alias = "providers")]
    pub employees: Vec<Value>,
    #[serde(default)]
    pub services: Vec<Value>,
    #[serde(default)]
    pub appointments: Vec<Value>,
    #[serde(default)]
    pub reviews: Vec<Value>,
}

/// Deserialize every value, skipping and logging the ones that do not parse
/// or validate, and the ones whose id was already seen
fn convert_all<T, R>(
    kind: &str,
    values: Vec<Value>,
    convert: impl Fn(R) -> BookingResult<T>,
    id: impl Fn(&T) -> &str,
) -> Vec<T>
where
    R: DeserializeOwned,
{
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let item = match serde_json::from_value::<R>(value) {
            Ok(record) => convert(record),
            Err(e) => Err(e.into()),
        };
        match item {
            Ok(item) if seen.insert(id(&item).to_string()) => items.push(item),
            Ok(item) => warn!("Skipping duplicate {} {}", kind, id(&item)),
            Err(e) => warn!("Skipping {} record #{}: {}", kind, index, e),
        }
    }

    items
}

impl DatasetRecord {
    /// Normalize every record, skipping the ones that cannot be used
    pub fn into_dataset(self) -> Dataset {
        let providers = convert_all(
            "provider",
            self.employees,
            ProviderRecord::into_provider,
            |p: &Provider| p.id.as_str(),
        );

        let services = convert_all(
            "service",
            self.services,
            |service: Service| validate_service(&service).map(|_| service),
            |s: &Service| s.id.as_str(),
        );

        // Times are not checked here; the calculator reports unusable ones
        let appointments = convert_all(
            "appointment",
            self.appointments,
            |appointment: Appointment| Ok(appointment),
            |a: &Appointment| a.id.as_str(),
        );

        let reviews = convert_all(
            "review",
            self.reviews,
            |review: Review| validate_review(&review).map(|_| review),
            |r: &Review| r.id.as_str(),
        );

        Dataset {
            providers,
            services,
            appointments,
            reviews,
        }
    }
}

/// On-disk document as written
#[derive(Debug, Serialize)]
pub struct DatasetDocument<'a> {
    pub employees: Vec<ProviderRecord>,
    pub services: &'a [Service],
    pub appointments: &'a [Appointment],
    pub reviews: &'a [Review],
}

impl<'a> From<&'a Dataset> for DatasetDocument<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        Self {
            employees: dataset.providers.iter().map(ProviderRecord::from).collect(),
            services: &dataset.services,
            appointments: &dataset.appointments,
            reviews: &dataset.reviews,
        }
    }
}
