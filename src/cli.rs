use clap::{Args, Parser, Subcommand};
use salon_booking::components::availability::models::{AppointmentStatus, WorkScheduleEntry};
use salon_booking::utils::time::{to_minutes, weekday_from_name};
use std::path::PathBuf;

/// Appointment availability and booking for salon service providers
#[derive(Parser, Debug)]
#[command(name = "salon-booking", version, about)]
pub struct Cli {
    /// Data file to use instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List bookable slots of a provider for a service
    Slots {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        service: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Minutes between candidate start times
        #[arg(long)]
        step: Option<u32>,
        /// Offer morning and afternoon windows instead of start times
        #[arg(long, conflicts_with = "step")]
        half_day: bool,
        /// Ignore this appointment, e.g. when rescheduling it
        #[arg(long, value_name = "APPOINTMENT_ID")]
        exclude: Option<String>,
    },
    /// Book an appointment
    Book {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        date: Option<String>,
        /// Start time, HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an appointment to another time
    Reschedule {
        #[arg(long)]
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: String,
        /// Move to another provider
        #[arg(long)]
        provider: Option<String>,
    },
    /// Change the status of an appointment
    Status {
        #[arg(long)]
        id: String,
        #[arg(long, value_parser = parse_status)]
        status: AppointmentStatus,
    },
    /// List providers offering a service
    Providers {
        #[arg(long)]
        service: String,
    },
    /// List a provider's appointments on a date
    Appointments {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove an appointment and its review
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Manage providers
    Provider {
        #[command(subcommand)]
        action: ProviderCommand,
    },
    /// Manage services
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },
    /// Manage reviews of completed appointments
    Review {
        #[command(subcommand)]
        action: ReviewCommand,
    },
}

#[derive(Args, Debug)]
pub struct ProviderArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub name: String,
    /// Offered service ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub services: Vec<String>,
    /// Working hours as DAY=HH:MM-HH:MM, e.g. mon=09:00-17:00 or 1=09:00-17:00
    #[arg(long = "schedule", value_name = "DAY=HOURS", value_parser = parse_schedule_entry)]
    pub schedule: Vec<WorkScheduleEntry>,
    #[arg(long, default_value_t = 10)]
    pub max_per_day: u32,
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Add or replace a provider
    Add(ProviderArgs),
    /// Remove a provider without open appointments
    Remove {
        #[arg(long)]
        id: String,
    },
    /// List all providers
    List,
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Add or replace a service
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Length in minutes
        #[arg(long)]
        duration: i64,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a service without open appointments
    Remove {
        #[arg(long)]
        id: String,
    },
    /// List all services
    List,
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// Review a completed appointment
    Add {
        #[arg(long)]
        appointment: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Change the rating or comment of a review
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Answer a review as the provider
    Respond {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Remove a review
    Remove {
        #[arg(long)]
        id: String,
    },
    /// List the reviews of a provider
    List {
        #[arg(long)]
        provider: String,
    },
}

/// Accepts pending, confirmed, completed, cancelled (or canceled)
pub fn parse_status(status: &str) -> Result<AppointmentStatus, String> {
    status.parse::<AppointmentStatus>().map_err(|e| e.to_string())
}

/// Parses DAY=HH:MM-HH:MM where DAY is 0-6 (Sunday = 0) or an English day name.
/// DAY=off marks a day off.
pub fn parse_schedule_entry(entry: &str) -> Result<WorkScheduleEntry, String> {
    let (day, hours) = entry
        .split_once('=')
        .ok_or_else(|| format!("Expected DAY=HH:MM-HH:MM, got '{}'", entry))?;

    let day_of_week = match day.trim().parse::<u8>() {
        Ok(index) if index <= 6 => index,
        Ok(index) => return Err(format!("Day of week {} is outside 0-6", index)),
        Err(_) => weekday_from_name(day).ok_or_else(|| format!("Unknown day '{}'", day))?,
    };

    if hours.trim().eq_ignore_ascii_case("off") {
        return Ok(WorkScheduleEntry::day_off(day_of_week));
    }

    let (start, end) = hours
        .split_once('-')
        .ok_or_else(|| format!("Expected HH:MM-HH:MM, got '{}'", hours))?;
    let (start, end) = (start.trim(), end.trim());
    match (to_minutes(start), to_minutes(end)) {
        (Some(s), Some(e)) if s < e => Ok(WorkScheduleEntry::working(day_of_week, start, end)),
        (Some(_), Some(_)) => Err(format!("Start {} must be before end {}", start, end)),
        _ => Err(format!("Invalid hours '{}'", hours)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slots() {
        let cli = Cli::try_parse_from([
            "salon-booking",
            "--data",
            "/tmp/booking.json",
            "slots",
            "--provider",
            "e1",
            "--service",
            "s1",
            "--half-day",
        ])
        .unwrap();

        assert_eq!(cli.data, Some(PathBuf::from("/tmp/booking.json")));
        match cli.command {
            Command::Slots {
                provider,
                half_day,
                date,
                ..
            } => {
                assert_eq!(provider, "e1");
                assert!(half_day);
                assert!(date.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from([
            "salon-booking",
            "status",
            "--id",
            "a1",
            "--status",
            "Canceled",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Status {
                status: AppointmentStatus::Cancelled,
                ..
            }
        ));

        let result = Cli::try_parse_from([
            "salon-booking",
            "status",
            "--id",
            "a1",
            "--status",
            "lost",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_half_day_conflicts_with_step() {
        let result = Cli::try_parse_from([
            "salon-booking",
            "slots",
            "--provider",
            "e1",
            "--service",
            "s1",
            "--step",
            "15",
            "--half-day",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_schedule_entry() {
        assert_eq!(
            parse_schedule_entry("mon=09:00-17:00").unwrap(),
            WorkScheduleEntry::working(1, "09:00", "17:00")
        );
        assert_eq!(
            parse_schedule_entry("0=10:00-14:00").unwrap(),
            WorkScheduleEntry::working(0, "10:00", "14:00")
        );
        assert_eq!(
            parse_schedule_entry("Saturday=off").unwrap(),
            WorkScheduleEntry::day_off(6)
        );

        assert!(parse_schedule_entry("7=09:00-17:00").is_err());
        assert!(parse_schedule_entry("funday=09:00-17:00").is_err());
        assert!(parse_schedule_entry("mon=17:00-09:00").is_err());
        assert!(parse_schedule_entry("mon 09:00-17:00").is_err());
    }

    #[test]
    fn test_parse_provider_add() {
        let cli = Cli::try_parse_from([
            "salon-booking",
            "provider",
            "add",
            "--id",
            "e3",
            "--name",
            "Linh",
            "--services",
            "s1,s2",
            "--schedule",
            "mon=09:00-17:00",
            "--schedule",
            "tue=09:00-12:00",
        ])
        .unwrap();

        match cli.command {
            Command::Provider {
                action: ProviderCommand::Add(args),
            } => {
                assert_eq!(args.services, vec!["s1", "s2"]);
                assert_eq!(args.schedule.len(), 2);
                assert_eq!(args.max_per_day, 10);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_review_rating_range() {
        let parse = |rating: &str| {
            Cli::try_parse_from([
                "salon-booking",
                "review",
                "add",
                "--appointment",
                "a1",
                "--rating",
                rating,
            ])
        };

        assert!(parse("5").is_ok());
        assert!(parse("0").is_err());
        assert!(parse("6").is_err());
    }

    #[test]
    fn test_reschedule_date_is_optional() {
        let cli = Cli::try_parse_from([
            "salon-booking",
            "reschedule",
            "--id",
            "a1",
            "--time",
            "11:00",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Reschedule { date: None, .. }));
    }
}
