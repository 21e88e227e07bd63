use crate::cli::{Cli, Command, ProviderCommand, ReviewCommand, ServiceCommand};
use salon_booking::components::availability::models::{
    Appointment, Availability, Provider, Service, SlotOptions,
};
use salon_booking::components::booking::{BookingRequest, RescheduleRequest};
use salon_booking::components::reviews::{Review, ReviewRequest, ReviewUpdate};
use salon_booking::components::{BookingHandle, JsonFileStore};
use salon_booking::config::Config;
use salon_booking::error::{BookingResult, Error};
use salon_booking::utils::time::weekday_name;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize the logging system
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Open the store, run one command and stop the booking actor
pub async fn run(cli: Cli, mut config: Config) -> miette::Result<()> {
    if let Some(data) = cli.data {
        config.data_file = data;
    }

    let store = JsonFileStore::open(&config.data_file).await?;
    info!("Using data file {}", store.path().display());
    let handle = BookingHandle::new(Arc::new(store));

    let result = dispatch(&handle, &config, cli.command).await;

    if let Err(e) = handle.shutdown().await {
        warn!("Failed to stop booking actor: {}", e);
    }

    result.map_err(Into::into)
}

async fn dispatch(handle: &BookingHandle, config: &Config, command: Command) -> BookingResult<()> {
    match command {
        Command::Slots {
            provider,
            service,
            date,
            step,
            half_day,
            exclude,
        } => {
            let date = resolve_date(config, date)?;
            let mut options = if half_day {
                SlotOptions::half_day()
            } else if let Some(step) = step {
                SlotOptions::fine(step)
            } else {
                config.slot_options()?
            };
            options.exclude_appointment_id = exclude;

            let availability = handle
                .available_slots(provider, service, date, options)
                .await?;
            print_availability(&availability);
        }
        Command::Book {
            provider,
            service,
            date,
            time,
            name,
            phone,
            notes,
        } => {
            let request = BookingRequest {
                provider_id: provider,
                service_id: service,
                date: resolve_date(config, date)?,
                start_time: time,
                customer_name: name,
                customer_phone: phone,
                notes,
            };
            let appointment = handle.book(request).await?;
            info!("Created appointment {}", appointment.id);
            print_appointment(&appointment);
        }
        Command::Reschedule {
            id,
            date,
            time,
            provider,
        } => {
            let request = RescheduleRequest {
                appointment_id: id,
                provider_id: provider,
                date,
                start_time: time,
            };
            let appointment = handle.reschedule(request).await?;
            print_appointment(&appointment);
        }
        Command::Status { id, status } => {
            let appointment = handle.set_status(id, status).await?;
            print_appointment(&appointment);
        }
        Command::Providers { service } => {
            let providers = handle.providers_for_service(service.as_str()).await?;
            if providers.is_empty() {
                println!("No providers offer service {}", service);
            }
            for provider in &providers {
                print_provider(provider);
            }
        }
        Command::Appointments { provider, date } => {
            let date = resolve_date(config, date)?;
            let appointments = handle.appointments_for(provider.as_str(), date.as_str()).await?;
            if appointments.is_empty() {
                println!("No appointments for {} on {}", provider, date);
            }
            for appointment in &appointments {
                print_appointment(appointment);
            }
        }
        Command::Delete { id } => {
            handle.delete_appointment(id.as_str()).await?;
            println!("Deleted appointment {}", id);
        }
        Command::Provider { action } => manage_providers(handle, action).await?,
        Command::Service { action } => manage_services(handle, action).await?,
        Command::Review { action } => manage_reviews(handle, action).await?,
    }

    Ok(())
}

async fn manage_providers(handle: &BookingHandle, action: ProviderCommand) -> BookingResult<()> {
    match action {
        ProviderCommand::Add(args) => {
            let provider = Provider {
                id: args.id,
                name: args.name,
                work_schedule: args.schedule,
                max_appointments_per_day: args.max_per_day,
                service_ids: args.services.into_iter().collect(),
                average_rating: 0.0,
            };
            let provider = handle.save_provider(provider).await?;
            print_provider(&provider);
        }
        ProviderCommand::Remove { id } => {
            handle.delete_provider(id.as_str()).await?;
            println!("Deleted provider {}", id);
        }
        ProviderCommand::List => {
            for provider in &handle.providers().await? {
                print_provider(provider);
            }
        }
    }
    Ok(())
}

async fn manage_services(handle: &BookingHandle, action: ServiceCommand) -> BookingResult<()> {
    match action {
        ServiceCommand::Add {
            id,
            name,
            duration,
            price,
            description,
        } => {
            let service = Service {
                id,
                name,
                duration_minutes: duration,
                price,
                description,
            };
            let service = handle.save_service(service).await?;
            print_service(&service);
        }
        ServiceCommand::Remove { id } => {
            handle.delete_service(id.as_str()).await?;
            println!("Deleted service {}", id);
        }
        ServiceCommand::List => {
            for service in &handle.services().await? {
                print_service(service);
            }
        }
    }
    Ok(())
}

async fn manage_reviews(handle: &BookingHandle, action: ReviewCommand) -> BookingResult<()> {
    match action {
        ReviewCommand::Add {
            appointment,
            rating,
            comment,
        } => {
            let request = ReviewRequest {
                appointment_id: appointment,
                rating,
                comment,
            };
            let review = handle.add_review(request).await?;
            print_review(&review);
        }
        ReviewCommand::Edit {
            id,
            rating,
            comment,
        } => {
            let review = handle
                .update_review(id, ReviewUpdate { rating, comment })
                .await?;
            print_review(&review);
        }
        ReviewCommand::Respond { id, text } => {
            let review = handle.respond_to_review(id, text).await?;
            print_review(&review);
        }
        ReviewCommand::Remove { id } => {
            handle.delete_review(id.as_str()).await?;
            println!("Deleted review {}", id);
        }
        ReviewCommand::List { provider } => {
            let reviews = handle.reviews_for(provider.as_str()).await?;
            if reviews.is_empty() {
                println!("No reviews for {}", provider);
            }
            for review in &reviews {
                print_review(review);
            }
        }
    }
    Ok(())
}

fn resolve_date(config: &Config, date: Option<String>) -> BookingResult<String> {
    match date {
        Some(date) => Ok(date),
        None => config.today(),
    }
}

fn print_availability(availability: &Availability) {
    for warning in &availability.warnings {
        warn!("{}", warning);
    }

    if availability.is_empty() {
        println!("No availability on {}", availability.date);
        return;
    }

    println!("Available on {}:", availability.date);
    for label in availability.labels() {
        println!("  {}", label);
    }
}

fn print_provider(provider: &Provider) {
    let services: Vec<&str> = provider.service_ids.iter().map(String::as_str).collect();
    println!(
        "{}\t{}\t(max {} per day, rated {:.1})\t{}",
        provider.id,
        provider.name,
        provider.max_appointments_per_day,
        provider.average_rating,
        services.join(",")
    );
    for entry in provider.work_schedule.iter().filter(|e| e.is_working) {
        println!(
            "  {:<10} {}-{}",
            weekday_name(entry.day_of_week).unwrap_or("?"),
            entry.start_time,
            entry.end_time
        );
    }
}

fn print_service(service: &Service) {
    println!(
        "{}\t{}\t{} min\t{:.2}",
        service.id, service.name, service.duration_minutes, service.price
    );
}

fn print_review(review: &Review) {
    println!(
        "{}\t{}/5\t{}\t{}\t{}",
        review.id, review.rating, review.appointment_id, review.customer_name, review.comment
    );
    if let Some(response) = &review.response {
        println!("  response: {}", response);
    }
}

fn print_appointment(appointment: &Appointment) {
    println!(
        "{}\t{} {}-{}\t{}\t{}\t{} ({})",
        appointment.id,
        appointment.date,
        appointment.start_time,
        appointment.end_time,
        appointment.provider_id,
        appointment.status,
        appointment.customer_name,
        appointment.customer_phone
    );
}
