use crate::cli::commands::{open_service, summary::print_summary};
use crate::cli::parser::{Commands, EventArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::device_type::DeviceType;
use crate::models::event::EventPayload;
use crate::models::event_type::EventType;
use crate::ui::messages::success;

fn payload_from_args(args: &EventArgs) -> AppResult<EventPayload> {
    let device_type = match &args.device {
        Some(code) => Some(DeviceType::from_code(code).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid device type '{}'. Use 'mobile' or 'desktop'",
                code
            ))
        })?),
        None => None,
    };

    Ok(EventPayload {
        latitude: args.latitude,
        longitude: args.longitude,
        accuracy: args.accuracy,
        location_id: args.location.clone(),
        task_id: args.task.clone(),
        device_type,
    })
}

/// Handle `check-in` and `check-out`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let (args, event_type) = match cmd {
        Commands::CheckIn(args) => (args, EventType::CheckIn),
        Commands::CheckOut(args) => (args, EventType::CheckOut),
        _ => return Ok(()),
    };

    let payload = payload_from_args(args)?;
    let (_, service) = open_service(cfg)?;

    let recorded = service.aggregator.record(&args.user, event_type, payload)?;
    success(format!(
        "{} #{} recorded for '{}' at {}",
        event_type.label(),
        recorded.event.id,
        recorded.event.user_id,
        recorded.event.timestamp_str()
    ));

    print_summary(&recorded.event.user_id, &service.format(&recorded.summary));
    Ok(())
}
