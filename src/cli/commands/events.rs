use crate::cli::commands::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::colors::{colorize_in_out, colorize_optional};
use crate::utils::date::parse_date_or;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Events { user, date } = cmd {
        let (_, service) = open_service(cfg)?;
        let day = parse_date_or(date.as_deref(), service.aggregator.today())?;
        let events = service.aggregator.day_events(user, day)?;

        if events.is_empty() {
            info(format!("No events for '{}' on {}.", user, day));
            return Ok(());
        }

        let mut table = Table::new(["Id", "Type", "Timestamp", "Device", "Location", "Task", "Position"]);
        for e in &events {
            let position = match (e.latitude, e.longitude) {
                (Some(lat), Some(lon)) => Some(match e.accuracy {
                    Some(acc) => format!("{lat:.5},{lon:.5} ±{acc}m"),
                    None => format!("{lat:.5},{lon:.5}"),
                }),
                _ => None,
            };
            table.add_row(vec![
                e.id.to_string(),
                colorize_in_out(e.event_type.to_db_str(), e.is_check_in()),
                e.timestamp_str(),
                e.device_type.to_db_str().to_string(),
                colorize_optional(e.location_id.as_deref()),
                colorize_optional(e.task_id.as_deref()),
                colorize_optional(position.as_deref()),
            ]);
        }
        print!("{}", table.render());
    }
    Ok(())
}
