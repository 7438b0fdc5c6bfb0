use crate::cli::commands::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::calculator::timeline::Timeline;
use crate::core::live::FormattedSummary;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::{CYAN, GREY, RESET, colorize_optional, colorize_status};
use crate::utils::date::parse_date_or;
use crate::utils::table::Table;
use crate::utils::time::iso_millis;

/// Print a formatted summary as a short key/value block.
pub fn print_summary(user_id: &str, s: &FormattedSummary) {
    header(format!("{} · {}", user_id, s.date));
    let row = |k: &str, v: String| println!("{CYAN}{:<16}{RESET} {}", k, v);

    row("Status", colorize_status(s.status));
    row("First check-in", colorize_optional(s.first_check_in.as_deref()));
    row("Last check-out", colorize_optional(s.last_check_out.as_deref()));
    row("Worked", format!("{} ({} min)", s.hours_worked, s.total_work_minutes));
    row("Breaks", format!("{} min", s.total_break_minutes));
    row("Sessions", s.sessions_count.to_string());
    if let Some(open) = &s.current_session_started_at {
        row("Open since", open.clone());
    }
}

fn print_timeline(t: &Timeline) {
    if t.sessions.is_empty() {
        println!("\n{GREY}No closed sessions.{RESET}");
    } else {
        let mut table = Table::new(["#", "Check-in", "Check-out", "Minutes", "Break-bounding"]);
        for (i, s) in t.sessions.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                iso_millis(s.check_in),
                iso_millis(s.check_out),
                s.duration_minutes.to_string(),
                if s.qualifying { "yes" } else { "no" }.to_string(),
            ]);
        }
        println!("\nSessions:\n{}", table.render());
    }

    if !t.breaks.is_empty() {
        let mut table = Table::new(["From", "To", "Minutes"]);
        for g in &t.breaks {
            table.add_row(vec![
                iso_millis(g.start),
                iso_millis(g.end),
                g.duration_minutes.to_string(),
            ]);
        }
        println!("Breaks:\n{}", table.render());
    }

    for ts in &t.superseded_check_ins {
        println!("{GREY}superseded check-in at {}{RESET}", iso_millis(*ts));
    }
    for ts in &t.orphan_check_outs {
        println!("{GREY}ignored check-out at {}{RESET}", iso_millis(*ts));
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Summary {
        user,
        date,
        sessions,
        json,
    } = cmd
    {
        let (_, service) = open_service(cfg)?;
        let day = parse_date_or(date.as_deref(), service.aggregator.today())?;
        let recomputed = service.aggregator.recompute(user, day)?;
        let formatted = service.format(&recomputed);

        if *json {
            println!("{}", serde_json::to_string_pretty(&formatted)?);
        } else {
            print_summary(user, &formatted);
        }

        if *sessions {
            let computed = service.aggregator.compute(user, day)?;
            print_timeline(&computed.timeline);
        }
    }
    Ok(())
}
