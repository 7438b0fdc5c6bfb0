use crate::cli::commands::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::service::{ListParams, Page};
use crate::errors::AppResult;
use crate::models::day_summary::DailySummary;
use crate::ui::messages::info;
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::formatting::hhmm;
use crate::utils::table::Table;
use crate::utils::time::iso_millis;
use std::io;

fn print_table(page: &Page<DailySummary>) {
    let mut table = Table::new(["Date", "Status", "First in", "Last out", "Worked", "Breaks", "Sessions"]);
    for s in &page.data {
        table.add_row(vec![
            s.date.to_string(),
            colorize_status(s.status),
            colorize_optional(s.first_check_in.map(iso_millis).as_deref()),
            colorize_optional(s.last_check_out.map(iso_millis).as_deref()),
            hhmm(s.total_work_minutes),
            hhmm(s.total_break_minutes),
            s.sessions_count.to_string(),
        ]);
    }
    print!("{}", table.render());
    println!(
        "\nPage {}/{} · {} day(s)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
}

fn write_csv<W: io::Write>(page: &Page<DailySummary>, out: W) -> AppResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "date",
        "status",
        "first_check_in",
        "last_check_out",
        "total_work_minutes",
        "total_break_minutes",
        "sessions_count",
    ])?;
    for s in &page.data {
        wtr.write_record([
            s.date.to_string(),
            s.status.to_db_str().to_string(),
            s.first_check_in.map(iso_millis).unwrap_or_default(),
            s.last_check_out.map(iso_millis).unwrap_or_default(),
            s.total_work_minutes.to_string(),
            s.total_break_minutes.to_string(),
            s.sessions_count.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        user,
        from,
        to,
        page,
        limit,
        csv,
        json,
    } = cmd
    {
        let (_, service) = open_service(cfg)?;
        let params = ListParams {
            user_id: Some(user.clone()),
            from: from.clone(),
            to: to.clone(),
            page: page.clone(),
            limit: limit.clone(),
        };
        let page = service.list_user(user, &params)?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&page)?);
        } else if *csv {
            write_csv(&page, io::stdout().lock())?;
        } else if page.data.is_empty() {
            info(format!("No stored summaries for '{}' in the selected range.", user));
        } else {
            print_table(&page);
        }
    }
    Ok(())
}
