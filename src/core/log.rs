use crate::errors::AppResult;
use crate::models::override_record::AuditEntry;
use crate::store::AuditSink;
use crate::utils::table::{strip_ansi, visible_width};
use ansi_term::Colour;

const MAX_PAYLOAD_WIDTH: usize = 60;

/// Colour of an audit action.
fn color_for_action(action: &str) -> Colour {
    match action {
        "ATTENDANCE_OVERRIDE" => Colour::Yellow,
        "SUMMARY_REBUILD" => Colour::Purple,
        other if other.starts_with("MIGRATION") => Colour::Purple,
        _ => Colour::White,
    }
}

/// Cut `s` to `max` visible characters, ending with `...` when shortened.
fn truncate_visible(s: &str, max: usize) -> String {
    let visible = strip_ansi(s);
    if visible.chars().count() <= max {
        return visible;
    }
    let mut out: String = visible.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn render_audit(entries: &[AuditEntry]) -> Vec<String> {
    let id_w = entries
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1);
    let action_w = entries
        .iter()
        .map(|e| visible_width(&format!("{} ({}/{})", e.action, e.entity_type, e.entity_id)))
        .max()
        .unwrap_or(10);

    entries
        .iter()
        .map(|e| {
            let date = e.created_at.format("%FT%T%:z").to_string();
            let target = format!("({}/{})", e.entity_type, e.entity_id);
            let plain_len = visible_width(&format!("{} {}", e.action, target));
            let colored = format!("{} {}", color_for_action(&e.action).paint(&e.action), target);
            let padding = " ".repeat(action_w.saturating_sub(plain_len));

            format!(
                "{:>id_w$}: {} | {}{} | {} => {}",
                e.id,
                date,
                colored,
                padding,
                e.actor_id,
                truncate_visible(&e.payload, MAX_PAYLOAD_WIDTH),
                id_w = id_w,
            )
        })
        .collect()
}

pub struct LogLogic;

impl LogLogic {
    /// Print every entry, or only those whose action matches `action`
    /// (case-insensitive).
    pub fn print_log(audit: &dyn AuditSink, action: Option<&str>) -> AppResult<()> {
        let mut entries = audit.entries()?;
        if let Some(action) = action {
            entries.retain(|e| e.action.eq_ignore_ascii_case(action));
        }

        println!("📜 Audit log:\n");
        if entries.is_empty() {
            println!("   (empty)");
            return Ok(());
        }

        for line in render_audit(&entries) {
            println!("{line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: i64, payload: &str) -> AuditEntry {
        AuditEntry {
            id,
            actor_id: "adm".into(),
            action: "ATTENDANCE_OVERRIDE".into(),
            entity_type: "attendance".into(),
            entity_id: format!("rec-{id}"),
            payload: payload.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn long_payloads_are_truncated() {
        let long = "x".repeat(100);
        let lines = render_audit(&[entry(1, &long)]);
        let plain = strip_ansi(&lines[0]);
        assert!(plain.ends_with("..."));
        assert!(plain.contains("ATTENDANCE_OVERRIDE (attendance/rec-1)"));
    }

    #[test]
    fn ids_are_right_aligned() {
        let lines = render_audit(&[entry(1, "{}"), entry(10, "{}")]);
        assert!(strip_ansi(&lines[0]).starts_with(" 1: "));
        assert!(strip_ansi(&lines[1]).starts_with("10: "));
    }
}
