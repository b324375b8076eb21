//! Notification formatter - issue event to chat message

use chrono::{Local, NaiveDateTime};

use crate::domain::entities::IssueEvent;

pub const DEFAULT_TITLE: &str = "Sin título";
pub const DEFAULT_DESCRIPTION: &str = "Sin descripción";
pub const DEFAULT_REPORTER: &str = "Desconocido";
pub const DEFAULT_PRIORITY: &str = "Sin prioridad";
pub const DEFAULT_ISSUE_TYPE: &str = "Ticket";
pub const DEFAULT_KEY: &str = "N/A";

/// Longest description shown, in characters
pub const DESCRIPTION_LIMIT: usize = 200;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct NotificationFormatter {
    browse_base: String,
}

impl NotificationFormatter {
    pub fn new(issue_base_url: impl Into<String>) -> Self {
        Self {
            browse_base: issue_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Format with the current local time as the timestamp fallback
    pub fn format(&self, event: &IssueEvent) -> String {
        self.format_at(event, Local::now().naive_local())
    }

    /// Total: missing fields fall back to their defaults
    pub fn format_at(&self, event: &IssueEvent, now: NaiveDateTime) -> String {
        let key = event.key.as_deref().unwrap_or(DEFAULT_KEY);
        let summary = event.summary.as_deref().unwrap_or(DEFAULT_TITLE);
        let description = truncate(event.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION), DESCRIPTION_LIMIT);
        let reporter = event.reporter.as_deref().unwrap_or(DEFAULT_REPORTER);
        let priority = event.priority.as_deref().unwrap_or(DEFAULT_PRIORITY);
        let issue_type = event.issue_type.as_deref().unwrap_or(DEFAULT_ISSUE_TYPE);
        let created = created_timestamp(event.created.as_deref(), now);

        format!(
            "🎫 *Nuevo Ticket en Jira*\n\n\
📋 *{issue_type}:* {key}\n\
📝 *Título:* {summary}\n\
👤 *Reportado por:* {reporter}\n\
⚡ *Prioridad:* {priority}\n\n\
📄 *Descripción:*\n\
{description}\n\n\
🔗 *Ver ticket:* {url}\n\n\
⏰ *Creado:* {created}\n",
            url = self.browse_url(key),
        )
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.browse_base, key)
    }
}

/// Cut to `limit` characters, appending `...` when something was cut
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// `2026-01-05T07:26:06.000+0000` -> `2026-01-05 07:26:06`
///
/// Fractional seconds and a trailing `Z`, `±hhmm` or `±hh:mm` offset are
/// dropped. Anything else that does not reduce to `YYYY-MM-DD HH:MM:SS` is
/// replaced by `now`.
pub fn created_timestamp(raw: Option<&str>, now: NaiveDateTime) -> String {
    raw.and_then(wall_clock)
        .unwrap_or_else(|| now.format(TIMESTAMP_FORMAT).to_string())
}

fn wall_clock(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (stamp, rest) = (raw.get(..19)?, raw.get(19..)?);
    let candidate = stamp.replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&candidate, TIMESTAMP_FORMAT).ok()?;

    let offset = match rest.strip_prefix('.') {
        Some(fraction) => fraction.trim_start_matches(|c: char| c.is_ascii_digit()),
        None => rest,
    };
    is_utc_offset(offset).then_some(candidate)
}

fn is_utc_offset(offset: &str) -> bool {
    if offset.is_empty() || offset == "Z" {
        return true;
    }
    let Some(digits) = offset.strip_prefix(['+', '-']) else {
        return false;
    };
    let digits = match digits.split_once(':') {
        Some((hours, minutes)) if hours.len() == 2 => format!("{}{}", hours, minutes),
        Some(_) => return false,
        None => digits.to_string(),
    };
    digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn formatter() -> NotificationFormatter {
        NotificationFormatter::new("https://example.atlassian.net/")
    }

    #[test]
    fn test_format_full_event() {
        let event = IssueEvent {
            event_kind: Some("jira:issue_created".into()),
            key: Some("SUP-42".into()),
            summary: Some("Printer on fire".into()),
            description: Some("Smoke everywhere".into()),
            reporter: Some("Ana Torres".into()),
            priority: Some("High".into()),
            issue_type: Some("Bug".into()),
            created: Some("2026-01-05T07:26:06.000+0000".into()),
        };

        let text = formatter().format_at(&event, now());
        assert!(text.starts_with("🎫 *Nuevo Ticket en Jira*"));
        assert!(text.contains("📋 *Bug:* SUP-42"));
        assert!(text.contains("📝 *Título:* Printer on fire"));
        assert!(text.contains("👤 *Reportado por:* Ana Torres"));
        assert!(text.contains("⚡ *Prioridad:* High"));
        assert!(text.contains("Smoke everywhere\n"));
        assert!(text.contains("🔗 *Ver ticket:* https://example.atlassian.net/browse/SUP-42"));
        assert!(text.contains("⏰ *Creado:* 2026-01-05 07:26:06"));
    }

    #[test]
    fn test_format_empty_event_uses_defaults() {
        let text = formatter().format_at(&IssueEvent::default(), now());
        assert!(text.contains(DEFAULT_TITLE));
        assert!(text.contains(DEFAULT_DESCRIPTION));
        assert!(text.contains(DEFAULT_REPORTER));
        assert!(text.contains(DEFAULT_PRIORITY));
        assert!(text.contains("📋 *Ticket:* N/A"));
        assert!(text.contains("/browse/N/A"));
        assert!(text.contains("⏰ *Creado:* 2026-03-01 09:30:00"));
    }

    #[test]
    fn test_missing_summary_from_payload() {
        let payload = serde_json::json!({
            "webhookEvent": "jira:issue_created",
            "issue": { "key": "OPS-1", "fields": { "description": "x" } }
        });
        let text = formatter().format(&IssueEvent::from_payload(&payload));
        assert!(text.contains("📝 *Título:* Sin título"));
    }

    #[test]
    fn test_description_truncated_at_200_chars() {
        let long = "ñ".repeat(250);
        let event = IssueEvent {
            description: Some(long),
            ..IssueEvent::default()
        };
        let text = formatter().format_at(&event, now());
        let expected = format!("{}...", "ñ".repeat(200));
        assert!(text.contains(&expected));
        assert!(!text.contains(&"ñ".repeat(201)));
    }

    #[test]
    fn test_truncate_boundaries() {
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcd", 3), "abc...");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn test_created_timestamp() {
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06.000+0000"), now()), "2026-01-05 07:26:06");
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06"), now()), "2026-01-05 07:26:06");
        assert_eq!(created_timestamp(Some("yesterday"), now()), "2026-03-01 09:30:00");
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06+0000"), now()), "2026-01-05 07:26:06");
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06Z"), now()), "2026-01-05 07:26:06");
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06-05:00"), now()), "2026-01-05 07:26:06");
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06.123Z"), now()), "2026-01-05 07:26:06");
        assert_eq!(created_timestamp(Some("2026-01-05T07:26:06 garbage"), now()), "2026-03-01 09:30:00");
        assert_eq!(created_timestamp(Some("2026-13-05T07:26:06"), now()), "2026-03-01 09:30:00");
        assert_eq!(created_timestamp(None, now()), "2026-03-01 09:30:00");
    }
}
