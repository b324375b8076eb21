use serde_json::Value;

/// Webhook event kind for newly created issues
pub const ISSUE_CREATED: &str = "jira:issue_created";

/// Issue-tracker webhook payload, extracted leniently.
///
/// Every field is optional: a missing field and a field of the wrong JSON
/// type are both `None`. Defaults are applied by the formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueEvent {
    pub event_kind: Option<String>,
    pub key: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub reporter: Option<String>,
    pub priority: Option<String>,
    pub issue_type: Option<String>,
    pub created: Option<String>,
}

impl IssueEvent {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            event_kind: text_at(payload, "/webhookEvent"),
            key: text_at(payload, "/issue/key"),
            summary: text_at(payload, "/issue/fields/summary"),
            description: text_at(payload, "/issue/fields/description"),
            reporter: text_at(payload, "/issue/fields/reporter/displayName"),
            priority: text_at(payload, "/issue/fields/priority/name"),
            issue_type: text_at(payload, "/issue/fields/issuetype/name"),
            created: text_at(payload, "/issue/fields/created"),
        }
    }

    pub fn is_issue_created(&self) -> bool {
        self.event_kind.as_deref() == Some(ISSUE_CREATED)
    }
}

/// Non-empty string at a JSON pointer
fn text_at(payload: &Value, pointer: &str) -> Option<String> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
