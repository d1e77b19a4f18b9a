use serde::{Deserialize, Serialize};

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Feature,
    Bug,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Feature => "feature",
            TicketType::Bug => "bug",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "feature" => Some(TicketType::Feature),
            "bug" => Some(TicketType::Bug),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// The record accumulated over one intake session.
///
/// Field order matters: it is the order of the JSON snapshot sent to the
/// model and of the payload shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    #[serde(rename = "type")]
    pub ticket_type: Option<TicketType>,
    pub title: Option<String>,
    pub problem_context: Option<String>,
    pub expected_outcome: Option<String>,
    pub proposed_solution: Option<String>,
    pub affected_users: Option<String>,
    pub priority: Option<Priority>,
    pub urgency_stars: Option<u8>,
    pub source: String,
    pub requested_by: Option<String>,
}

impl Ticket {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            ticket_type: None,
            title: None,
            problem_context: None,
            expected_outcome: None,
            proposed_solution: None,
            affected_users: None,
            priority: None,
            urgency_stars: None,
            source: source.into(),
            requested_by: None,
        }
    }

    /// Applies a patch without ever replacing a known value with an unset one.
    pub fn merge(mut self, patch: TicketPatch) -> Self {
        keep_or_replace(&mut self.ticket_type, patch.ticket_type);
        merge_text(&mut self.title, patch.title);
        merge_text(&mut self.problem_context, patch.problem_context);
        merge_text(&mut self.expected_outcome, patch.expected_outcome);
        merge_text(&mut self.proposed_solution, patch.proposed_solution);
        merge_text(&mut self.affected_users, patch.affected_users);
        keep_or_replace(&mut self.priority, patch.priority);
        keep_or_replace(&mut self.urgency_stars, patch.urgency_stars);
        if let Some(source) = patch.source.filter(|s| !s.trim().is_empty()) {
            self.source = source;
        }
        merge_text(&mut self.requested_by, patch.requested_by);
        self
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn keep_or_replace<T>(slot: &mut Option<T>, value: Option<T>) {
    if let Some(value) = value {
        *slot = Some(value);
    }
}

fn merge_text(slot: &mut Option<String>, value: Option<String>) {
    keep_or_replace(slot, value.filter(|v| !v.trim().is_empty()));
}

/// Partial ticket as returned by the model. Missing keys, `null`, blank
/// strings and unparseable enum values all come through as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TicketPatch {
    #[serde(rename = "type", deserialize_with = "lenient::ticket_type")]
    pub ticket_type: Option<TicketType>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub problem_context: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub expected_outcome: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub proposed_solution: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub affected_users: Option<String>,
    #[serde(deserialize_with = "lenient::priority")]
    pub priority: Option<Priority>,
    #[serde(deserialize_with = "lenient::urgency_stars")]
    pub urgency_stars: Option<u8>,
    #[serde(deserialize_with = "lenient::text")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub requested_by: Option<String>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    use super::{Priority, TicketType};

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return Ok(None),
        };
        Ok(Some(text).filter(|t| !t.is_empty()))
    }

    pub fn ticket_type<'de, D>(deserializer: D) -> Result<Option<TicketType>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.and_then(|raw| {
            let parsed = TicketType::from_str(&raw);
            if parsed.is_none() {
                warn!(value = %raw, "ignoring unrecognized ticket type");
            }
            parsed
        }))
    }

    pub fn priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.and_then(|raw| {
            let parsed = Priority::from_str(&raw);
            if parsed.is_none() {
                warn!(value = %raw, "ignoring unrecognized priority");
            }
            parsed
        }))
    }

    pub fn urgency_stars<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.and_then(|raw| {
            let parsed = raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.fract() == 0.0 && (1.0..=5.0).contains(n))
                .map(|n| n as u8);
            if parsed.is_none() {
                warn!(value = %raw, "ignoring urgency_stars outside 1..=5");
            }
            parsed
        }))
    }
}
