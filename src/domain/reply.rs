use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::ticket::TicketPatch;

/// One structured answer from the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TurnReply {
    #[serde(deserialize_with = "null_as_default")]
    pub assistant_reply: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ticket: TicketPatch,
    #[serde(deserialize_with = "null_as_default")]
    pub question_for_user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_ticket_ready: bool,
}

impl TurnReply {
    /// Fails unless `raw` is a JSON object of the expected shape.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("expected a JSON object"));
        }
        let mut reply: TurnReply = serde_json::from_value(value)?;
        reply.assistant_reply = reply.assistant_reply.trim().to_string();
        Ok(reply)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
