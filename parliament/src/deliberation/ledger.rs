//! Append-only message ledger.
//!
//! Message ids are `msg-NNN` (zero-padded to three digits, wider once the
//! counter passes 999) and are drawn from the session's `next_message_id`,
//! so ids are dense and never reused within a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::state::Session;
use crate::error::{ParliamentError, ParliamentResult};

/// Keys the ledger assigns; caller-supplied values for them are replaced.
const RESERVED_KEYS: [&str; 3] = ["id", "round", "timestamp"];

/// Message id helpers.
pub struct MessageId;

impl MessageId {
    pub const PREFIX: &'static str = "msg-";

    /// Format a counter value as a message id.
    pub fn format(number: u32) -> String {
        format!("{}{:03}", Self::PREFIX, number)
    }

    /// Parse the counter value back out of a message id.
    pub fn parse(id: &str) -> Option<u32> {
        let digits = id.strip_prefix(Self::PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// A ledger entry. Everything except the three assigned fields is the
/// caller's opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub round: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Message {
    /// The payload's `type`, or `"unknown"`.
    pub fn kind(&self) -> &str {
        self.payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    /// Counter value encoded in the id, if well formed.
    pub fn number(&self) -> Option<u32> {
        MessageId::parse(&self.id)
    }
}

/// Id and type of a freshly appended message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendedMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One or more caller payloads, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessagePayloads(Vec<Map<String, Value>>);

impl MessagePayloads {
    /// Parse a JSON object or array of objects.
    pub fn parse(json: &str) -> ParliamentResult<Self> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| ParliamentError::malformed("message JSON", e.to_string()))?;
        Self::from_value(raw)
    }

    /// Normalize a JSON value into a payload list.
    pub fn from_value(raw: Value) -> ParliamentResult<Self> {
        let items = match raw {
            Value::Array(items) => items,
            other => vec![other],
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(ParliamentError::InvalidPayload {
                    index,
                    found: json_type_name(&other).to_string(),
                }),
            })
            .collect::<ParliamentResult<Vec<_>>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Map<String, Value>>> for MessagePayloads {
    fn from(payloads: Vec<Map<String, Value>>) -> Self {
        Self(payloads)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Singleton message ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(alias = "parliament_id")]
    pub id: String,
    #[serde(default)]
    pub problem_statement: Value,
    pub messages: Vec<Message>,
    /// Fields owned by other tooling, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ledger {
    /// Empty ledger tied to a session.
    pub fn for_session(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            problem_statement: session.problem_statement.clone(),
            messages: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Append payloads in order.
    ///
    /// Each message takes the next counter value as its id and the session's
    /// current round; all messages in one call share `now` as timestamp. The
    /// session counter ends one past the last assigned id.
    pub fn append(
        &mut self,
        session: &mut Session,
        payloads: MessagePayloads,
        now: DateTime<Utc>,
    ) -> Vec<AppendedMessage> {
        let round = session.current_round;
        let mut appended = Vec::with_capacity(payloads.len());

        for mut payload in payloads.0 {
            for key in RESERVED_KEYS {
                payload.shift_remove(key);
            }

            let message = Message {
                id: MessageId::format(session.next_message_id),
                round,
                timestamp: now,
                payload,
            };
            debug!(message_id = %message.id, round, kind = message.kind(), "Appending message");

            appended.push(AppendedMessage {
                id: message.id.clone(),
                kind: message.kind().to_string(),
            });
            self.messages.push(message);
            session.next_message_id += 1;
        }

        if !appended.is_empty() {
            info!(
                parliament_id = %session.id,
                round,
                count = appended.len(),
                next_message_id = session.next_message_id,
                "Ledger appended"
            );
        }
        appended
    }

    /// Highest counter value present in the ledger.
    pub fn highest_message_number(&self) -> Option<u32> {
        self.messages.iter().filter_map(Message::number).max()
    }

    /// Messages recorded during a given round.
    pub fn messages_in_round(&self, round: u32) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.round == round)
    }
}
