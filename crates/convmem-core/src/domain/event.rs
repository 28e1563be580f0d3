//! Conversation events and their persisted encoding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name recorded on bot replies.
pub const BOT_AUTHOR_NAME: &str = "Bot";

/// Classification of a logged turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A message written by a conversation participant.
    UserMessage,
    /// A reply produced by the reasoning backend.
    BotReply,
}

impl EventKind {
    /// The tag used in record names and in the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserMessage => "user_message",
            EventKind::BotReply => "bot_reply",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" | "user_message" => Ok(EventKind::UserMessage),
            "bot" | "bot_reply" => Ok(EventKind::BotReply),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

/// Who wrote a turn. Descriptive only, never used for access control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Stable account identity. Older records call this `aadObjectId`.
    #[serde(
        default,
        alias = "aadObjectId",
        skip_serializing_if = "Option::is_none"
    )]
    pub identity: Option<String>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }
}

/// One immutable logged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Sortable id derived from `timestamp`.
    pub id: String,

    #[serde(rename = "ts", with = "rfc3339_micros")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: EventKind,

    pub conversation_id: String,

    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    pub text: String,

    /// Backend that produced a bot reply. Audit only.
    #[serde(rename = "model", default, skip_serializing_if = "Option::is_none")]
    pub model_tag: Option<String>,
}

impl Event {
    /// File name of the persisted record: `event_<id>_<kind>.json`.
    pub fn record_name(&self) -> String {
        format!("event_{}_{}.json", self.id, self.kind.as_str())
    }

    /// The `ts` field as written to disk.
    pub fn ts_string(&self) -> String {
        rfc3339_micros::render(&self.timestamp)
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.name.as_deref())
    }
}

/// Everything an [`Event`] carries except its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub kind: EventKind,
    pub conversation_id: String,
    pub author: Option<Author>,
    pub text: String,
    pub model_tag: Option<String>,
}

impl EventDraft {
    pub fn new(
        kind: EventKind,
        conversation_id: impl Into<String>,
        author: Option<Author>,
        text: impl Into<String>,
        model_tag: Option<String>,
    ) -> Self {
        Self {
            kind,
            conversation_id: conversation_id.into(),
            author,
            text: text.into(),
            model_tag,
        }
    }

    pub fn user_message(
        conversation_id: impl Into<String>,
        author: Option<Author>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(EventKind::UserMessage, conversation_id, author, text, None)
    }

    /// A bot reply, authored as [`BOT_AUTHOR_NAME`].
    pub fn bot_reply(
        conversation_id: impl Into<String>,
        text: impl Into<String>,
        model_tag: Option<String>,
    ) -> Self {
        Self::new(
            EventKind::BotReply,
            conversation_id,
            Some(Author::named(BOT_AUTHOR_NAME)),
            text,
            model_tag,
        )
    }

    /// Materialise the draft. A model tag survives only on bot replies.
    pub fn stamp(&self, id: String, timestamp: DateTime<Utc>) -> Event {
        let model_tag = match self.kind {
            EventKind::BotReply => self.model_tag.clone(),
            EventKind::UserMessage => None,
        };
        Event {
            id,
            timestamp,
            kind: self.kind,
            conversation_id: self.conversation_id.clone(),
            author: self.author.clone(),
            text: self.text.clone(),
            model_tag,
        }
    }
}

/// How the id of a new event is derived from its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// The rendered timestamp alone.
    #[default]
    Timestamp,
    /// The rendered timestamp followed by `-` and 8 random hex digits.
    TimestampWithNonce,
}

impl IdStrategy {
    pub fn generate(&self, timestamp: &DateTime<Utc>) -> String {
        let base = timestamp_id(timestamp);
        match self {
            IdStrategy::Timestamp => base,
            IdStrategy::TimestampWithNonce => {
                let nonce = Uuid::new_v4().simple().to_string();
                format!("{base}-{}", &nonce[..8])
            }
        }
    }
}

/// Render `timestamp` so that character order equals chronological order and
/// the result is safe in a file name: `2026-10-14T09-30-00-123456Z`.
pub fn timestamp_id(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H-%M-%S-%6fZ").to_string()
}

/// `ts` is always written as RFC 3339 UTC with microseconds. Any RFC 3339
/// offset and precision is accepted on read.
mod rfc3339_micros {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn render(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&render(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
