use crate::timestamp::{parse_timestamp, try_parse_timestamp, TimestampError};
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use tracing::debug;

/// Speaker label used when an entry carries no display name.
pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// The payload could not be decoded into a transcript.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("transcript payload is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("transcript entries are malformed")]
    Entries(#[source] serde_json::Error),
}

/// An entry whose offsets cannot be read, reported by
/// [`Transcript::check_timestamps`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry {position} has a bad {field}")]
pub struct MalformedTimestamp {
    /// 1-based position of the entry in the transcript.
    pub position: usize,
    pub field: &'static str,
    #[source]
    pub source: TimestampError,
}

/// One spoken utterance.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    #[serde(default, deserialize_with = "cue_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub start_offset: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub end_offset: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub speaker_display_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub text: Option<String>,
    // NOTE: ignoring confidence, speakerId, spokenLanguageTag and friends
}

/// Payload ids are usually strings, but numbers show up too. Empty strings,
/// zero and any other JSON type count as "no id", so the cue falls back to its
/// position.
fn cue_id<'de, D>(deser: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    match Option::<Value>::deserialize(deser)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(number_text(&n))),
        Some(Value::Bool(_) | Value::Array(_) | Value::Object(_)) => Ok(None),
    }
}

/// Text-like fields never fail an entry: numbers and booleans are written out,
/// `null`, arrays and objects fall back to the field's default.
fn loose_text<'de, D>(deser: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deser)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(number_text(&n)),
        Some(Value::Bool(b)) => Some(b.to_string()),
        None | Some(Value::Null | Value::Array(_) | Value::Object(_)) => None,
    })
}

/// Integral numbers print without a fractional part, so `7.0` reads as `7`.
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64's Display already drops a zero fraction
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

impl TranscriptEntry {
    pub fn speaker(&self) -> &str {
        match self.speaker_display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_SPEAKER,
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The cue identifier for this entry, given its 0-based index.
    pub fn cue_id(&self, index: usize) -> Cow<'_, str> {
        match &self.id {
            Some(id) => Cow::Borrowed(id),
            None => Cow::Owned((index + 1).to_string()),
        }
    }

    /// Start offset in seconds, `NaN` if missing or malformed.
    pub fn start_seconds(&self) -> f64 {
        parse_timestamp(self.start_offset.as_deref().unwrap_or(""))
    }

    /// End offset in seconds, `NaN` if missing or malformed.
    pub fn end_seconds(&self) -> f64 {
        parse_timestamp(self.end_offset.as_deref().unwrap_or(""))
    }
}

/// A decoded payload: the entries in speaking order, plus the original text.
#[derive(Debug, Clone)]
pub struct Transcript {
    payload: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Decodes a raw payload. Only the top-level `entries` list is
    /// interpreted; a missing or `null` list is an empty transcript, and so is
    /// any valid JSON that is not an object.
    pub fn parse(payload: impl Into<String>) -> Result<Self, DecodeError> {
        let payload = payload.into();
        let value: serde_json::Value = serde_json::from_str(&payload)?;
        let entries = match value {
            serde_json::Value::Object(mut fields) => fields.remove("entries"),
            _ => None,
        };

        let entries: Vec<TranscriptEntry> = match entries {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(entries) => serde_json::from_value(entries).map_err(DecodeError::Entries)?,
        };
        debug!("decoded transcript with {} entries", entries.len());

        Ok(Self { payload, entries })
    }

    /// The payload exactly as it was received.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fails on the first entry whose start or end offset does not parse.
    pub fn check_timestamps(&self) -> Result<(), MalformedTimestamp> {
        for (i, entry) in self.entries.iter().enumerate() {
            for (field, offset) in [
                ("startOffset", &entry.start_offset),
                ("endOffset", &entry.end_offset),
            ] {
                let offset = offset.as_deref().unwrap_or("");
                try_parse_timestamp(offset).map_err(|source| MalformedTimestamp {
                    position: i + 1,
                    field,
                    source,
                })?;
            }
        }
        Ok(())
    }
}
