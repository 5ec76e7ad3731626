//! Domain and wire types.
//!
//! The backend stores restriction values as two nullable columns. On the Rust
//! side a row holds exactly one [`RestrictionValue`]; rows that break that rule
//! are rejected while decoding instead of surfacing as unreachable UI states.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::InvalidRestriction;

/// Backend id of a restriction row.
pub type RestrictionId = u64;

/// Backend id of a default message.
pub type MessageId = u64;

/// QR pairing payload returned by the `connect` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrPayload {
    /// Raw pairing data. Must be encoded into a QR matrix for display.
    Raw(String),
    /// Pre-rendered image delivered as a base64 data URL.
    DataUrl {
        /// Media type, e.g. `image/png`.
        mime: String,
        /// Decoded image bytes.
        bytes: Vec<u8>,
    },
}

impl QrPayload {
    /// Classify a backend payload.
    ///
    /// Anything that is not a well-formed base64 data URL is treated as raw
    /// pairing data.
    pub fn parse(payload: impl Into<String>) -> Self {
        let payload = payload.into();
        match decode_data_url(&payload) {
            Some((mime, bytes)) => Self::DataUrl { mime, bytes },
            None => Self::Raw(payload),
        }
    }
}

fn decode_data_url(payload: &str) -> Option<(String, Vec<u8>)> {
    let rest = payload.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(data.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// Value held by a restriction row.
#[derive(Debug, Clone, PartialEq)]
pub enum RestrictionValue {
    /// Prompt or phrase.
    Text(String),
    /// Numeric threshold (limits, delays, retention days).
    Numeric(f64),
}

impl RestrictionValue {
    /// Whether this is a text value.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// A named backend configuration value governing bot behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RestrictionRow", into = "RestrictionRow")]
pub struct Restriction {
    /// Backend id, used for updates.
    pub id: RestrictionId,
    /// Stable key, used for display (`mainPrompt`, `historyLimit`, ...).
    pub title: String,
    /// Current value.
    pub value: RestrictionValue,
}

/// Wire shape of a restriction row.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestrictionRow {
    id: RestrictionId,
    title: String,
    restriction: Option<String>,
    restriction_number: Option<f64>,
}

impl TryFrom<RestrictionRow> for Restriction {
    type Error = InvalidRestriction;

    fn try_from(row: RestrictionRow) -> Result<Self, Self::Error> {
        let value = match (row.restriction, row.restriction_number) {
            (Some(text), None) => RestrictionValue::Text(text),
            (None, Some(number)) => RestrictionValue::Numeric(number),
            (None, None) => {
                return Err(InvalidRestriction {
                    id: row.id,
                    title: row.title,
                    reason: "neither text nor numeric value is set",
                });
            },
            (Some(_), Some(_)) => {
                return Err(InvalidRestriction {
                    id: row.id,
                    title: row.title,
                    reason: "both text and numeric values are set",
                });
            },
        };
        Ok(Self { id: row.id, title: row.title, value })
    }
}

impl From<Restriction> for RestrictionRow {
    fn from(restriction: Restriction) -> Self {
        let (text, number) = match restriction.value {
            RestrictionValue::Text(text) => (Some(text), None),
            RestrictionValue::Numeric(number) => (None, Some(number)),
        };
        Self {
            id: restriction.id,
            title: restriction.title,
            restriction: text,
            restriction_number: number,
        }
    }
}

/// Partial update body for `PUT restriction/{id}`.
///
/// Only the field matching the row's value kind is ever sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RestrictionPatch {
    /// Encodes as `{"restriction": "..."}`.
    Text {
        /// New text value.
        restriction: String,
    },
    /// Encodes as `{"restrictionNumber": n}`.
    Numeric {
        /// New numeric value.
        #[serde(rename = "restrictionNumber")]
        restriction_number: f64,
    },
}

impl RestrictionPatch {
    /// Patch carrying a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { restriction: value.into() }
    }

    /// Patch carrying a numeric value.
    pub fn numeric(value: f64) -> Self {
        Self::Numeric { restriction_number: value }
    }
}

/// A canned text snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultMessage {
    /// Backend id.
    pub id: MessageId,
    /// Message body.
    pub text: String,
}

/// Response body: `{ data: T }`, or `T` itself for endpoints that answer bare
/// (`status` sends `{ isLoged }`, `connect` may send the payload alone).
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Body<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Body<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Body of the `status` response.
#[derive(Deserialize)]
pub(crate) struct SessionStatus {
    #[serde(rename = "isLoged")]
    pub(crate) is_loged: bool,
}

/// Request body for creating or updating a default message.
#[derive(Serialize)]
pub(crate) struct MessageBody<'a> {
    pub(crate) message: &'a str,
}
