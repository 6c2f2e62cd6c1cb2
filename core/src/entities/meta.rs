use std::cell::Cell;
use std::fmt;

use chrono::{NaiveDateTime, SubsecRound, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The `meta` descriptor every entity and reference carries.
///
/// `size`, `limit` and `offset` are only present on list envelopes and on
/// references to nested collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_href: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Meta {
    pub fn new(href: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            entity_type: Some(entity_type.into()),
            media_type: Some("application/json".to_string()),
            ..Self::default()
        }
    }
}

/// A weak reference to another entity: only its `meta`.
///
/// When the referenced field was expanded the server sends the full entity;
/// everything except `meta` is ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntity {
    pub meta: Meta,
}

impl MetaEntity {
    pub fn new(meta: Meta) -> Self {
        Self { meta }
    }

    pub fn href(&self) -> Option<&str> {
        self.meta.href.as_deref()
    }
}

const SECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MILLISECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
// `%.f` also accepts a missing fraction.
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

thread_local! {
    static WIRE_MILLISECONDS: Cell<Option<bool>> = const { Cell::new(None) };
}

/// Restores the previous wire precision when dropped.
struct PrecisionGuard(Option<bool>);

impl Drop for PrecisionGuard {
    fn drop(&mut self) {
        WIRE_MILLISECONDS.with(|cell| cell.set(self.0));
    }
}

/// Runs `f` with every `Timestamp` serialized on this thread written in a
/// fixed precision: always `.SSS` when `milliseconds` is set, whole seconds
/// otherwise.
///
/// Outside such a scope a timestamp is written with milliseconds only when
/// it has a fractional part.
pub fn with_timestamp_precision<T>(milliseconds: bool, f: impl FnOnce() -> T) -> T {
    let previous = WIRE_MILLISECONDS.with(|cell| cell.replace(Some(milliseconds)));
    let _guard = PrecisionGuard(previous);
    f()
}

/// A local date-time in the API's `yyyy-MM-dd HH:mm:ss[.SSS]` format.
///
/// Values are kept at millisecond precision, the finest the wire carries.
/// Both precisions are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Truncates anything finer than a millisecond.
    pub fn new(value: NaiveDateTime) -> Self {
        Timestamp(value.trunc_subsecs(3))
    }

    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text, PARSE_FORMAT).map(Timestamp::new)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    fn format(&self, milliseconds: bool) -> impl fmt::Display + '_ {
        self.0.format(if milliseconds { MILLISECONDS_FORMAT } else { SECONDS_FORMAT })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(self.0.nanosecond() != 0))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp::new(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match WIRE_MILLISECONDS.with(Cell::get) {
            Some(milliseconds) => serializer.collect_str(&self.format(milliseconds)),
            None => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(&text)
            .map_err(|e| de::Error::custom(format!("invalid timestamp `{text}`: {e}")))
    }
}
