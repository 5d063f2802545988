//! JSON mapper
//!
//! Unknown properties are ignored on read and `None` fields are skipped on
//! write (via `skip_serializing_if` on the models).

use crate::error::{Error, Result};
use crate::http::Charset;
use crate::types::StringMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

/// Serializes request payloads and deserializes response bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapper;

impl JsonMapper {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single value from a body encoded in `charset`
    pub fn parse<T: DeserializeOwned>(&self, bytes: &[u8], charset: &Charset) -> Result<T> {
        let text = as_utf8(bytes, charset);
        serde_json::from_slice(&text).map_err(|e| mapper_error::<T>(&e))
    }

    /// Parse a JSON array of values
    pub fn parse_list<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        charset: &Charset,
    ) -> Result<Vec<T>> {
        let text = as_utf8(bytes, charset);
        serde_json::from_slice(&text).map_err(|e| mapper_error::<Vec<T>>(&e))
    }

    /// Serialize a payload to its JSON text
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| mapper_error::<T>(&e))
    }

    /// Serialize a payload to JSON bytes
    pub fn serialize_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| mapper_error::<T>(&e))
    }

    /// Parse a flat JSON object of strings
    pub fn parse_map(&self, bytes: &[u8]) -> Result<StringMap> {
        serde_json::from_slice::<HashMap<String, String>>(bytes)
            .map_err(|e| mapper_error::<StringMap>(&e))
    }
}

/// Re-encode non-UTF-8 bodies so serde_json can read them
fn as_utf8<'a>(bytes: &'a [u8], charset: &Charset) -> Cow<'a, [u8]> {
    if charset.is_utf8() {
        Cow::Borrowed(bytes)
    } else {
        Cow::Owned(charset.decode(bytes).into_bytes())
    }
}

fn mapper_error<T: ?Sized>(error: &serde_json::Error) -> Error {
    Error::mapper(std::any::type_name::<T>(), error.to_string())
}

/// Timestamps that fall back to the Unix epoch when unparseable
///
/// The platform occasionally sends dates that are not RFC 3339. Rather than
/// failing the whole document those fields read as `1970-01-01T00:00:00Z`.
pub mod lenient_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|value| parse(&value)))
    }

    pub(crate) fn parse(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }
}
