//! Content-Type parsing and charset negotiation

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

/// `type/subtype` followed by an optional raw parameter section
static FULL_MEDIA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^\s*([^\s/=;"]+)/([^\s/=;"]+)\s*(;.*)?$"#).unwrap()
});

/// One `; key=value` pair, value optionally quoted
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*;\s*([^\s/=;"]+)=("([^"]*)"|[^\s;"]*)"#).unwrap()
});

/// Parsed `Content-Type` value
///
/// Type and subtype keep their original case; parameter names are
/// lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    sub_type: String,
    parameters: BTreeMap<String, String>,
}

impl MediaType {
    /// Create a media type without parameters
    pub fn new(kind: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            sub_type: sub_type.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Parse a header value; `None` when it is not `type/subtype[; params]`
    pub fn parse(value: &str) -> Option<Self> {
        let captures = FULL_MEDIA_TYPE.captures(value)?;
        let mut media_type = Self::new(&captures[1], &captures[2]);

        if let Some(section) = captures.get(3) {
            for param in PARAMETER.captures_iter(section.as_str()) {
                let value = param
                    .get(3)
                    .or_else(|| param.get(2))
                    .map_or("", |m| m.as_str());
                media_type = media_type.with_parameter(&param[1], value);
            }
        }

        Some(media_type)
    }

    /// Add or replace a parameter
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters
            .insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Main type, e.g. `application`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Subtype, e.g. `json`
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Parameter value by case-insensitive name
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Declared `charset` parameter, if any
    pub fn charset(&self) -> Option<Charset> {
        self.parameter("charset").map(Charset::from_label)
    }

    /// Case-insensitive comparison of type and subtype
    pub fn is(&self, kind: &str, sub_type: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind) && self.sub_type.eq_ignore_ascii_case(sub_type)
    }

    /// Charset a body with this media type should be decoded with
    ///
    /// A declared charset wins. Otherwise `application/json` and `text/csv`
    /// are UTF-8 and everything else is ISO-8859-1.
    pub fn negotiated_charset(&self) -> Charset {
        if let Some(charset) = self.charset() {
            return charset;
        }
        if self.is("application", "json") || self.is("text", "csv") {
            return Charset::Utf8;
        }
        Charset::Iso8859_1
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.sub_type)?;
        for (key, value) in &self.parameters {
            if is_token(value) {
                write!(f, "; {key}={value}")?;
            } else {
                write!(f, "; {key}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii() && !c.is_ascii_control() && !" ;/=[]()<>@,:\"?".contains(c)
        })
}

/// Charset of an HTTP body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Iso8859_1,
    UsAscii,
    /// Declared but not natively supported; decoded as lossy UTF-8
    Other(String),
}

impl Charset {
    /// Map a charset label (case-insensitive) to a known charset
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Charset::Utf8,
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" => Charset::Iso8859_1,
            "us-ascii" | "ascii" => Charset::UsAscii,
            _ => Charset::Other(label.trim().to_string()),
        }
    }

    /// Canonical label
    pub fn label(&self) -> &str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
            Charset::Other(label) => label,
        }
    }

    pub fn is_utf8(&self) -> bool {
        matches!(self, Charset::Utf8 | Charset::UsAscii)
    }

    /// Decode bytes to text. Never fails; invalid sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            // Every byte maps to the code point of the same value
            Charset::Iso8859_1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Charset::UsAscii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { '\u{FFFD}' })
                .collect(),
            Charset::Other(label) => {
                warn!(charset = %label, "Unsupported charset, decoding as UTF-8");
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Negotiated charset for an optional raw `Content-Type` header value
pub fn negotiate_charset(content_type: Option<&str>) -> Charset {
    content_type
        .and_then(MediaType::parse)
        .map_or(Charset::Iso8859_1, |media_type| media_type.negotiated_charset())
}
