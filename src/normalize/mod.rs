//! Response normalization.
//!
//! Inference providers do not agree on what a "reply" looks like. Depending on the client path
//! a completion may come back as a JSON object with a nested `message`, a typed message struct,
//! or a debug-printed string of such a struct. [`RawResponse`] closes that set of shapes and
//! [`extract_text`] pulls plain text out of any of them without failing.
//!
//! Rule order is fixed: record shapes, then accessor shapes, then embedded-pattern recovery on
//! plain strings, then the textual representation of whatever is left.

pub mod clean;


pub use clean::clean_text;

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{Map, Value};

static EMBEDDED_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)content=(?:'(.*?)'|"(.*?)")"#).expect("embedded content pattern is valid")
});

/// Object-style access to a response message.
///
/// Implementors expose whichever of `content` / `message` they carry; both default to `None`.
/// The [`Debug`] rendering is used as the textual representation when nothing else matches.
pub trait ResponseAccessor: fmt::Debug + Send + Sync {
    /// The reply content, if this object carries one.
    fn content(&self) -> Option<RawResponse> {
        None
    }

    /// A nested message, if this object wraps one.
    fn message(&self) -> Option<RawResponse> {
        None
    }
}

/// An unnormalized value returned by an inference transport.
#[derive(Debug, Clone)]
pub enum RawResponse {
    /// Key-value record (a decoded JSON object).
    Record(Map<String, Value>),
    /// Typed object exposing [`ResponseAccessor`] methods.
    Accessor(Arc<dyn ResponseAccessor>),
    /// Plain string, possibly a debug print of a structured message.
    Text(String),
    /// Anything else (numbers, arrays, null).
    Unknown(Value),
}

impl RawResponse {
    /// Wraps a typed accessor.
    pub fn accessor<A: ResponseAccessor + 'static>(value: A) -> Self {
        Self::Accessor(Arc::new(value))
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Record(map),
            Value::String(s) => Self::Text(s),
            other => Self::Unknown(other),
        }
    }
}

impl From<String> for RawResponse {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RawResponse {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Textual representation: JSON text for records and unknown values, the `Debug` rendering
/// for accessors, the string itself for text.
impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawResponse::Record(map) => {
                write!(f, "{}", Value::Object(map.clone()))
            }
            RawResponse::Accessor(obj) => write!(f, "{:?}", obj),
            RawResponse::Text(s) => f.write_str(s),
            RawResponse::Unknown(value) => write!(f, "{}", value),
        }
    }
}

/// Extracts plain reply text from any [`RawResponse`].
///
/// Total: every input yields some string. Unrecognized shapes degrade to their textual
/// representation.
pub fn extract_text(fragment: &RawResponse) -> String {
    let extracted = match fragment {
        RawResponse::Record(map) => from_record(map),
        RawResponse::Accessor(obj) => from_accessor(obj.as_ref()),
        RawResponse::Text(s) => Some(recover_embedded_content(s).unwrap_or_else(|| s.clone())),
        RawResponse::Unknown(_) => None,
    };

    extracted.unwrap_or_else(|| fragment.to_string())
}

/// Extracts and cleans in one step; this is what gets cached.
pub fn normalize(fragment: &RawResponse) -> String {
    clean_text(&extract_text(fragment))
}

fn from_record(map: &Map<String, Value>) -> Option<String> {
    if let Some(Value::String(content)) = map.get("content") {
        return Some(content.clone());
    }

    match map.get("message")? {
        Value::Object(message) => message.get("content").map(value_text),
        Value::String(message) => Some(message.clone()),
        _ => None,
    }
}

fn from_accessor(obj: &dyn ResponseAccessor) -> Option<String> {
    if let Some(content) = obj.content() {
        let text = match &content {
            RawResponse::Text(s) => s.clone(),
            RawResponse::Record(map) => match map.get("content") {
                Some(nested) => value_text(nested),
                None => content.to_string(),
            },
            other => raw_text(other),
        };
        return Some(text);
    }

    let message = obj.message()?;
    let text = match &message {
        RawResponse::Record(map) => match map.get("content") {
            Some(nested) => value_text(nested),
            None => message.to_string(),
        },
        RawResponse::Accessor(inner) => match inner.content() {
            Some(RawResponse::Text(s)) => s,
            Some(other) => raw_text(&other),
            None => message.to_string(),
        },
        other => other.to_string(),
    };
    Some(text)
}

fn recover_embedded_content(text: &str) -> Option<String> {
    let captures = EMBEDDED_CONTENT.captures(text)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

/// Textual representation of an accessor's value, with `null` read as empty.
fn raw_text(raw: &RawResponse) -> String {
    match raw {
        RawResponse::Unknown(value) => value_text(value),
        other => other.to_string(),
    }
}

/// Strings pass through, `null` becomes empty, other JSON values render as JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
