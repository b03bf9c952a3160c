use serde::Deserialize;
use std::fmt;

/// Identifier returned by the remote API. Some endpoints answer with JSON
/// strings and some with numbers; both are opaque to us and stringified
/// wherever a follow-up request references them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Str(String),
    Num(i64),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// Creation-response envelope; only the id is consumed, everything else the
/// remote returns is ignored.
#[derive(Debug, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub id: Option<ResourceId>,
}
