//! Contains the `Payload` enum, the data carried by string and number
//! tokens and by the matching syntax tree leaves.
use std::fmt;

/// The literal data attached to a `Token` or a `SyntaxTree` node.
///
/// Only string and number tokens (and the `String`/`Number` nodes built
/// from them) carry data; every other kind holds `Payload::None`.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum Payload {
    /// No data.
    #[default]
    None,
    /// The unescaped text of a string literal.
    String(String),
    /// The decoded value of a number literal.
    Number(f64),
}

impl Payload {
    /// Returns the text if this is a string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value if this is a number payload.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }
}

/// Strings are written as-is, numbers with six fractional digits.
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => Ok(()),
            Payload::String(s) => f.write_str(s),
            Payload::Number(n) => write!(f, "{:.6}", n),
        }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::String(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::String(s.to_string())
    }
}

impl From<f64> for Payload {
    fn from(n: f64) -> Self {
        Payload::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accessors() {
        let s = Payload::from("key");
        assert_eq!(s.as_str(), Some("key"));
        assert_eq!(s.as_f64(), None);

        let n = Payload::from(-150.0);
        assert_eq!(n.as_f64(), Some(-150.0));
        assert_eq!(n.as_str(), None);

        assert!(Payload::default().is_none());
    }

    #[test]
    fn test_payload_display() {
        assert_eq!(Payload::from("hello world").to_string(), "hello world");
        assert_eq!(Payload::from(1.5).to_string(), "1.500000");
        assert_eq!(Payload::from(-150.0).to_string(), "-150.000000");
        assert_eq!(Payload::None.to_string(), "");
    }
}
