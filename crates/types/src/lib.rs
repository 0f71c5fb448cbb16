//! Validated value types shared across the filedrop workspace.
//!
//! These wrappers guarantee their invariants at construction time so the core
//! services never have to re-validate strings mid-request:
//!
//! - [`Extension`] — a filename suffix in canonical form (leading dot,
//!   lowercase ASCII alphanumerics).
//! - [`ApiKey`] — an opaque upload credential compared by exact equality.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated value types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The input was empty or contained only whitespace
    #[error("value cannot be empty")]
    Empty,
    /// The extension contained characters outside `a-z0-9` or was too long
    #[error("invalid extension: {0}")]
    InvalidExtension(String),
}

/// Maximum number of characters after the dot in an [`Extension`].
const MAX_EXTENSION_LEN: usize = 15;

/// A filename extension in canonical form.
///
/// Canonical form is a leading dot followed by 1 to 15 lowercase ASCII
/// alphanumeric characters, e.g. `.png` or `.mp4`.
///
/// [`Extension::parse`] accepts input with or without the leading dot and in
/// any case, and normalises it. This mirrors how the upload path derives the
/// suffix from a client-supplied filename: the raw suffix is lowercased and
/// dotted before it is checked against the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Extension(String);

impl Extension {
    /// Validates and normalises a filename extension.
    ///
    /// # Arguments
    ///
    /// * `input` - The raw extension, with or without a leading dot, in any
    ///   case. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Empty`] if nothing remains after trimming, or
    /// [`TypeError::InvalidExtension`] if the suffix contains characters
    /// outside `a-z0-9` or exceeds 15 characters.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty);
        }

        let suffix = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if suffix.is_empty() {
            return Err(TypeError::InvalidExtension(trimmed.to_owned()));
        }

        let suffix = suffix.to_ascii_lowercase();
        if suffix.len() > MAX_EXTENSION_LEN
            || !suffix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(TypeError::InvalidExtension(trimmed.to_owned()));
        }

        Ok(Self(format!(".{suffix}")))
    }

    /// Returns the canonical form including the leading dot.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the suffix without the leading dot.
    pub fn suffix(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Extension {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Extension {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Extension::parse(s)
    }
}

impl serde::Serialize for Extension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Extension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Extension::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// An opaque upload credential.
///
/// Keys are generated by the key store and compared by exact, case-sensitive
/// equality. The wrapper only guarantees the key is non-empty; entropy and
/// length are the issuer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key string.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Empty`] if the input is empty or whitespace-only.
    pub fn new(input: impl Into<String>) -> Result<Self, TypeError> {
        let value = input.into();
        if value.trim().is_empty() {
            return Err(TypeError::Empty);
        }
        Ok(Self(value))
    }

    /// Returns the key material.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_dot() {
        let ext = Extension::parse(".png").unwrap();
        assert_eq!(ext.as_str(), ".png");
        assert_eq!(ext.suffix(), "png");
    }

    #[test]
    fn test_parse_without_dot() {
        let ext = Extension::parse("png").unwrap();
        assert_eq!(ext.as_str(), ".png");
    }

    #[test]
    fn test_parse_normalises_case() {
        let ext = Extension::parse(".PNG").unwrap();
        assert_eq!(ext.as_str(), ".png");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let ext = Extension::parse("  .jpg\n").unwrap();
        assert_eq!(ext.as_str(), ".jpg");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Extension::parse(""), Err(TypeError::Empty)));
        assert!(matches!(Extension::parse("   "), Err(TypeError::Empty)));
    }

    #[test]
    fn test_parse_rejects_bare_dot() {
        assert!(matches!(
            Extension::parse("."),
            Err(TypeError::InvalidExtension(_))
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert!(Extension::parse(".pn g").is_err());
        assert!(Extension::parse("../etc").is_err());
        assert!(Extension::parse(".tar.gz").is_err());
    }

    #[test]
    fn test_parse_rejects_overlong() {
        assert!(Extension::parse(".abcdefghijklmnop").is_err());
    }

    #[test]
    fn test_parse_accepts_digits() {
        let ext = Extension::parse("mp3").unwrap();
        assert_eq!(ext.as_str(), ".mp3");
    }

    #[test]
    fn test_display_and_from_str() {
        let ext: Extension = ".webm".parse().unwrap();
        assert_eq!(format!("{}", ext), ".webm");
    }

    #[test]
    fn test_serde_round_trip() {
        let ext = Extension::parse(".json").unwrap();
        let encoded = serde_json::to_string(&ext).unwrap();
        assert_eq!(encoded, "\".json\"");
        let decoded: Extension = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ext);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<Extension, _> = serde_json::from_str("\"not/ok\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_exact_equality() {
        let a = ApiKey::new("abc123").unwrap();
        let b = ApiKey::new("abc123").unwrap();
        let c = ApiKey::new("ABC123").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_api_key_rejects_empty() {
        assert!(matches!(ApiKey::new(""), Err(TypeError::Empty)));
        assert!(matches!(ApiKey::new(" \n"), Err(TypeError::Empty)));
    }

    #[test]
    fn test_api_key_display() {
        let key = ApiKey::new("s3cret").unwrap();
        assert_eq!(key.to_string(), "s3cret");
        assert_eq!(key.as_str(), "s3cret");
    }
}
