//! This module defines the errors that can be returned by zonering.

use std::fmt::Display;

use bytes::Bytes;
use serde::Serialize;

use crate::utils::serde_utf8_bytes;

pub type Result<T> = std::result::Result<T, Error>;

/// Error enum with all possible variants
#[derive(Debug, Serialize)]
pub enum Error {
    /// The parameters used to build a ring (or the file they came from) are unusable.
    /// Always returned at construction time, never at lookup time.
    InvalidConfig { reason: String },
    /// A node store refused to create a key because it is already present
    KeyExists {
        #[serde(with = "serde_utf8_bytes")]
        key: Bytes,
        #[serde(with = "serde_utf8_bytes")]
        current: Bytes,
    },
    /// A node store refused to update a key because it is absent
    NotFound {
        #[serde(with = "serde_utf8_bytes")]
        key: Bytes,
    },
    Logic { reason: String },
    Io { reason: String },
}

impl Error {
    /// Returns true if this is an instance of a [`Error::NotFound`] variant
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true if this is an instance of a [`Error::KeyExists`] variant
    pub fn is_key_exists(&self) -> bool {
        matches!(self, Error::KeyExists { .. })
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: format!("unable to parse ring config - {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use bytes::Bytes;

    #[test]
    fn serializes_byte_fields_as_strings() {
        let err = Error::KeyExists {
            key: Bytes::from("foo"),
            current: Bytes::from("bar"),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"KeyExists":{"key":"foo","current":"bar"}}"#);
        assert!(err.is_key_exists());
        assert!(!err.is_not_found());
    }

    #[test]
    fn io_errors_are_converted() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io { reason } if reason == "missing"));
    }
}
