use std::fmt;

use thiserror::Error;

/// A single value in an error's detail mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailValue {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::Text(s) => f.write_str(s),
            DetailValue::Integer(n) => write!(f, "{}", n),
            DetailValue::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

impl From<u16> for DetailValue {
    fn from(value: u16) -> Self {
        DetailValue::Integer(u64::from(value))
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        DetailValue::Integer(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Float(value)
    }
}

/// Insertion-ordered key/value details attached to an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details(Vec<(String, DetailValue)>);

impl Details {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DetailValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DetailValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DetailValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The four failure kinds surfaced by the PAN-OS client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Authentication,
    Configuration,
    Operation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Operation => "OperationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanosApiError {
    /// Transport failure, timeout, or a non-2xx HTTP status.
    #[error("{message}")]
    ConnectionError { message: String, details: Details },

    /// The appliance rejected the API key.
    #[error("{message}")]
    AuthenticationError { message: String, details: Details },

    /// The response did not have the shape the parser expects.
    #[error("{message}")]
    ConfigurationError { message: String, details: Details },

    /// The appliance reported a command failure for a valid key.
    #[error("{message}")]
    OperationError { message: String, details: Details },
}

impl PanosApiError {
    pub fn connection(message: impl Into<String>) -> Self {
        PanosApiError::ConnectionError {
            message: message.into(),
            details: Details::new(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        PanosApiError::AuthenticationError {
            message: message.into(),
            details: Details::new(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        PanosApiError::ConfigurationError {
            message: message.into(),
            details: Details::new(),
        }
    }

    pub fn operation(message: impl Into<String>) -> Self {
        PanosApiError::OperationError {
            message: message.into(),
            details: Details::new(),
        }
    }

    /// Builder-style detail attachment.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.details_mut().insert(key, value);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PanosApiError::ConnectionError { .. } => ErrorKind::Connection,
            PanosApiError::AuthenticationError { .. } => ErrorKind::Authentication,
            PanosApiError::ConfigurationError { .. } => ErrorKind::Configuration,
            PanosApiError::OperationError { .. } => ErrorKind::Operation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PanosApiError::ConnectionError { message, .. }
            | PanosApiError::AuthenticationError { message, .. }
            | PanosApiError::ConfigurationError { message, .. }
            | PanosApiError::OperationError { message, .. } => message,
        }
    }

    pub fn details(&self) -> &Details {
        match self {
            PanosApiError::ConnectionError { details, .. }
            | PanosApiError::AuthenticationError { details, .. }
            | PanosApiError::ConfigurationError { details, .. }
            | PanosApiError::OperationError { details, .. } => details,
        }
    }

    fn details_mut(&mut self) -> &mut Details {
        match self {
            PanosApiError::ConnectionError { details, .. }
            | PanosApiError::AuthenticationError { details, .. }
            | PanosApiError::ConfigurationError { details, .. }
            | PanosApiError::OperationError { details, .. } => details,
        }
    }
}

impl From<roxmltree::Error> for PanosApiError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        PanosApiError::configuration(format!("Failed to parse XML response: {}", err))
            .with_detail("line", u64::from(pos.row))
            .with_detail("column", u64::from(pos.col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_report_labels() {
        assert_eq!(PanosApiError::connection("x").kind().as_str(), "ConnectionError");
        assert_eq!(
            PanosApiError::authentication("x").kind().as_str(),
            "AuthenticationError"
        );
        assert_eq!(
            PanosApiError::configuration("x").kind().as_str(),
            "ConfigurationError"
        );
        assert_eq!(PanosApiError::operation("x").kind().as_str(), "OperationError");
    }

    #[test]
    fn test_details_keep_insertion_order() {
        let err = PanosApiError::connection("unreachable")
            .with_detail("host", "fw01.example.com")
            .with_detail("port", 443u16)
            .with_detail("timeout_seconds", 30u64);

        let keys: Vec<&str> = err.details().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["host", "port", "timeout_seconds"]);
        assert_eq!(err.details().get("port"), Some(&DetailValue::Integer(443)));
        assert_eq!(err.to_string(), "unreachable");
    }

    #[test]
    fn test_detail_insert_replaces_existing_key() {
        let mut details = Details::new();
        details.insert("host", "a");
        details.insert("port", 1u16);
        details.insert("host", "b");

        let keys: Vec<&str> = details.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["host", "port"]);
        assert_eq!(details.get("host"), Some(&DetailValue::Text("b".to_string())));
    }

    #[test]
    fn test_detail_value_display() {
        assert_eq!(DetailValue::from("abc").to_string(), "abc");
        assert_eq!(DetailValue::from(404u16).to_string(), "404");
        assert_eq!(DetailValue::from(1.5f64).to_string(), "1.5");
    }

    #[test]
    fn test_xml_syntax_error_is_configuration_error() {
        let err: PanosApiError = roxmltree::Document::parse("<response>")
            .map(|_| ())
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.details().get("line").is_some());
    }
}
