//! From trait implementations for PilotError conversions

use super::types::PilotError;

impl From<std::io::Error> for PilotError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for PilotError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<chrono::ParseError> for PilotError {
    fn from(error: chrono::ParseError) -> Self {
        Self::invalid_input(format!("Invalid timestamp: {}", error))
    }
}
