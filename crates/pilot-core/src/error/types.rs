//! Core error types for Pilot

use thiserror::Error;

/// Result type alias for Pilot operations
pub type PilotResult<T> = Result<T, PilotError>;

/// Extension trait for adding context to foreign Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> PilotResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> PilotResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> PilotResult<T> {
        self.map_err(|e| PilotError::other(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> PilotResult<T> {
        self.map_err(|e| PilotError::other(format!("{}: {}", f(), e)))
    }
}

/// Main error type for the mode core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PilotError {
    /// Argument outside its accepted range; never retried
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
        context: Option<String>,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource_type: Option<String>,
        context: Option<String>,
    },

    /// Storage/persistence errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl PilotError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "PILOT_INVALID_INPUT",
            Self::NotFound { .. } => "PILOT_NOT_FOUND",
            Self::Storage { .. } => "PILOT_STORAGE_ERROR",
            Self::Io { .. } => "PILOT_IO_ERROR",
            Self::Json { .. } => "PILOT_JSON_ERROR",
            Self::Config { .. } => "PILOT_CONFIG_ERROR",
            Self::Other { .. } => "PILOT_ERROR",
        }
    }

    /// Get optional context about the error
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { context, .. }
            | Self::NotFound { context, .. }
            | Self::Storage { context, .. }
            | Self::Io { context, .. }
            | Self::Json { context, .. }
            | Self::Config { context, .. }
            | Self::Other { context, .. } => context.as_deref(),
        }
    }

    /// Whether the surrounding layer may reasonably retry the operation.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Io { .. })
    }

    /// Attach context to an existing error
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        let ctx = Some(ctx.into());
        match &mut self {
            Self::InvalidInput { context, .. }
            | Self::NotFound { context, .. }
            | Self::Storage { context, .. }
            | Self::Io { context, .. }
            | Self::Json { context, .. }
            | Self::Config { context, .. }
            | Self::Other { context, .. } => *context = ctx,
        }
        self
    }
}
