//! Error handling shared by the Farmgate crates
//!
//! Structured error types with context and recovery suggestions

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type FarmgateResult<T> = Result<T, FarmgateError>;

/// Extra information attached to configuration and validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Component where the error originated
    pub component: String,
    /// Operation being performed when the error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            ..Default::default()
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the shared layer
#[derive(Error, Debug)]
pub enum FarmgateError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FarmgateError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            FarmgateError::Config { context, .. } => Some(context),
            FarmgateError::Validation { context, .. } => Some(context),
            FarmgateError::Io(_) | FarmgateError::Serialization(_) => None,
        }
    }

    /// Name of the offending field for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            FarmgateError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let component = self.context().map(|c| c.component.as_str());
        match self {
            FarmgateError::Validation { .. } => {
                warn!(component = ?component, error = %self, "Validation error");
            }
            _ => {
                error!(component = ?component, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::FarmgateError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file and FARMGATE_* variables"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::FarmgateError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file and FARMGATE_* variables"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::FarmgateError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}
