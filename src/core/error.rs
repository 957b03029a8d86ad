//! Render error types.

use thiserror::Error;

/// Errors produced while rendering or committing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Raised by user render code.
    #[error("{message}")]
    Thrown { message: String },

    /// A render error no boundary accepted. The root has been unmounted.
    #[error("uncaught error in <{component}>: {message}")]
    Uncaught { component: String, message: String },

    #[error("maximum update depth exceeded after {0} nested updates")]
    NestedUpdateLimit(usize),

    #[error("root is not mounted in this renderer")]
    UnknownRoot,
}

impl RenderError {
    /// Error thrown from a component's render.
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::Thrown {
            message: message.into(),
        }
    }

    /// Message without component context.
    pub fn message(&self) -> String {
        match self {
            Self::Thrown { message } | Self::Uncaught { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn uncaught(component: &str, error: RenderError) -> Self {
        match error {
            uncaught @ Self::Uncaught { .. } => uncaught,
            other => Self::Uncaught {
                component: component.to_string(),
                message: other.message(),
            },
        }
    }
}
