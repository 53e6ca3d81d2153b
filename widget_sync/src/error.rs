use thiserror::Error;

/// Errors raised by widget models.
///
/// Stale feedback and malformed feedback payloads are recovered inside the
/// request cycle; the remaining variants are developer errors and are
/// returned to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("option {name} expects {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown property {name} on {widget}")]
    UnknownProperty { widget: &'static str, name: String },
    #[error("unknown widget: {0}")]
    UnknownWidget(String),
    #[error("widget already exists: {0}")]
    DuplicateWidget(String),
    #[error("widget {id} is not a {expected}")]
    WrongWidgetType { id: String, expected: &'static str },
    #[error("{widget} has no internal field {field}")]
    UnknownInternalField { widget: String, field: String },
    #[error("malformed feedback for {field}: {reason}")]
    MalformedFeedback { field: String, reason: String },
    #[error("invalid widget id: {0:?}")]
    InvalidWidgetId(String),
    #[error("{0} cannot host a capability")]
    NotACapabilityHost(String),
    #[error("{0} is a capability and must be attached to a host")]
    DetachedCapability(String),
    #[error("handler failed: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, WidgetError>;

impl WidgetError {
    pub fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedFeedback {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
