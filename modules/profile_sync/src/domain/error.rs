use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// No signed-in user (or one without an id). Callers redirect to login.
    #[error("No active session")]
    Unauthenticated,

    #[error("No profile found for '{email}'")]
    ProfileNotFound { email: String },

    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },

    #[error("Profile is not being edited")]
    NotEditing,

    #[error("Field '{field}' cannot be changed")]
    ReadOnlyField { field: String },

    #[error("Unknown field '{field}'")]
    UnknownField { field: String },

    #[error("Session cache error: {message}")]
    SessionCache { message: String },
}

impl DomainError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated
    }

    pub fn profile_not_found(email: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            email: email.into(),
        }
    }

    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn not_editing() -> Self {
        Self::NotEditing
    }

    pub fn read_only_field(field: impl Into<String>) -> Self {
        Self::ReadOnlyField {
            field: field.into(),
        }
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    pub fn session_cache(message: impl Into<String>) -> Self {
        Self::SessionCache {
            message: message.into(),
        }
    }

    /// Recoverable errors become a notification; the rest are caller bugs or redirects.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound { .. } | Self::Transport { .. } | Self::SessionCache { .. }
        )
    }
}
