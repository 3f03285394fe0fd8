use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("no active call `{0}`")]
    UnknownCall(String),
    #[error("call `{0}` is already active")]
    CallAlreadyActive(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "The requested call is not active.",
            Self::Conflict { .. } => "The call has already been started.",
            Self::ServiceUnavailable { .. } => {
                "An upstream service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::UnknownCall(call) => {
                Self::NotFound { message: format!("no active call `{call}`"), correlation_id }
            }
            ApplicationError::CallAlreadyActive(call) => {
                Self::Conflict { message: format!("call `{call}` is already active"), correlation_id }
            }
            ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, InterfaceError};

    #[test]
    fn unknown_call_maps_to_not_found_with_correlation_id() {
        let interface = ApplicationError::UnknownCall("CA123".to_owned()).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NotFound { ref correlation_id, ref message }
                if correlation_id == "req-1" && message.contains("CA123")
        ));
        assert_eq!(interface.correlation_id(), "req-1");
    }

    #[test]
    fn integration_error_maps_to_service_unavailable() {
        let interface = ApplicationError::Integration("completion api returned 500".to_owned())
            .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "An upstream service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("unsupported agent".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn duplicate_call_maps_to_conflict() {
        let interface =
            ApplicationError::CallAlreadyActive("CA9".to_owned()).into_interface("req-4");
        assert!(matches!(interface, InterfaceError::Conflict { .. }));
    }
}
