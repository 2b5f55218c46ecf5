use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Consultation error: {0}")]
    Consultation(#[from] ConsultationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inference engine API errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl EngineError {
    /// Build a protocol error from anything printable.
    pub fn protocol(message: impl Into<String>) -> Self {
        EngineError::Protocol {
            message: message.into(),
        }
    }

    /// Whether this failure happened below the response contract
    /// (network, timeout, HTTP status) rather than in its content.
    pub fn is_transport(&self) -> bool {
        !matches!(self, EngineError::Protocol { .. })
    }
}

/// Errors raised by the consultation state machine
#[derive(Debug, Error)]
pub enum ConsultationError {
    #[error("No active consultation session")]
    NoActiveSession,

    #[error("No question is pending an answer")]
    NoPendingQuestion,

    #[error("A consultation session is already active: {session_id}")]
    AlreadyActive { session_id: String },

    #[error("Consultation already completed")]
    Completed,

    #[error("Another {operation} is still in flight")]
    Busy { operation: &'static str },

    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// Coarse classification of consultation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, timeout or non-success HTTP status.
    TransportFailure,
    /// Malformed or contract-violating response.
    ProtocolFailure,
    /// The call was not valid in the current state.
    PreconditionViolation,
    /// A mutating call was attempted while another was outstanding.
    ConcurrencyRejection,
}

impl ConsultationError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsultationError::NoActiveSession
            | ConsultationError::NoPendingQuestion
            | ConsultationError::AlreadyActive { .. }
            | ConsultationError::Completed => ErrorKind::PreconditionViolation,
            ConsultationError::Busy { .. } => ErrorKind::ConcurrencyRejection,
            ConsultationError::Engine(e) if e.is_transport() => ErrorKind::TransportFailure,
            ConsultationError::Engine(_) => ErrorKind::ProtocolFailure,
        }
    }

    /// Whether the same call may be retried as is. Engine failures leave
    /// state at its last good point, so only precondition violations need
    /// the caller to change something first.
    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::PreconditionViolation
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for consultation operations
pub type ConsultationResult<T> = Result<T, ConsultationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Unavailable {
            message: "server down".to_string(),
            retries: 3,
        };
        assert_eq!(err.to_string(), "Engine unavailable: server down (retries: 3)");

        let err = EngineError::Api {
            status: 404,
            message: "session not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - session not found");

        let err = EngineError::protocol("missing session_id");
        assert_eq!(err.to_string(), "Protocol error: missing session_id");

        let err = EngineError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_consultation_error_display() {
        assert_eq!(
            ConsultationError::NoActiveSession.to_string(),
            "No active consultation session"
        );
        assert_eq!(
            ConsultationError::Busy { operation: "answer" }.to_string(),
            "Another answer is still in flight"
        );
        assert_eq!(
            ConsultationError::AlreadyActive {
                session_id: "s1".to_string()
            }
            .to_string(),
            "A consultation session is already active: s1"
        );
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            ConsultationError::NoPendingQuestion.kind(),
            ErrorKind::PreconditionViolation
        );
        assert_eq!(
            ConsultationError::Completed.kind(),
            ErrorKind::PreconditionViolation
        );
        assert_eq!(
            ConsultationError::Busy { operation: "start" }.kind(),
            ErrorKind::ConcurrencyRejection
        );
        assert_eq!(
            ConsultationError::Engine(EngineError::Timeout { timeout_ms: 10 }).kind(),
            ErrorKind::TransportFailure
        );
        assert_eq!(
            ConsultationError::Engine(EngineError::Api {
                status: 500,
                message: String::new()
            })
            .kind(),
            ErrorKind::TransportFailure
        );
        assert_eq!(
            ConsultationError::Engine(EngineError::protocol("bad")).kind(),
            ErrorKind::ProtocolFailure
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ConsultationError::Busy { operation: "answer" }.is_retryable());
        assert!(ConsultationError::Engine(EngineError::Timeout { timeout_ms: 1 }).is_retryable());
        assert!(ConsultationError::Engine(EngineError::protocol("x")).is_retryable());
        assert!(!ConsultationError::NoActiveSession.is_retryable());
    }

    #[test]
    fn test_engine_error_conversion_to_app_error() {
        let app_err: AppError = EngineError::Timeout { timeout_ms: 1000 }.into();
        assert!(matches!(app_err, AppError::Engine(_)));
    }

    #[test]
    fn test_consultation_error_conversion_to_app_error() {
        let app_err: AppError = ConsultationError::NoActiveSession.into();
        assert!(matches!(app_err, AppError::Consultation(_)));
        assert!(app_err.to_string().contains("No active consultation session"));
    }
}
