use thiserror::Error;

/// Failure of a call made by the client library.
///
/// Every variant carries a stable machine-readable [`code`](ClientError::code)
/// and, where one applies, the HTTP [`status`](ClientError::status).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    /// No response was received (DNS, connect, TLS, timeout)
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RateLimit(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    /// Any other non-2xx status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// A 2xx response whose body did not have the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Wraps a failure that was not a `ClientError`, see `log_operation`
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Authentication(_) => "AUTH_ERROR",
            ClientError::Permission(_) => "PERMISSION_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND_ERROR",
            ClientError::Conflict(_) => "CONFLICT_ERROR",
            ClientError::RateLimit(_) => "RATE_LIMIT_ERROR",
            ClientError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ClientError::Upstream { .. } => "HTTP_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Operation(_) => "OPERATION_ERROR",
        }
    }

    /// HTTP status associated with the failure; `None` when nothing was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Validation(_) => Some(400),
            ClientError::Network(_) | ClientError::Decode(_) => None,
            ClientError::Authentication(_) => Some(401),
            ClientError::Permission(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Conflict(_) => Some(409),
            ClientError::RateLimit(_) => Some(429),
            ClientError::ServiceUnavailable(_) => Some(503),
            ClientError::Upstream { status, .. } => Some(*status),
            ClientError::Operation(_) => Some(500),
        }
    }

    /// Translate a non-2xx response; `message` is the server's explanation if it sent one
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| default_message(status));
        match status {
            400 | 422 => ClientError::Validation(message),
            401 => ClientError::Authentication(message),
            403 => ClientError::Permission(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            429 => ClientError::RateLimit(message),
            503 => ClientError::ServiceUnavailable(message),
            _ => ClientError::Upstream { status, message },
        }
    }
}

fn default_message(status: u16) -> String {
    match status {
        401 => "Authentication failed".to_string(),
        403 => "Permission denied".to_string(),
        404 => "Resource not found".to_string(),
        429 => "Too many requests".to_string(),
        503 => "Service is currently unavailable".to_string(),
        _ => format!("HTTP error! status: {}", status),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::from_status(status.as_u16(), None)
        } else if err.is_timeout() {
            ClientError::Network(format!("Request timed out: {}", err))
        } else {
            ClientError::Network(format!("Network request failed: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (400, "VALIDATION_ERROR"),
            (401, "AUTH_ERROR"),
            (403, "PERMISSION_ERROR"),
            (404, "NOT_FOUND_ERROR"),
            (409, "CONFLICT_ERROR"),
            (429, "RATE_LIMIT_ERROR"),
            (503, "SERVICE_UNAVAILABLE"),
            (500, "HTTP_ERROR"),
            (502, "HTTP_ERROR"),
        ];

        for (status, code) in cases {
            let err = ClientError::from_status(status, Some("x".to_string()));
            assert_eq!(err.code(), code, "status {}", status);
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(
            ClientError::from_status(401, None).to_string(),
            "Authentication failed"
        );
        assert_eq!(
            ClientError::from_status(503, None).to_string(),
            "Service is currently unavailable"
        );
        assert_eq!(
            ClientError::from_status(418, None).to_string(),
            "HTTP error! status: 418"
        );
    }

    #[test]
    fn test_server_message_wins() {
        let err = ClientError::from_status(409, Some("Email already registered".to_string()));
        assert_eq!(err, ClientError::Conflict("Email already registered".to_string()));
    }

    #[test]
    fn test_network_has_no_status() {
        let err = ClientError::Network("Network request failed".to_string());
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_operation_error() {
        let err = ClientError::Operation("sync_profile".to_string());
        assert_eq!(err.code(), "OPERATION_ERROR");
        assert_eq!(err.to_string(), "Operation failed: sync_profile");
    }
}
