use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a remote call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Transport(String),

    /// HTTP 404. For OCR content this means processing has not finished.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            body
        };

        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(message)
        } else {
            ApiError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_404_maps_to_not_found() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, String::new());
        assert!(err.is_not_found());
        assert_eq!(err, ApiError::NotFound("Not Found".into()));
    }

    #[test]
    fn test_other_status_is_server_error() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down".into());
        assert!(!err.is_not_found());
        assert_eq!(
            err,
            ApiError::Server {
                status: 502,
                message: "upstream down".into()
            }
        );
    }
}
