use thiserror::Error;

/// Failure of a backend call. Every variant is caught at the pane boundary and
/// turned into that pane's error banner.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request never produced a response (connect, TLS, body read).
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  /// The response body is not JSON of the expected shape.
  #[error("malformed response: {0}")]
  ResponseFormat(#[from] serde_json::Error),

  /// The backend answered with a non-success status.
  #[error("backend returned {status}: {message}")]
  Status { status: u16, message: String },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_error_display_includes_backend_message() {
    let err = ApiError::Status { status: 500, message: "Error searching videos".to_string() };
    assert_eq!(err.to_string(), "backend returned 500: Error searching videos");
  }

  #[test]
  fn json_errors_convert_to_response_format() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: ApiError = parse.into();
    assert!(matches!(err, ApiError::ResponseFormat(_)));
  }
}
