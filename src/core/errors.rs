use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures produced by the transport and codec layers.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {code}: {message}")]
    StatusError { code: u16, message: String },

    /// The payload did not match the endpoint's wire shape. The decode is
    /// aborted; no partially populated value is ever returned.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

/// Category of an error string reported inside an otherwise successful
/// response envelope.
///
/// The wire prefixes each entry with a fixed token (`EGeneral`, `EAPI`, ...)
/// followed by a colon and free text. Entries with no recognizable token are
/// kept whole under [`ApiErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiErrorKind {
    General,
    Api,
    Query,
    Order,
    Trade,
    Funding,
    Service,
    Session,
    /// The API reported an error string with no recognizable category.
    Unknown,
}

impl ApiErrorKind {
    /// Map a wire category token to its kind. Matching is case-sensitive.
    pub(crate) fn from_wire_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "EGeneral" => Some(Self::General),
            "EAPI" => Some(Self::Api),
            "EQuery" => Some(Self::Query),
            "EOrder" => Some(Self::Order),
            "ETrade" => Some(Self::Trade),
            "EFunding" => Some(Self::Funding),
            "EService" => Some(Self::Service),
            "ESession" => Some(Self::Session),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "EGeneral",
            Self::Api => "EAPI",
            Self::Query => "EQuery",
            Self::Order => "EOrder",
            Self::Trade => "ETrade",
            Self::Funding => "EFunding",
            Self::Service => "EService",
            Self::Session => "ESession",
            Self::Unknown => "unknown API error",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified in-band API error.
///
/// These are carried as data on parsed responses. The HTTP call and the
/// decode both succeeded; the exchange itself flagged a problem with the
/// request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}:{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_matches_wire_format() {
        let err = ApiError {
            kind: ApiErrorKind::General,
            message: "Invalid arguments".to_string(),
        };
        assert_eq!(err.to_string(), "EGeneral:Invalid arguments");

        let unknown = ApiError {
            kind: ApiErrorKind::Unknown,
            message: "something odd".to_string(),
        };
        assert_eq!(unknown.to_string(), "unknown API error:something odd");
    }

    #[test]
    fn test_wire_prefix_matching_is_case_sensitive() {
        assert_eq!(
            ApiErrorKind::from_wire_prefix("EGeneral"),
            Some(ApiErrorKind::General)
        );
        assert_eq!(ApiErrorKind::from_wire_prefix("egeneral"), None);
        assert_eq!(ApiErrorKind::from_wire_prefix("EOther"), None);
    }
}
