use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ai::params::ParamError;

/// Failures of the layer catalog and the network store.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("unknown layer type '{0}'")]
    UnknownLayerType(String),

    #[error("layer type '{0}' is abstract and cannot be instantiated")]
    AbstractLayerType(&'static str),

    #[error(transparent)]
    InvalidParam(#[from] ParamError),

    #[error("network {0} not found")]
    NetworkNotFound(u64),

    #[error("layer {layer_id} not found in network {network_id}")]
    LayerNotFound { network_id: u64, layer_id: usize },
}

/// Everything a handler can fail with. Rendered as `{ "error": "..." }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error("layer type '{0}' not found")]
    LayerTypeNotFound(String),

    #[error("network {0} not found")]
    UnknownNetworkId(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing or invalid access token")]
    Unauthorized,

    #[error("failed to issue access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0}s overflows the expiry timestamp")]
    TokenLifetime(u64),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Builder(err) => match err {
                BuilderError::NetworkNotFound(_) | BuilderError::LayerNotFound { .. } => StatusCode::NOT_FOUND,
                BuilderError::UnknownLayerType(_)
                | BuilderError::AbstractLayerType(_)
                | BuilderError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            },
            ApiError::LayerTypeNotFound(_) | ApiError::UnknownNetworkId(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) | ApiError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Token(_) | ApiError::TokenLifetime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (ApiError::from(BuilderError::NetworkNotFound(3)), StatusCode::NOT_FOUND),
            (
                ApiError::from(BuilderError::LayerNotFound { network_id: 0, layer_id: 9 }),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::from(BuilderError::UnknownLayerType("Foo".into())), StatusCode::BAD_REQUEST),
            (ApiError::from(BuilderError::AbstractLayerType("Layer")), StatusCode::BAD_REQUEST),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ApiError::TokenLifetime(u64::MAX), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::LayerTypeNotFound("Foo".into()), StatusCode::NOT_FOUND),
            (ApiError::UnknownNetworkId("abc".into()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn param_errors_keep_their_message() {
        let err = ApiError::from(BuilderError::from(ParamError::BelowMinimum {
            name: "stride".into(),
            value: 0.0,
            min: 1.0,
        }));
        assert_eq!(err.to_string(), "parameter 'stride' must be at least 1, got 0");
    }
}
