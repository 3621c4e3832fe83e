use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use egov_auth::IdentityError;
use egov_core::DomainError;
use egov_store::StoreError;

/// Failure of a write path. Read paths never produce one; they degrade to
/// empty results instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
        ServiceError::Identity(IdentityError::InvalidCredentials(msg)) => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", msg)
        }
        ServiceError::Identity(IdentityError::Unavailable(msg)) => {
            json_error(StatusCode::BAD_GATEWAY, "identity_unavailable", msg)
        }
        ServiceError::Decode(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", e.to_string())
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::CONFLICT, "invariant_violation", message)
        }
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
    }
}

fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::PolicyViolation { .. } => {
            json_error(StatusCode::FORBIDDEN, "policy_violation", message)
        }
        StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", message),
        StoreError::MultipleRows { .. } => {
            json_error(StatusCode::CONFLICT, "ambiguous_result", message)
        }
        StoreError::InvalidRow(_) | StoreError::Serialization(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid_row", message)
        }
        StoreError::Database(_) | StoreError::Unavailable(_) => {
            json_error(StatusCode::BAD_GATEWAY, "store_error", message)
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(error = %self, "write rejected");
        service_error_to_response(self)
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egov_store::Operation;

    #[test]
    fn maps_errors_to_statuses() {
        let cases = [
            (ServiceError::from(DomainError::validation("x")), StatusCode::BAD_REQUEST),
            (ServiceError::from(DomainError::invariant("x")), StatusCode::CONFLICT),
            (ServiceError::from(DomainError::conflict("x")), StatusCode::CONFLICT),
            (
                ServiceError::from(StoreError::PolicyViolation {
                    table: "user_roles",
                    operation: Operation::Insert,
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::from(StoreError::NotFound {
                    table: "certificates",
                    id: uuid::Uuid::nil(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::from(StoreError::Unavailable("down".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
