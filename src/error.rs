use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Typed error taxonomy for the engagement lifecycle engine.
///
/// Every failure path surfaces one of these; nothing is silently swallowed.
/// Conflicts are the translated form of unique-constraint violations — the
/// relational constraints are the actual arbiters under concurrent requests,
/// and a violation is the authoritative signal of a lost race, not a fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("invalid pagination cursor")]
    InvalidCursor,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("you have already submitted a proposal for this gig")]
    DuplicateProposal,
    #[error("this gig already has a contract")]
    AlreadyContracted,
    #[error("you have already rated this contract")]
    DuplicateRating,
    #[error("proposal is no longer open")]
    ProposalNotPending,
    #[error("contract is not active")]
    ContractNotActive,
    #[error("contract is not completed")]
    ContractNotCompleted,
    #[error("gig is not open")]
    GigNotOpen,
    #[error("service request is no longer pending")]
    RequestNotPending,
    #[error("service is not accepting requests")]
    ServiceNotActive,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("database error")]
    Db(#[from] DbErr),
}

impl ApiError {
    /// Stable machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::InvalidCursor => "invalid_cursor",
            ApiError::NotFound(_) => "not_found",
            ApiError::DuplicateProposal => "duplicate_proposal",
            ApiError::AlreadyContracted => "already_contracted",
            ApiError::DuplicateRating => "duplicate_rating",
            ApiError::ProposalNotPending => "proposal_not_pending",
            ApiError::ContractNotActive => "contract_not_active",
            ApiError::ContractNotCompleted => "contract_not_completed",
            ApiError::GigNotOpen => "gig_not_open",
            ApiError::RequestNotPending => "request_not_pending",
            ApiError::ServiceNotActive => "service_not_active",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Db(_) => "internal_error",
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

/// Translate a unique-constraint violation into the given conflict; any other
/// database error passes through as a store error.
pub fn on_unique_violation(err: DbErr, conflict: ApiError) -> ApiError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        conflict
    } else {
        ApiError::Db(err)
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCursor => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateProposal
            | ApiError::AlreadyContracted
            | ApiError::DuplicateRating => StatusCode::CONFLICT,
            ApiError::ProposalNotPending
            | ApiError::ContractNotActive
            | ApiError::ContractNotCompleted
            | ApiError::GigNotOpen
            | ApiError::RequestNotPending
            | ApiError::ServiceNotActive => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store failures are logged with their cause; the response never
        // carries internals.
        let message = match self {
            ApiError::Db(err) => {
                tracing::error!("store error: {err}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let details = match self {
            ApiError::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message,
                details,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        for err in [
            ApiError::DuplicateProposal,
            ApiError::AlreadyContracted,
            ApiError::DuplicateRating,
        ] {
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn illegal_transitions_map_to_422() {
        for err in [
            ApiError::ProposalNotPending,
            ApiError::ContractNotActive,
            ApiError::ContractNotCompleted,
            ApiError::GigNotOpen,
            ApiError::RequestNotPending,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn store_errors_stay_untranslated_without_a_unique_violation() {
        let err = DbErr::RecordNotFound("gig".to_string());
        let mapped = on_unique_violation(err, ApiError::AlreadyContracted);
        assert!(matches!(mapped, ApiError::Db(_)));
        assert_eq!(mapped.code(), "internal_error");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ApiError::InvalidCursor.code(), "invalid_cursor");
        assert_eq!(ApiError::NotFound("gig").code(), "not_found");
        assert_eq!(ApiError::Forbidden("nope").code(), "forbidden");
    }
}
