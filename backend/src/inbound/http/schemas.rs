//! OpenAPI stand-ins for domain types.
//!
//! Domain types do not derive `ToSchema`. The structs here describe their
//! wire form and are registered under the domain names so generated clients
//! see `Error`, `ErrorCode` and `Money`.

use utoipa::ToSchema;

/// Wire form of [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate account fields or a repeated copy.
    #[schema(rename = "conflict")]
    Conflict,
    /// Funding contention outlasted the retry budget. Safe to retry.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error envelope returned with every non-2xx response.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "fields are read by utoipa only")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "Offer amount exceeds the remaining price")]
    message: String,
    /// Matches the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Context such as `{"wishId": 5, "remaining": "50.00"}`.
    details: Option<serde_json::Value>,
}

/// Non-negative decimal amount with at most two fractional digits.
///
/// Responses always carry exactly two digits as a string. Requests also
/// accept a JSON number.
#[derive(ToSchema)]
#[schema(as = Money, example = "300.00")]
#[expect(dead_code, reason = "field is read by utoipa only")]
pub struct MoneySchema(String);
