//! Shared building blocks for HTTP handlers

pub mod errors;
pub mod response;
pub mod validated_json;

pub use errors::{api_error, bad_request, ApiError, ApiResult};
pub use response::{ApiResponse, EmptyData, PaginatedResponse};
pub use validated_json::ValidatedJson;
