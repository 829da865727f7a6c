use serde::{Deserialize, Serialize};

/// Business status code carried by every non-streaming response envelope.
///
/// Classification always switches on this field, never on the HTTP status
/// alone. Codes the server adds later deserialize as [`ResponseCode::Unknown`]
/// and are treated as generic failures.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCode {
    Success,
    Fail,
    NotFound,
    Unauthorized,
    Forbidden,
    ValidateError,
    #[serde(other)]
    Unknown,
}

/// The uniform `{code, message, data}` wrapper every non-streaming endpoint returns.
#[derive(Serialize, Deserialize, Debug)]
pub struct Response<T> {
    pub code: ResponseCode,
    pub message: String,
    pub data: T,
}

/// Page state for list endpoints, embedded as `data.paginator`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    pub current_page: i64,
    pub page_size: i64,
    pub total_page: i64,
    pub total_record: i64,
}

/// Payload shape of every list endpoint: the records plus their page state.
#[derive(Serialize, Deserialize, Debug)]
pub struct Pagination<T> {
    pub list: Vec<T>,
    pub paginator: Paginator,
}

pub type PaginatedResponse<T> = Response<Pagination<T>>;
