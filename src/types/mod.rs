mod envelope;
pub use self::envelope::{PaginatedResponse, Pagination, Paginator, Response, ResponseCode};
