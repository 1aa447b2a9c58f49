pub mod response;

pub use response::{method_not_allowed_json, ApiResponse, ApiResult};
