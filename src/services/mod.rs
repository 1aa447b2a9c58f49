pub mod certificate_service;
pub mod dto;
pub mod error;
pub mod tag_service;
pub mod validator;

pub use certificate_service::{GiftCertificateService, SearchParams};
pub use error::{ServiceError, ServiceResult};
pub use tag_service::TagService;
