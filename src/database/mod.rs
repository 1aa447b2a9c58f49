pub mod certificate_repository;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod tag_repository;

pub use certificate_repository::PgGiftCertificateRepository;
pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{GiftCertificateRepository, TagRepository};
pub use tag_repository::PgTagRepository;
