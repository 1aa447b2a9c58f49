use std::collections::HashMap;

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{GiftCertificate, NewGiftCertificate, Tag};
use crate::filter::{CertificateFilter, Filter};

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags ordered by id
    async fn find_all(&self) -> Result<Vec<Tag>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>, DatabaseError>;

    /// Exact, case-sensitive name lookup. Names are unique.
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DatabaseError>;

    async fn find_by_certificate_id(&self, certificate_id: i64) -> Result<Vec<Tag>, DatabaseError>;

    /// Batched tag load for a page of certificates, each list ordered by tag id
    async fn find_by_certificate_ids(
        &self,
        certificate_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>, DatabaseError>;

    /// Fails with `DatabaseError::UniqueViolation` when the name is taken
    async fn create(&self, name: &str) -> Result<Tag, DatabaseError>;

    /// Returns true when a row was removed
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait GiftCertificateRepository: Send + Sync {
    async fn filter(&self, filter: &Filter) -> Result<Vec<GiftCertificate>, DatabaseError>;

    async fn count(&self, criteria: &CertificateFilter) -> Result<i64, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<GiftCertificate>, DatabaseError>;

    /// Inserts the certificate and links it to the named tags, creating
    /// missing tags in the same transaction.
    async fn create(
        &self,
        certificate: NewGiftCertificate,
        tag_names: &[String],
    ) -> Result<GiftCertificate, DatabaseError>;

    /// Writes every column except `create_date`. `None` leaves tag links
    /// untouched, `Some` replaces them with the named tags, created as
    /// needed. Returns false if the row is gone.
    async fn update(
        &self,
        certificate: &GiftCertificate,
        tag_names: Option<&[String]>,
    ) -> Result<bool, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Idempotent link to the named tag, created if missing
    async fn add_tag(&self, certificate_id: i64, tag_name: &str) -> Result<(), DatabaseError>;

    async fn remove_tag(&self, certificate_id: i64, tag_id: i64) -> Result<bool, DatabaseError>;
}
