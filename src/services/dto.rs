use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::{GiftCertificate, Tag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDto {
    pub id: i64,
    pub name: String,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self { id: tag.id, name: tag.name }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCertificateDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub duration: i32,
    #[serde(serialize_with = "timestamp::serialize")]
    pub create_date: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub last_update_date: DateTime<Utc>,
    pub tags: Vec<TagDto>,
}

impl GiftCertificateDto {
    pub fn compose(certificate: GiftCertificate, mut tags: Vec<Tag>) -> Self {
        tags.sort_by_key(|t| t.id);
        Self {
            id: certificate.id,
            name: certificate.name,
            description: certificate.description,
            price: certificate.price,
            duration: certificate.duration,
            create_date: certificate.create_date,
            last_update_date: certificate.last_update_date,
            tags: tags.into_iter().map(TagDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagRequest {
    pub name: Option<String>,
}

/// Body for create and partial update. Absent fields are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCertificateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration: Option<i32>,
    pub tags: Option<Vec<TagRequest>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

/// `yyyy-MM-dd'T'HH:mm:ss.SSS'Z'` in UTC
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }
}
