use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GiftCertificate {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Validity in days
    pub duration: i32,
    pub create_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

/// Insert payload; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGiftCertificate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration: i32,
    pub create_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

impl NewGiftCertificate {
    pub fn into_certificate(self, id: i64) -> GiftCertificate {
        GiftCertificate {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            duration: self.duration,
            create_date: self.create_date,
            last_update_date: self.last_update_date,
        }
    }
}
