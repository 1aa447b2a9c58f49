use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::manager::DatabaseError;
use crate::database::models::{GiftCertificate, NewGiftCertificate};
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::GiftCertificateRepository;
use crate::filter::{CertificateFilter, Filter};

const RETURNING: &str = "RETURNING id, name, description, price, duration, create_date, last_update_date";

pub struct PgGiftCertificateRepository {
    pool: PgPool,
}

impl PgGiftCertificateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates any missing tags and links all of them. A concurrent insert of
    /// the same name blocks on conflict and is then read back.
    async fn link_tags(
        tx: &mut Transaction<'_, Postgres>,
        certificate_id: i64,
        tag_names: &[String],
    ) -> Result<(), DatabaseError> {
        if tag_names.is_empty() {
            return Ok(());
        }
        sqlx::query("INSERT INTO tags (name) SELECT UNNEST($1::TEXT[]) ON CONFLICT (name) DO NOTHING")
            .bind(tag_names)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO certificates_tags (certificate_id, tag_id) \
             SELECT $1, t.id FROM tags t WHERE t.name = ANY($2) ON CONFLICT DO NOTHING",
        )
        .bind(certificate_id)
        .bind(tag_names)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl GiftCertificateRepository for PgGiftCertificateRepository {
    async fn filter(&self, filter: &Filter) -> Result<Vec<GiftCertificate>, DatabaseError> {
        QueryBuilder::<GiftCertificate>::new(filter.to_sql())
            .fetch_all(&self.pool)
            .await
    }

    async fn count(&self, criteria: &CertificateFilter) -> Result<i64, DatabaseError> {
        let sql = Filter::new(criteria.clone()).to_count_sql();
        QueryBuilder::<GiftCertificate>::new(sql)
            .fetch_count(&self.pool)
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GiftCertificate>, DatabaseError> {
        let certificate = sqlx::query_as::<_, GiftCertificate>(
            "SELECT id, name, description, price, duration, create_date, last_update_date \
             FROM gift_certificates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(certificate)
    }

    async fn create(
        &self,
        certificate: NewGiftCertificate,
        tag_names: &[String],
    ) -> Result<GiftCertificate, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, GiftCertificate>(&format!(
            "INSERT INTO gift_certificates \
             (name, description, price, duration, create_date, last_update_date) \
             VALUES ($1, $2, $3, $4, $5, $6) {}",
            RETURNING
        ))
        .bind(&certificate.name)
        .bind(&certificate.description)
        .bind(certificate.price)
        .bind(certificate.duration)
        .bind(certificate.create_date)
        .bind(certificate.last_update_date)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_tags(&mut tx, created.id, tag_names).await?;
        tx.commit().await?;

        tracing::info!(certificate_id = created.id, tags = tag_names.len(), "Created gift certificate");
        Ok(created)
    }

    async fn update(
        &self,
        certificate: &GiftCertificate,
        tag_names: Option<&[String]>,
    ) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE gift_certificates \
             SET name = $2, description = $3, price = $4, duration = $5, last_update_date = $6 \
             WHERE id = $1",
        )
        .bind(certificate.id)
        .bind(&certificate.name)
        .bind(&certificate.description)
        .bind(certificate.price)
        .bind(certificate.duration)
        .bind(certificate.last_update_date)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(tag_names) = tag_names {
            sqlx::query("DELETE FROM certificates_tags WHERE certificate_id = $1")
                .bind(certificate.id)
                .execute(&mut *tx)
                .await?;
            Self::link_tags(&mut tx, certificate.id, tag_names).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM gift_certificates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_tag(&self, certificate_id: i64, tag_name: &str) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        Self::link_tags(&mut tx, certificate_id, &[tag_name.to_string()]).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_tag(&self, certificate_id: i64, tag_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM certificates_tags WHERE certificate_id = $1 AND tag_id = $2")
            .bind(certificate_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
