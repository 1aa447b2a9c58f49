use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::Tag;
use crate::database::repository::TagRepository;

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CertificateTagRow {
    certificate_id: i64,
    id: i64,
    name: String,
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn find_all(&self) -> Result<Vec<Tag>, DatabaseError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_by_certificate_id(&self, certificate_id: i64) -> Result<Vec<Tag>, DatabaseError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name FROM tags t \
             JOIN certificates_tags ct ON ct.tag_id = t.id \
             WHERE ct.certificate_id = $1 ORDER BY t.id",
        )
        .bind(certificate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn find_by_certificate_ids(
        &self,
        certificate_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>, DatabaseError> {
        if certificate_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, CertificateTagRow>(
            "SELECT ct.certificate_id, t.id, t.name FROM tags t \
             JOIN certificates_tags ct ON ct.tag_id = t.id \
             WHERE ct.certificate_id = ANY($1) ORDER BY ct.certificate_id, t.id",
        )
        .bind(certificate_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut out: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            out.entry(row.certificate_id)
                .or_default()
                .push(Tag { id: row.id, name: row.name });
        }
        Ok(out)
    }

    async fn create(&self, name: &str) -> Result<Tag, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(tag_id = tag.id, "Created tag");
        Ok(tag)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
