//! In-memory repositories for service tests and the HTTP integration suite.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{GiftCertificate, NewGiftCertificate, Tag};
use crate::database::repository::{GiftCertificateRepository, TagRepository};
use crate::filter::{CertificateFilter, Filter};

#[derive(Default)]
struct State {
    tags: BTreeMap<i64, Tag>,
    certificates: BTreeMap<i64, GiftCertificate>,
    /// (certificate_id, tag_id)
    links: BTreeSet<(i64, i64)>,
    next_tag_id: i64,
    next_certificate_id: i64,
}

impl State {
    fn tags_of(&self, certificate_id: i64) -> Vec<Tag> {
        self.links
            .range((certificate_id, i64::MIN)..=(certificate_id, i64::MAX))
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect()
    }

    fn matching(&self, criteria: &CertificateFilter) -> Vec<GiftCertificate> {
        self.certificates
            .values()
            .filter(|c| criteria.matches(c, &self.tags_of(c.id)))
            .cloned()
            .collect()
    }

    fn create_tag(&mut self, name: &str) -> Tag {
        self.next_tag_id += 1;
        let tag = Tag {
            id: self.next_tag_id,
            name: name.to_string(),
        };
        self.tags.insert(tag.id, tag.clone());
        tag
    }

    fn link_tags(&mut self, certificate_id: i64, tag_names: &[String]) {
        for name in tag_names {
            let existing = self.tags.values().find(|t| &t.name == name).map(|t| t.id);
            let tag_id = match existing {
                Some(id) => id,
                None => self.create_tag(name).id,
            };
            self.links.insert((certificate_id, tag_id));
        }
    }
}

/// Mirrors the Postgres repositories, including unique tag names and
/// cascading link removal.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Tag>, DatabaseError> {
        Ok(self.state.read().await.tags.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>, DatabaseError> {
        Ok(self.state.read().await.tags.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.tags.values().find(|t| t.name == name).cloned())
    }

    async fn find_by_certificate_id(&self, certificate_id: i64) -> Result<Vec<Tag>, DatabaseError> {
        Ok(self.state.read().await.tags_of(certificate_id))
    }

    async fn find_by_certificate_ids(
        &self,
        certificate_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>, DatabaseError> {
        let state = self.state.read().await;
        Ok(certificate_ids
            .iter()
            .map(|id| (*id, state.tags_of(*id)))
            .filter(|(_, tags)| !tags.is_empty())
            .collect())
    }

    async fn create(&self, name: &str) -> Result<Tag, DatabaseError> {
        let mut state = self.state.write().await;
        if state.tags.values().any(|t| t.name == name) {
            return Err(DatabaseError::UniqueViolation("tags_name_key".to_string()));
        }
        Ok(state.create_tag(name))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let removed = state.tags.remove(&id).is_some();
        state.links.retain(|(_, tag_id)| *tag_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl GiftCertificateRepository for MemoryStore {
    async fn filter(&self, filter: &Filter) -> Result<Vec<GiftCertificate>, DatabaseError> {
        let state = self.state.read().await;
        let mut rows = state.matching(filter.criteria());
        // Rows start in id order and the sort is stable, so ties fall back to id
        rows.sort_by(|a, b| {
            filter
                .sort_keys()
                .iter()
                .map(|k| k.compare(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        if let Some(page) = filter.pagination() {
            let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            rows = rows.into_iter().skip(offset).take(page.page_size as usize).collect();
        }
        Ok(rows)
    }

    async fn count(&self, criteria: &CertificateFilter) -> Result<i64, DatabaseError> {
        Ok(self.state.read().await.matching(criteria).len() as i64)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GiftCertificate>, DatabaseError> {
        Ok(self.state.read().await.certificates.get(&id).cloned())
    }

    async fn create(
        &self,
        certificate: NewGiftCertificate,
        tag_names: &[String],
    ) -> Result<GiftCertificate, DatabaseError> {
        let mut state = self.state.write().await;
        state.next_certificate_id += 1;
        let created = certificate.into_certificate(state.next_certificate_id);
        state.certificates.insert(created.id, created.clone());
        state.link_tags(created.id, tag_names);
        Ok(created)
    }

    async fn update(
        &self,
        certificate: &GiftCertificate,
        tag_names: Option<&[String]>,
    ) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.certificates.get_mut(&certificate.id) else {
            return Ok(false);
        };
        let create_date = stored.create_date;
        *stored = GiftCertificate {
            create_date,
            ..certificate.clone()
        };
        if let Some(tag_names) = tag_names {
            state.links.retain(|(c, _)| *c != certificate.id);
            state.link_tags(certificate.id, tag_names);
        }
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let removed = state.certificates.remove(&id).is_some();
        state.links.retain(|(c, _)| *c != id);
        Ok(removed)
    }

    async fn add_tag(&self, certificate_id: i64, tag_name: &str) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if !state.certificates.contains_key(&certificate_id) {
            return Err(DatabaseError::NotFound(format!("gift certificate {}", certificate_id)));
        }
        state.link_tags(certificate_id, &[tag_name.to_string()]);
        Ok(())
    }

    async fn remove_tag(&self, certificate_id: i64, tag_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.state.write().await.links.remove(&(certificate_id, tag_id)))
    }
}
