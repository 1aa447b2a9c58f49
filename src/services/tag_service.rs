use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::database::repository::TagRepository;
use crate::services::dto::{TagDto, TagRequest};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validator::TagValidator;

pub const TAG: &str = "Tag";

#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<TagDto>> {
        let tags = self.tags.find_all().await?;
        Ok(tags.into_iter().map(TagDto::from).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<TagDto> {
        self.tags
            .find_by_id(id)
            .await?
            .map(TagDto::from)
            .ok_or_else(|| ServiceError::not_found(TAG, id))
    }

    pub async fn create(&self, request: TagRequest) -> ServiceResult<TagDto> {
        let errors = TagValidator::validate(request.name.as_deref());
        if !errors.is_empty() {
            return Err(ServiceError::invalid(TAG, errors));
        }
        let name = request.name.unwrap_or_default();

        if self.tags.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::AlreadyExists { entity: TAG, name });
        }

        match self.tags.create(&name).await {
            Ok(tag) => Ok(tag.into()),
            Err(DatabaseError::UniqueViolation(_)) => Err(ServiceError::AlreadyExists { entity: TAG, name }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.tags.delete(id).await? {
            return Err(ServiceError::not_found(TAG, id));
        }
        tracing::info!(tag_id = id, "Deleted tag");
        Ok(())
    }

    /// Validates each requested name and drops duplicates, keeping the
    /// first occurrence. Missing tags are created by the repository that
    /// links them.
    pub fn validate_names(requests: &[TagRequest]) -> ServiceResult<Vec<String>> {
        let mut names: Vec<String> = Vec::with_capacity(requests.len());
        for request in requests {
            let errors = TagValidator::validate(request.name.as_deref());
            if !errors.is_empty() {
                return Err(ServiceError::invalid(TAG, errors));
            }
            if let Some(name) = request.name.as_deref() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validator::ValidationError;
    use crate::testing::MemoryStore;

    fn service() -> (TagService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TagService::new(store.clone()), store)
    }

    fn request(name: &str) -> TagRequest {
        TagRequest { name: Some(name.to_string()) }
    }

    #[tokio::test]
    async fn creates_and_finds_tag() {
        let (service, _) = service();
        let created = service.create(request("food")).await.unwrap();
        assert_eq!(created.name, "food");
        assert_eq!(service.find_by_id(created.id).await.unwrap(), created);
        assert_eq!(service.find_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn rejects_invalid_name() {
        let (service, _) = service();
        let err = service.create(request("bad-name")).await.unwrap_err();
        match err {
            ServiceError::InvalidEntity { entity, errors } => {
                assert_eq!(entity, TAG);
                assert_eq!(errors, vec![ValidationError::InvalidName]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            service.create(TagRequest::default()).await,
            Err(ServiceError::InvalidEntity { .. })
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_name() {
        let (service, _) = service();
        service.create(request("food")).await.unwrap();
        let err = service.create(request("food")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn missing_tag_is_not_found() {
        let (service, _) = service();
        assert!(matches!(
            service.find_by_id(42).await,
            Err(ServiceError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            service.delete(42).await,
            Err(ServiceError::NotFound { id: 42, .. })
        ));
    }

    #[tokio::test]
    async fn deletes_tag() {
        let (service, _) = service();
        let tag = service.create(request("food")).await.unwrap();
        service.delete(tag.id).await.unwrap();
        assert!(service.find_all().await.unwrap().is_empty());
    }

    #[test]
    fn validate_names_dedupes_in_order() {
        let names = TagService::validate_names(&[request("food"), request("drink"), request("food")]).unwrap();
        assert_eq!(names, vec!["food".to_string(), "drink".to_string()]);
        assert!(TagService::validate_names(&[]).unwrap().is_empty());
    }

    #[test]
    fn validate_names_rejects_any_bad_name() {
        let err = TagService::validate_names(&[request("ok"), request("")]).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidEntity { entity: TAG, .. }));
        assert!(TagService::validate_names(&[TagRequest::default()]).is_err());
    }
}
