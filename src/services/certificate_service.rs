use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::config::CONFIG;
use crate::database::models::{GiftCertificate, NewGiftCertificate};
use crate::database::repository::{GiftCertificateRepository, TagRepository};
use crate::filter::{CertificateFilter, Filter, FilterOrder, Pagination};
use crate::services::dto::{GiftCertificateDto, GiftCertificateRequest, Page, TagRequest};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::tag_service::{TagService, TAG};
use crate::services::validator::{CertificateFields, GiftCertificateValidator, PaginationValidator};

pub const GIFT_CERTIFICATE: &str = "GiftCertificate";

/// Raw search parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub tag_names: Vec<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort: Vec<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl SearchParams {
    /// Parses a raw query string. Repeated `tagName` and `sort` keys are kept
    /// in order; for single-valued keys the last occurrence wins. Unknown keys
    /// are ignored.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(raw) = raw else {
            return params;
        };
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "tagName" => params.tag_names.push(value),
                "name" => params.name = Some(value),
                "description" => params.description = Some(value),
                "sort" => params.sort.push(value),
                "page" => params.page = Some(value),
                "pageSize" => params.page_size = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Clone)]
pub struct GiftCertificateService {
    certificates: Arc<dyn GiftCertificateRepository>,
    tags: Arc<dyn TagRepository>,
}

impl GiftCertificateService {
    pub fn new(certificates: Arc<dyn GiftCertificateRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { certificates, tags }
    }

    pub async fn filter(&self, params: SearchParams) -> ServiceResult<Page<GiftCertificateDto>> {
        let sort = FilterOrder::parse(&params.sort)?;
        let pagination = Self::pagination(&params)?;
        let criteria = CertificateFilter {
            tag_names: params.tag_names,
            name: params.name,
            description: params.description,
        };
        let filter = Filter::new(criteria).order(sort).paginate(pagination);

        let certificates = self.certificates.filter(&filter).await?;
        let total_elements = self.certificates.count(filter.criteria()).await?;

        let ids: Vec<i64> = certificates.iter().map(|c| c.id).collect();
        let mut tags = self.tags.find_by_certificate_ids(&ids).await?;
        let items = certificates
            .into_iter()
            .map(|c| {
                let certificate_tags = tags.remove(&c.id).unwrap_or_default();
                GiftCertificateDto::compose(c, certificate_tags)
            })
            .collect();

        Ok(Page {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total_elements,
            total_pages: pagination.total_pages(total_elements),
        })
    }

    fn pagination(params: &SearchParams) -> ServiceResult<Pagination> {
        let settings = &CONFIG.filter;
        let page = parse_number("page", params.page.as_deref(), 1)?;
        let page_size = parse_number(
            "pageSize",
            params.page_size.as_deref(),
            i64::from(settings.default_page_size),
        )?;
        PaginationValidator::validate(page, page_size, settings.max_page_size)
            .map_err(ServiceError::InvalidPagination)?;
        let page = u32::try_from(page).map_err(|_| ServiceError::InvalidPagination(format!("page out of range: {}", page)))?;
        // Bounded by max_page_size after validation
        let page_size = page_size as u32;
        Ok(Pagination::new(page, page_size))
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<GiftCertificateDto> {
        let certificate = self.load(id).await?;
        let tags = self.tags.find_by_certificate_id(id).await?;
        Ok(GiftCertificateDto::compose(certificate, tags))
    }

    pub async fn create(&self, request: GiftCertificateRequest) -> ServiceResult<GiftCertificateDto> {
        let price = request.price.map(normalize_price);
        let errors = GiftCertificateValidator::validate(&CertificateFields {
            name: request.name.as_deref(),
            description: request.description.as_deref(),
            price,
            duration: request.duration,
        });
        if !errors.is_empty() {
            return Err(ServiceError::invalid(GIFT_CERTIFICATE, errors));
        }

        let tag_names = TagService::validate_names(request.tags.as_deref().unwrap_or(&[]))?;
        let now = now();
        let certificate = NewGiftCertificate {
            name: request.name.unwrap_or_default(),
            description: request.description.unwrap_or_default(),
            price: price.unwrap_or_default(),
            duration: request.duration.unwrap_or_default(),
            create_date: now,
            last_update_date: now,
        };

        let created = self.certificates.create(certificate, &tag_names).await?;
        let tags = self.tags.find_by_certificate_id(created.id).await?;
        Ok(GiftCertificateDto::compose(created, tags))
    }

    /// Overlays the present fields on the stored record, re-validates the
    /// result and replaces the tag set when `tags` is given.
    pub async fn update(&self, id: i64, request: GiftCertificateRequest) -> ServiceResult<GiftCertificateDto> {
        let mut certificate = self.load(id).await?;
        if let Some(name) = request.name {
            certificate.name = name;
        }
        if let Some(description) = request.description {
            certificate.description = description;
        }
        if let Some(price) = request.price {
            certificate.price = normalize_price(price);
        }
        if let Some(duration) = request.duration {
            certificate.duration = duration;
        }

        let errors = GiftCertificateValidator::validate(&CertificateFields {
            name: Some(&certificate.name),
            description: Some(&certificate.description),
            price: Some(certificate.price),
            duration: Some(certificate.duration),
        });
        if !errors.is_empty() {
            return Err(ServiceError::invalid(GIFT_CERTIFICATE, errors));
        }

        let replacement = request.tags.as_deref().map(TagService::validate_names).transpose()?;
        certificate.last_update_date = now();

        if !self.certificates.update(&certificate, replacement.as_deref()).await? {
            return Err(ServiceError::not_found(GIFT_CERTIFICATE, id));
        }

        let tags = self.tags.find_by_certificate_id(id).await?;
        tracing::info!(certificate_id = id, "Updated gift certificate");
        Ok(GiftCertificateDto::compose(certificate, tags))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.certificates.delete(id).await? {
            return Err(ServiceError::not_found(GIFT_CERTIFICATE, id));
        }
        tracing::info!(certificate_id = id, "Deleted gift certificate");
        Ok(())
    }

    pub async fn add_tag(&self, id: i64, request: TagRequest) -> ServiceResult<GiftCertificateDto> {
        let certificate = self.load(id).await?;
        for name in TagService::validate_names(std::slice::from_ref(&request))? {
            self.certificates.add_tag(id, &name).await?;
        }
        let tags = self.tags.find_by_certificate_id(id).await?;
        Ok(GiftCertificateDto::compose(certificate, tags))
    }

    pub async fn remove_tag(&self, id: i64, tag_id: i64) -> ServiceResult<()> {
        self.load(id).await?;
        if !self.certificates.remove_tag(id, tag_id).await? {
            return Err(ServiceError::not_found(TAG, tag_id));
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> ServiceResult<GiftCertificate> {
        self.certificates
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(GIFT_CERTIFICATE, id))
    }
}

fn parse_number(field: &str, raw: Option<&str>, default: i64) -> ServiceResult<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ServiceError::InvalidPagination(format!("{} must be an integer, got '{}'", field, v))),
    }
}

fn normalize_price(price: Decimal) -> Decimal {
    price.round_dp(2)
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
