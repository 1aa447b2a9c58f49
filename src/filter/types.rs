use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::database::models::{GiftCertificate, Tag};

/// Whitelisted sort columns. Only these identifiers ever reach ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    LastUpdateDate,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("name") {
            Some(SortField::Name)
        } else if s.eq_ignore_ascii_case("lastUpdateDate") {
            Some(SortField::LastUpdateDate)
        } else {
            None
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "gc.name",
            SortField::LastUpdateDate => "gc.last_update_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// In-memory counterpart of the generated ORDER BY term.
    pub fn compare(&self, a: &GiftCertificate, b: &GiftCertificate) -> Ordering {
        let ord = match self.field {
            // Approximates a linguistic collation: case-folded first, bytes break ties
            SortField::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortField::LastUpdateDate => a.last_update_date.cmp(&b.last_update_date),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Optional LIKE criteria, ANDed together. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateFilter {
    pub tag_names: Vec<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CertificateFilter {
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tag_names.iter().map(String::as_str).filter(|s| !s.trim().is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Same semantics as the generated WHERE clause: case-insensitive substring
    /// match per criterion, and every tag name must match at least one tag.
    pub fn matches(&self, certificate: &GiftCertificate, tags: &[Tag]) -> bool {
        let tags_match = self
            .tag_names()
            .all(|needle| tags.iter().any(|t| contains_ignore_case(&t.name, needle)));
        let name_match = self
            .name()
            .map_or(true, |needle| contains_ignore_case(&certificate.name, needle));
        let description_match = self
            .description()
            .map_or(true, |needle| contains_ignore_case(&certificate.description, needle));
        tags_match && name_match && description_match
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn total_pages(&self, total_elements: i64) -> i64 {
        if self.page_size == 0 || total_elements <= 0 {
            return 0;
        }
        let size = i64::from(self.page_size);
        (total_elements + size - 1) / size
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
