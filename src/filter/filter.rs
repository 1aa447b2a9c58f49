use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{CertificateFilter, Pagination, SortKey, SqlResult};

const SELECT_COLUMNS: &str =
    "gc.id, gc.name, gc.description, gc.price, gc.duration, gc.create_date, gc.last_update_date";
const FROM_CLAUSE: &str = "FROM gift_certificates gc";

/// Certificate search: optional criteria, ordered sort keys and an optional page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    criteria: CertificateFilter,
    order: Vec<SortKey>,
    page: Option<Pagination>,
}

impl Filter {
    pub fn new(criteria: CertificateFilter) -> Self {
        Self {
            criteria,
            order: vec![],
            page: None,
        }
    }

    pub fn order(mut self, keys: Vec<SortKey>) -> Self {
        self.order = keys;
        self
    }

    pub fn paginate(mut self, page: Pagination) -> Self {
        if crate::config::CONFIG.filter.debug_logging {
            tracing::debug!(page = page.page, page_size = page.page_size, "applying pagination");
        }
        self.page = Some(page);
        self
    }

    pub fn criteria(&self) -> &CertificateFilter {
        &self.criteria
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.order
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.page
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.criteria, 0);
        let order_clause = FilterOrder::generate(&self.order, self.page.is_some());
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", SELECT_COLUMNS),
            FROM_CLAUSE.to_string(),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.criteria, 0);
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count {}", FROM_CLAUSE)
        } else {
            format!("SELECT COUNT(*) AS count {} WHERE {}", FROM_CLAUSE, where_clause)
        };
        SqlResult { query, params }
    }

    fn build_limit_clause(&self) -> String {
        match self.page {
            Some(p) => format!("LIMIT {} OFFSET {}", p.page_size, p.offset()),
            None => String::new(),
        }
    }
}
