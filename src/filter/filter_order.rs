use super::error::FilterError;
use super::types::{SortDirection, SortField, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses sort parameters of the form `field.direction`.
    ///
    /// Each input may hold several comma-separated tokens and the inputs are
    /// concatenated in order, so `["name.asc,lastUpdateDate.desc"]` and
    /// `["name.asc", "lastUpdateDate.desc"]` are equivalent. Empty tokens are
    /// skipped. A field that appears twice keeps its first direction.
    pub fn parse<S: AsRef<str>>(sort: &[S]) -> Result<Vec<SortKey>, FilterError> {
        let mut out: Vec<SortKey> = Vec::new();
        for raw in sort {
            for token in raw.as_ref().split(',') {
                let trimmed = token.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let key = Self::parse_token(trimmed)?;
                if out.iter().any(|k| k.field == key.field) {
                    continue;
                }
                out.push(key);
            }
        }
        Ok(out)
    }

    fn parse_token(token: &str) -> Result<SortKey, FilterError> {
        let invalid = || FilterError::InvalidSortParameter(token.to_string());
        let (field, direction) = token.split_once('.').ok_or_else(invalid)?;
        let field = SortField::parse(field).ok_or_else(invalid)?;
        let direction = SortDirection::parse(direction).ok_or_else(invalid)?;
        Ok(SortKey::new(field, direction))
    }

    /// Renders ORDER BY from whitelisted columns. With `with_tiebreak` the
    /// primary key is appended so paginated results are stable.
    pub fn generate(keys: &[SortKey], with_tiebreak: bool) -> String {
        let mut parts: Vec<String> = keys
            .iter()
            .map(|k| format!("{} {}", k.field.column(), k.direction.to_sql()))
            .collect();
        if with_tiebreak {
            parts.push("gc.id ASC".to_string());
        }
        if parts.is_empty() {
            return String::new();
        }
        format!("ORDER BY {}", parts.join(", "))
    }
}
