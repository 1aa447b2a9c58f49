use rust_decimal::Decimal;
use serde::Serialize;

pub const NAME_MAX_LEN: usize = 30;
pub const DESCRIPTION_MAX_LEN: usize = 100;
pub const MAX_PAGE_SIZE: u32 = 100;
/// Largest value the `NUMERIC(12, 2)` price column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationError {
    InvalidName,
    InvalidDescription,
    InvalidPrice,
    InvalidDuration,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidName => "name",
            ValidationError::InvalidDescription => "description",
            ValidationError::InvalidPrice => "price",
            ValidationError::InvalidDuration => "duration",
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=NAME_MAX_LEN).contains(&len)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
}

fn is_valid_description(description: &str) -> bool {
    let len = description.chars().count();
    (1..=DESCRIPTION_MAX_LEN).contains(&len)
        && description
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || c == ',' || c == '.')
}

pub struct TagValidator;

impl TagValidator {
    pub fn validate(name: Option<&str>) -> Vec<ValidationError> {
        match name {
            Some(n) if is_valid_name(n) => vec![],
            _ => vec![ValidationError::InvalidName],
        }
    }
}

/// Candidate certificate state, before or after a partial update is overlaid
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateFields<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<Decimal>,
    pub duration: Option<i32>,
}

pub struct GiftCertificateValidator;

impl GiftCertificateValidator {
    /// Collects every failing field rather than stopping at the first.
    pub fn validate(fields: &CertificateFields<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !fields.name.is_some_and(is_valid_name) {
            errors.push(ValidationError::InvalidName);
        }
        if !fields.description.is_some_and(is_valid_description) {
            errors.push(ValidationError::InvalidDescription);
        }
        if !fields.price.is_some_and(|p| p >= Decimal::ZERO && p <= MAX_PRICE) {
            errors.push(ValidationError::InvalidPrice);
        }
        if !fields.duration.is_some_and(|d| d > 0) {
            errors.push(ValidationError::InvalidDuration);
        }
        errors
    }
}

pub struct PaginationValidator;

impl PaginationValidator {
    pub fn validate(page: i64, page_size: i64, max_page_size: u32) -> Result<(), String> {
        if page < 1 {
            return Err(format!("page must be at least 1, got {}", page));
        }
        let max = i64::from(max_page_size.min(MAX_PAGE_SIZE));
        if page_size < 1 || page_size > max {
            return Err(format!("pageSize must be between 1 and {}, got {}", max, page_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn valid_fields() -> CertificateFields<'static> {
        CertificateFields {
            name: Some("Spa day"),
            description: Some("Two hours of massage, sauna and tea."),
            price: Some(Decimal::from_str("49.99").unwrap()),
            duration: Some(30),
        }
    }

    #[test]
    fn accepts_tag_names_within_bounds() {
        assert!(TagValidator::validate(Some("food")).is_empty());
        assert!(TagValidator::validate(Some("Outdoor 2024")).is_empty());
        assert!(TagValidator::validate(Some(&"a".repeat(30))).is_empty());
    }

    #[test]
    fn rejects_bad_tag_names() {
        let long = "a".repeat(31);
        for bad in ["", long.as_str(), "no-dashes", "émoji", "semi;colon"] {
            assert_eq!(TagValidator::validate(Some(bad)), vec![ValidationError::InvalidName], "{bad}");
        }
        assert_eq!(TagValidator::validate(None), vec![ValidationError::InvalidName]);
    }

    #[test]
    fn valid_certificate_passes() {
        assert!(GiftCertificateValidator::validate(&valid_fields()).is_empty());
    }

    #[test]
    fn zero_price_is_allowed() {
        let fields = CertificateFields {
            price: Some(Decimal::ZERO),
            ..valid_fields()
        };
        assert!(GiftCertificateValidator::validate(&fields).is_empty());
    }

    #[test]
    fn price_is_bounded_by_column_precision() {
        assert_eq!(MAX_PRICE, Decimal::from_str("9999999999.99").unwrap());

        let at_limit = CertificateFields {
            price: Some(MAX_PRICE),
            ..valid_fields()
        };
        assert!(GiftCertificateValidator::validate(&at_limit).is_empty());

        for too_large in ["10000000000", "100000000000000"] {
            let fields = CertificateFields {
                price: Some(Decimal::from_str(too_large).unwrap()),
                ..valid_fields()
            };
            assert_eq!(
                GiftCertificateValidator::validate(&fields),
                vec![ValidationError::InvalidPrice],
                "{too_large}"
            );
        }
    }

    #[test]
    fn collects_all_certificate_errors() {
        let fields = CertificateFields {
            name: Some("bad!name"),
            description: Some("no ; allowed"),
            price: Some(Decimal::from(-1)),
            duration: Some(0),
        };
        assert_eq!(
            GiftCertificateValidator::validate(&fields),
            vec![
                ValidationError::InvalidName,
                ValidationError::InvalidDescription,
                ValidationError::InvalidPrice,
                ValidationError::InvalidDuration,
            ]
        );
    }

    #[test]
    fn missing_fields_are_invalid() {
        let errors = GiftCertificateValidator::validate(&CertificateFields::default());
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn description_length_limit() {
        let long = "a".repeat(101);
        let fields = CertificateFields {
            description: Some(&long),
            ..valid_fields()
        };
        assert_eq!(
            GiftCertificateValidator::validate(&fields),
            vec![ValidationError::InvalidDescription]
        );
    }

    #[test]
    fn pagination_bounds() {
        assert!(PaginationValidator::validate(1, 1, 100).is_ok());
        assert!(PaginationValidator::validate(7, 100, 100).is_ok());
        assert!(PaginationValidator::validate(0, 10, 100).is_err());
        assert!(PaginationValidator::validate(1, 0, 100).is_err());
        assert!(PaginationValidator::validate(1, 101, 100).is_err());
        assert!(PaginationValidator::validate(1, 60, 50).is_err());
    }
}
