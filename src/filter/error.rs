use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid sort parameter: {0}")]
    InvalidSortParameter(String),
}
