use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("line item index {index} is out of range for a bill of {len} items")]
    LineOutOfRange { index: usize, len: usize },
    #[error("customer name must not be empty")]
    MissingCustomerName,
    #[error("a bill must contain at least one line item")]
    EmptyItems,
}
