pub mod cart;
pub mod config;
pub mod domain;
pub mod errors;

pub use cart::Cart;
pub use domain::bill::{Bill, BillDraft, LineItem};
pub use domain::catalog::CatalogEntry;
pub use errors::DomainError;
