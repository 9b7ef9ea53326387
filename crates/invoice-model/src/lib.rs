//! Data model for mapping spreadsheet headers onto invoice fields.
//!
//! The [`FieldCatalog`] is the fixed, ordered schema of invoice fields a
//! spreadsheet column may be mapped to. A [`HeaderMapping`] records, per
//! spreadsheet header, which field (if any) the user chose.

pub mod catalog;
pub mod direction;
pub mod error;
pub mod field;
pub mod mapping;

pub use catalog::FieldCatalog;
pub use direction::InvoiceDirection;
pub use error::{ModelError, Result};
pub use field::{FieldCategory, FieldDescriptor};
pub use mapping::{HeaderMapping, MappingTarget, SKIP_SENTINEL};
