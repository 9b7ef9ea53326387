//! Spreadsheet header to invoice field mapping.
//!
//! When an Excel or CSV file is uploaded, its column headers have to be
//! matched to the fields of the invoice schema. This crate suggests matches,
//! keeps the user's corrections, and reports how far the mapping is from
//! covering every required field.
//!
//! # Example
//!
//! ```ignore
//! use invoice_map::{MappingSession, MemoryStorage, storage_key};
//! use invoice_model::{FieldCatalog, InvoiceDirection};
//!
//! let storage = MemoryStorage::new();
//! let headers = vec!["Invoice No".to_string(), "Buyer TIN".to_string()];
//! let mut session = MappingSession::open(
//!     FieldCatalog::invoice(),
//!     headers,
//!     &storage,
//!     storage_key(InvoiceDirection::Sent),
//! );
//!
//! session.accept_all_suggestions();
//! session.skip("Buyer TIN")?;
//! println!("{}% of required fields mapped", session.progress().progress_percent);
//!
//! if session.can_finalize() {
//!     session.save(&storage)?;
//! }
//! ```

mod autosave;
mod error;
mod progress;
mod session;
mod similarity;
mod storage;
mod store;
mod suggest;
mod view;

pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use error::{MappingError, PersistenceError, SaveError};
pub use progress::{ProgressSnapshot, progress};
pub use session::{FieldOption, MappingSession, ViewState};
pub use similarity::similarity;
pub use storage::{
    FORMAT_VERSION, MappingRepository, MappingStorage, MemoryStorage, StoredMapping,
    load_or_default, storage_key,
};
pub use store::MappingStore;
pub use suggest::{
    ConfidenceLevel, ConfidenceThresholds, MIN_CONFIDENCE, MatchKind, MatchSuggester,
    SUBSTRING_SCORE, SuggestConfig, Suggestion, normalize,
};
pub use view::{FilterMode, HeaderQuery, SortMode, filter_headers, sort_headers, view};
