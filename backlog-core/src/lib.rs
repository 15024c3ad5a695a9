//! Game backlog data model, category registry, and list queries.
//!
//! This crate has no persistence of its own. `backlog-store` owns the record
//! list and its backends; everything here either describes a record or
//! answers a question about a slice of them.

pub mod category;
pub mod dates;
pub mod input;
pub mod query;
pub mod types;

pub use category::{CategoryEntry, CategoryError, CategoryRegistry, CategorySource};
pub use dates::{now_stamp, parse_record_date, RECORD_DATE_FORMAT};
pub use input::{GameForm, GameInput, ValidationError};
pub use query::{
    available_years, repair_invalid_dates, search, sort, statistics, SearchFilters, SortOrder,
    Statistics,
};
pub use types::{GameRecord, ImageFields, OTHER_CATEGORY};
