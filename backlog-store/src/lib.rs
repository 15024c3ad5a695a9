//! Record persistence for the game backlog.
//!
//! [`RecordStore`] owns the in-memory record list and writes through a
//! [`RecordBackend`]. [`LocalFileBackend`] keeps records in a JSON file with
//! images on disk; the remote backend lives in `backlog-remote`.

pub mod backend;
pub mod error;
pub mod image;
pub mod local;
pub mod maintenance;
pub mod merge;
pub mod settings;
pub mod store;

pub use crate::backend::{BackendKind, RecordBackend};
pub use crate::error::{ImageError, StoreError};
pub use crate::image::{
    DEFAULT_MAX_IMAGE_BYTES, DataUri, ImageFile, ImageStore, PlacementStrategy, encode_image,
    place_image, sanitize_filename,
};
pub use crate::local::LocalFileBackend;
pub use crate::merge::{ImageUpdate, merge_update};
pub use crate::settings::{Settings, settings_path};
pub use crate::store::RecordStore;
