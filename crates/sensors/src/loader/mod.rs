//! Filesystem descriptor loader with hot-reload via `notify` watcher.
//!
//! Reads rack descriptors from `<root>/racks/` (YAML or JSON) and model
//! descriptors from `<root>/models/` (JSON) into an in-memory catalog keyed
//! by file stem. A model that fails to load is remembered with its error so
//! the renderer can show why instead of a loading placeholder.

mod catalog;
mod core;
mod error;
mod watcher;


pub use self::catalog::{Descriptor, DescriptorCatalog, DescriptorKind, ModelStatus};
pub use self::core::DescriptorLoader;
pub use self::error::{LoadResult, LoadStatus, LoaderError, Result};
