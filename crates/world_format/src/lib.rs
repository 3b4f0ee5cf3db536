//! # World Format
//!
//! Data model for declarative world-definition files: the object
//! descriptions a world is authored as, the per-file locator tables that
//! make every object reachable by UID without walking the tree, and the
//! parse-time validation that turns missing-key surprises into explicit
//! errors.
//!
//! ## Core Types
//!
//! - [`FileData`] - One parsed world-data source: the object tree plus its
//!   UID locator table and optional hub metadata
//! - [`ObjectDescription`] - One declared world object: type tag, optional
//!   cross-file reference, children, visual assets
//! - [`ObjectPath`] - Locator reaching a description anywhere in a file's
//!   object tree
//! - [`FormatError`] - Structural validation failures
//!
//! ## File Shape
//!
//! A source file is a single JSON document:
//!
//! ```json
//! {
//!     "Objects": {
//!         "1201562646.82dzlu": {
//!             "Type": "Region",
//!             "Objects": {
//!                 "1201562668.21dzlu": {
//!                     "Type": "Location",
//!                     "Visual": { "Model": "models/world/port" }
//!                 }
//!             }
//!         }
//!     },
//!     "ObjectIds": {
//!         "1201562646.82dzlu": ["1201562646.82dzlu"],
//!         "1201562668.21dzlu": ["1201562646.82dzlu", "1201562668.21dzlu"]
//!     }
//! }
//! ```
//!
//! Every UID appearing anywhere inside `Objects` must have an `ObjectIds`
//! entry; [`FileData::validate`] enforces this after deserialization so
//! lookups by UID never walk the tree manually.

mod error;
mod path;
mod types;

pub use error::FormatError;
pub use path::ObjectPath;
pub use types::{
    object_types, FileData, ModelRef, ObjectDescription, VisualDescription, MODEL_FILE_SUFFIX,
};
