//! Core domain types

pub mod media;
pub mod pattern;
pub mod stamp;

pub use media::{format_size, is_image_name, MediaFile};
pub use pattern::{classify, VariantKind, VariantMatch, PARENT_TAG};
pub use stamp::RunStamp;
