//! Product catalog data model, CSV I/O, slug rules, and link formatting.
//!
//! This crate is free of persistence policy: it loads and writes tables but
//! knows nothing about backups or commit ordering. `affilink-store` builds
//! the mutation path on top of it.

pub mod csv_io;
pub mod error;
pub mod links;
pub mod slug;
pub mod types;

pub use csv_io::{join_images, load_table, parse_table, save_table, split_images, to_csv_bytes};
pub use error::{ConfigError, FormatError, ValidationError, ValidationReason};
pub use links::{LinkConfig, LinkFormatter, affiliate_url, direct_url};
pub use slug::{SlugRules, derive, is_unique, resolve_collision, validate_format};
pub use types::*;
