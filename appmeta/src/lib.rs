//! appmeta: metadata engine for an application repository
//!
//! This crate provides:
//! - The package/build-recipe model and its field and flag taxonomy
//! - Readers for the native line format, JSON, XML and YAML documents
//! - Normalization shared by every reader
//! - Rule-based validation of field and flag values
//! - The wiki-style description formatter (plain text, HTML, wiki)
//! - Writers for the native and YAML formats
//! - The source-library registry and multi-document loading

pub mod comments;
pub mod config;
pub mod description;
pub mod error;
pub mod format;
pub mod loader;
pub mod normalize;
pub mod package;
pub mod parser;
pub mod recipe;
pub mod srclib;
pub mod taxonomy;
pub mod validator;
pub mod value;
pub mod writer;

pub use config::Config;
pub use error::{Error, Location, Result};
pub use format::Format;
pub use loader::{load_packages, PackageSet};
pub use package::Package;
pub use parser::parse_metadata;
pub use recipe::Build;
pub use srclib::{Srclib, SrclibRegistry};
pub use taxonomy::{Field, Flag};
pub use value::{Toggle, Value};
pub use writer::write_metadata;
