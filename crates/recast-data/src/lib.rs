#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Shared data access layer for Recast: migrations and the Postgres-backed
//! implementations of the core storage collaborator traits.

pub mod error;
pub mod store;

pub use error::{DataError, Result as DataResult};
pub use store::PgStore;
