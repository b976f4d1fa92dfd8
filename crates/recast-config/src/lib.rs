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

//! Configuration resolution for the recording pipeline.
//!
//! Layout: `merge.rs` (the deep-merge primitive over JSON trees),
//! `resolver.rs` (the layered `ConfigResolver`), `init.rs` (companion
//! initializers planning stage/target children from effective
//! configuration), `error.rs` (`ConfigError`).

pub mod error;
pub mod init;
pub mod merge;
pub mod resolver;

pub use error::ConfigError;
pub use init::{plan_stages, plan_targets, preset_ids};
pub use merge::deep_merge;
pub use resolver::ConfigResolver;
