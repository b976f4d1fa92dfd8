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

//! Template matching and template lifecycle bookkeeping.
//!
//! Layout: `matcher.rs` (the pure first-match-wins predicate over a
//! recording's identity), `lifecycle.rs` (re-matching unmapped recordings
//! when templates are created and releasing recordings when templates are
//! deleted).

pub mod lifecycle;
pub mod matcher;

pub use lifecycle::{RematchOutcome, TemplateLifecycle};
pub use matcher::{find_matching_template, template_matches};
