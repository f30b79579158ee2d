//! Pure triage logic for component-owner review assignment.
//!
//! Given an ownership table and the files changed between two commits, this
//! crate decides who should be assigned to a pull request and whose review
//! should be requested, subtracting whatever the platform already knows
//! (pending requests, submitted reviews, ignored authors). Everything here
//! is a pure function over immutable snapshots; all I/O lives in the
//! consuming binary.

pub mod config;
pub mod owner;
pub mod reconcile;
pub mod refs;
pub mod resolver;

pub use config::*;
pub use owner::*;
pub use reconcile::*;
pub use refs::*;
pub use resolver::*;
