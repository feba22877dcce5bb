// SPDX-License-Identifier: Apache-2.0
//! canopy-nsedit: batch validation of scene namespace edits.
//!
//! A [`BatchNamespaceEdit`] collects proposed structural edits (moves,
//! renames, reorders, removes) and checks the whole sequence against a
//! caller-described store before anything is touched. Validation simulates
//! the edits in a virtual [`Namespace`] that tracks where each edited object
//! originally lived, which regions of the namespace have been vacated, and
//! which target sub-keys point at edited objects, so errors are reported in
//! terms the caller recognizes: original, pre-batch paths.
//!
//! ```
//! use canopy_nsedit::{BatchNamespaceEdit, NamespaceEdit};
//! use canopy_path::ScenePath;
//!
//! let mut batch = BatchNamespaceEdit::new();
//! if let Some(edit) = NamespaceEdit::rename("/World/Ball".parse()?, "Sphere") {
//!     batch.add(edit);
//! }
//! // The store knows /World and /World/Ball; the new name is free.
//! let exists = |path: &ScenePath| matches!(path.to_string().as_str(), "/" | "/World" | "/World/Ball");
//! let outcome = batch.process(exists, |_edit| Ok(()), true);
//! assert!(outcome.ok);
//! assert_eq!(outcome.processed_edits.len(), 1);
//! # Ok::<(), canopy_path::PathParseError>(())
//! ```
//!
//! # Crate Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` on the edit and report types.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod backpointer;
mod batch;
mod deadspace;
mod detail;
mod edit;
mod namespace;

pub use batch::{BatchNamespaceEdit, ProcessOutcome};
pub use detail::{BatchEditError, EditDetail, EditResult};
pub use edit::{EditIndex, NamespaceEdit};
pub use namespace::{Namespace, SimulationError};
