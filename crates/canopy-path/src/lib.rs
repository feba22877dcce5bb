// SPDX-License-Identifier: Apache-2.0
//! canopy-path: hierarchical scene namespace paths.
//!
//! A [`ScenePath`] addresses an object in a slash-style scene namespace:
//! prim components (`/World/Ball`), a property component (`/World.xform`),
//! and target components carrying another path as a sub-key
//! (`/Rig.targets[/World/Ball]`), optionally followed by further property
//! components for relational attributes (`/Rig.targets[/World/Ball].weight`).
//!
//! # Ordering
//!
//! Paths carry a total order: lexicographic over components, with components
//! ordered by (discriminant, payload). Two consequences the rest of canopy
//! relies on:
//!
//! - every ancestor sorts before all of its descendants, and
//! - the descendants of any path form a contiguous range.
//!
//! Ordered containers keyed by `ScenePath` therefore answer "all entries at
//! or under prefix P" with a range scan.
//!
//! # Crate Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` on the path types.
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

mod component;
mod parse;
mod path;

pub use component::PathComponent;
pub use parse::PathParseError;
pub use path::ScenePath;
