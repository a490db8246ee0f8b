//! Aggregate statistics over collected simulation rows.
//!
//! This crate turns the server's collected result rows into a
//! per-variable statistical summary (mean, variance, mode, quartiles)
//! and renders it as the text report the operator sees. It is plain
//! post-processing: nothing here touches the definition language or the
//! wire protocol beyond sharing the recorded-variable column order.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod summary;

pub use summary::{Report, Summary, VariableSummary};
