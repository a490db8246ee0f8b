//! Work-distribution and result-collection protocol for MoCSim.
//!
//! Two independent TCP services, both speaking fixed-size little-endian
//! binary fields:
//!
//! - **Distribution** hands a 4-byte job index to each client whose
//!   one-byte definition checksum matches the server's.
//! - **Collection** receives batches of result rows (a one-byte row
//!   count, then 8-byte doubles) until the expected total arrives.
//!
//! Correctness rests on both ends parsing the same definition text:
//! variable order, recorded-column order, and the checksum are computed
//! independently on each side and never negotiated.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod codec;
pub mod collection;
pub mod config;
pub mod distribution;
pub mod error;
pub mod server;

pub use client::run_client;
pub use config::{WireConfig, COLLECTION_PORT, DISTRIBUTION_PORT};
pub use error::{Error, Result};
pub use server::run_server;
