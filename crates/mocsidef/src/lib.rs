//! MoCSiDeF simulation-definition language for MoCSim.
//!
//! This crate provides:
//! - Line-oriented definition parsing with fail-fast validation
//! - A typed simulation model (trial count + ordered variables)
//! - A restricted arithmetic expression engine with strict
//!   left-to-right evaluation (no precedence, no grouping)
//! - The one-byte definition checksum used by the wire handshake
//!
//! # Example
//!
//! ```rust
//! let input = "\
//! trials=4
//! random x=Range(1,6)
//! var y=x+x
//! record var z=y*2
//! ";
//!
//! let definition = mocsidef::parse(input).unwrap();
//! assert_eq!(definition.trial_count, 4);
//! assert_eq!(definition.recorded_names(), vec!["z"]);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod expr;
pub mod model;
pub mod parser;

pub use error::{Error, Result};
pub use expr::{BinaryOp, ExpressionTree};
pub use model::{SimulationDefinition, SimulationVariable, VariableKind};
pub use parser::parse;
