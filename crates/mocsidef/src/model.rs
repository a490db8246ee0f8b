//! Typed simulation model.
//!
//! A parsed definition is immutable: the server and every client parse
//! their own copy and must arrive at identical variable ordering and an
//! identical checksum without negotiating either.

use crate::expr::ExpressionTree;
use serde::{Deserialize, Serialize};

/// A parsed simulation definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefinition {
    /// Total number of trials to run.
    pub trial_count: u32,
    /// The simulation variables, in declaration order.
    ///
    /// The order is significant: it fixes evaluation order, and —
    /// filtered to recorded variables — the column order of result rows.
    pub variables: Vec<SimulationVariable>,
}

/// A single simulation variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationVariable {
    /// The variable's name, unique within a definition.
    pub name: String,
    /// Whether the value is included in the per-trial output row.
    pub recorded: bool,
    /// How the value is produced each trial.
    pub kind: VariableKind,
}

/// The ways a variable can produce one value per trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableKind {
    /// One integer drawn uniformly from an inclusive range.
    Uniform {
        /// Inclusive lower bound.
        lower: i32,
        /// Inclusive upper bound.
        upper: i32,
    },
    /// A draw from a binomial distribution.
    Binomial {
        /// Number of Bernoulli trials.
        trials: u32,
        /// Success probability, in `[0, 1]`.
        success_probability: f64,
    },
    /// A value computed from earlier-declared variables.
    Expression(ExpressionTree),
}

impl SimulationDefinition {
    /// Derives the one-byte consistency checksum for this definition.
    ///
    /// The value is a wrapping byte sum of the trial count, every
    /// variable name's bytes, and a `1` per recorded flag. It is a cheap
    /// consistency token for the wire handshake, not an equality proof:
    /// collisions are possible and accepted.
    pub fn checksum(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let mut value = self.trial_count as u8;

        for variable in &self.variables {
            for byte in variable.name.bytes() {
                value = value.wrapping_add(byte);
            }
            if variable.recorded {
                value = value.wrapping_add(1);
            }
        }

        value
    }

    /// Names of the recorded variables, in declaration order.
    ///
    /// This filtered order is the result-row column order. Both ends of
    /// the wire compute it independently and never transmit it.
    pub fn recorded_names(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|variable| variable.recorded)
            .map(|variable| variable.name.as_str())
            .collect()
    }
}
