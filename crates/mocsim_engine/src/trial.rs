//! The trial runner.

use crate::error::Result;
use crate::sampler;
use mocsidef::{SimulationDefinition, SimulationVariable, VariableKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::trace;

/// Runs one trial of the definition for the given seed.
///
/// A fresh ChaCha8 generator is seeded from the trial seed, every
/// variable name is bound to `0.0`, and the variables are then evaluated
/// strictly in declaration order, each overwriting its own placeholder
/// before the next begins. Expressions may therefore only see
/// earlier-declared values — a later name would still read as the
/// placeholder, which is exactly why the grammar forbids forward
/// references.
///
/// Returns the recorded variables' values. Same definition and seed
/// always produce the same mapping.
///
/// # Errors
///
/// Returns an error only on an internal inconsistency between the parsed
/// definition and the runtime mapping (see
/// [`mocsidef::Error::UnknownVariable`]).
pub fn run_trial(
    definition: &SimulationDefinition,
    seed: u64,
) -> Result<HashMap<String, f64>> {
    let mut values: HashMap<String, f64> = definition
        .variables
        .iter()
        .map(|variable| (variable.name.clone(), 0.0))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for variable in &definition.variables {
        let value = evaluate_variable(variable, &values, &mut rng)?;
        values.insert(variable.name.clone(), value);
    }

    let mut output = HashMap::new();
    for variable in definition.variables.iter().filter(|v| v.recorded) {
        let value = values
            .get(&variable.name)
            .copied()
            .ok_or_else(|| mocsidef::Error::UnknownVariable(variable.name.clone()))?;
        output.insert(variable.name.clone(), value);
    }

    trace!(seed, recorded = output.len(), "trial complete");
    Ok(output)
}

/// Evaluates one variable against the current value mapping.
///
/// Exhaustive over the closed set of variable kinds. Expression variables
/// ignore the random source.
fn evaluate_variable<R: Rng>(
    variable: &SimulationVariable,
    values: &HashMap<String, f64>,
    rng: &mut R,
) -> Result<f64> {
    match &variable.kind {
        VariableKind::Uniform { lower, upper } => {
            Ok(sampler::sample_uniform(*lower, *upper, rng))
        }
        VariableKind::Binomial {
            trials,
            success_probability,
        } => Ok(sampler::sample_binomial(*trials, *success_probability, rng)),
        VariableKind::Expression(tree) => Ok(tree.evaluate(values)?),
    }
}

/// Flattens a recorded-value mapping into a result row.
///
/// `recorded_names` must be the locally-computed recorded-variable order
/// (see [`SimulationDefinition::recorded_names`]); the row carries values
/// in exactly that order and nothing else.
///
/// # Errors
///
/// Returns an error if the mapping lacks one of the names — an internal
/// inconsistency, since the trial runner produced the mapping from the
/// same definition.
pub fn row_from_mapping(
    recorded_names: &[&str],
    mapping: &HashMap<String, f64>,
) -> Result<Vec<f64>> {
    recorded_names
        .iter()
        .map(|name| {
            mapping
                .get(*name)
                .copied()
                .ok_or_else(|| mocsidef::Error::UnknownVariable((*name).to_string()).into())
        })
        .collect()
}
