//! Line-oriented definition parser.
//!
//! # Definition format
//!
//! ```text
//! # dice experiment
//! trials=1000
//! random x=Range(1,6)
//! random hits=B(10,0.5)
//! var y=x+x
//! record var z=y*2
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Everything else
//! must be a `trials=`, `random`, or `[record ]var` line. Parsing fails
//! fast on the first error.

use crate::error::{Error, Result};
use crate::expr;
use crate::model::{SimulationDefinition, SimulationVariable, VariableKind};
use tracing::debug;

/// Parses definition text into a [`SimulationDefinition`].
///
/// Carriage returns are stripped before splitting on line feeds, so CRLF
/// input parses identically to LF input.
///
/// # Errors
///
/// Returns the first [`Error`] encountered; see [`Error`] for the full
/// set of failure categories. A definition without a `trials=` line
/// fails with [`Error::MissingTrialCount`].
pub fn parse(input: &str) -> Result<SimulationDefinition> {
    let input = input.replace('\r', "");

    let mut trial_count: Option<u32> = None;
    let mut variables: Vec<SimulationVariable> = Vec::new();
    let mut declared: Vec<String> = Vec::new();

    for (index, line) in input.split('\n').enumerate() {
        let line_number = index + 1;

        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("trials=") {
            if trial_count.is_some() {
                return Err(Error::DuplicateTrialCount);
            }
            trial_count = Some(parse_trial_count(rest)?);
        } else if let Some(rest) = line.strip_prefix("random ") {
            let (name, distribution) = split_declaration(rest, line_number)?;
            ensure_undeclared(&declared, name)?;
            let kind = parse_distribution(distribution, line_number)?;
            variables.push(SimulationVariable {
                name: name.to_string(),
                recorded: false,
                kind,
            });
            declared.push(name.to_string());
        } else if let Some((recorded, rest)) = strip_var_prefix(line) {
            let (name, expression) = split_declaration(rest, line_number)?;
            ensure_undeclared(&declared, name)?;
            let tree = expr::parse(expression, &declared)?;
            variables.push(SimulationVariable {
                name: name.to_string(),
                recorded,
                kind: VariableKind::Expression(tree),
            });
            declared.push(name.to_string());
        } else {
            return Err(Error::Syntax {
                line: line_number,
                reason: "unrecognized line".to_string(),
            });
        }
    }

    let trial_count = trial_count.ok_or(Error::MissingTrialCount)?;

    debug!(
        trial_count,
        variables = variables.len(),
        "parsed simulation definition"
    );

    Ok(SimulationDefinition {
        trial_count,
        variables,
    })
}

/// Parses the value of a `trials=` line.
fn parse_trial_count(value: &str) -> Result<u32> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::MalformedTrialCount(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| Error::MalformedTrialCount(value.to_string()))
}

/// Splits `name=value` and validates the name is alphabetic.
fn split_declaration(rest: &str, line: usize) -> Result<(&str, &str)> {
    let (name, value) = rest.split_once('=').ok_or_else(|| Error::Syntax {
        line,
        reason: "expected '=' in declaration".to_string(),
    })?;

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Syntax {
            line,
            reason: format!("invalid variable name ({name})"),
        });
    }

    Ok((name, value))
}

/// Matches the `var ` / `record var ` line prefixes.
fn strip_var_prefix(line: &str) -> Option<(bool, &str)> {
    line.strip_prefix("record var ")
        .map(|rest| (true, rest))
        .or_else(|| line.strip_prefix("var ").map(|rest| (false, rest)))
}

fn ensure_undeclared(declared: &[String], name: &str) -> Result<()> {
    if declared.iter().any(|existing| existing == name) {
        Err(Error::DuplicateVariable(name.to_string()))
    } else {
        Ok(())
    }
}

/// Parses a distribution call like `Range(1,6)` or `B(10,0.5)`.
fn parse_distribution(s: &str, line: usize) -> Result<VariableKind> {
    let body = s.strip_suffix(')').ok_or_else(|| Error::Syntax {
        line,
        reason: "distribution must end with ')'".to_string(),
    })?;

    let (name, args) = body.split_once('(').ok_or_else(|| Error::Syntax {
        line,
        reason: "distribution arguments must be parenthesized".to_string(),
    })?;

    if args.contains(['(', ')']) {
        return Err(Error::Syntax {
            line,
            reason: "too many brackets in distribution".to_string(),
        });
    }

    let arguments = args
        .split(',')
        .map(|arg| {
            arg.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| Error::Syntax {
                    line,
                    reason: format!("invalid distribution argument ({arg})"),
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    match name {
        "Range" => {
            ensure_argument_count("Range", 2, arguments.len())?;
            let lower = integral_bound(arguments[0])?;
            let upper = integral_bound(arguments[1])?;
            if lower > upper {
                return Err(Error::EmptyRange { lower, upper });
            }
            Ok(VariableKind::Uniform { lower, upper })
        }
        "B" => {
            ensure_argument_count("B", 2, arguments.len())?;
            let trials = arguments[0];
            if trials.fract() != 0.0 || trials < 0.0 || trials > f64::from(u32::MAX) {
                return Err(Error::InvalidBinomialTrials(trials));
            }
            let success_probability = arguments[1];
            if !(0.0..=1.0).contains(&success_probability) {
                return Err(Error::ProbabilityOutOfRange(success_probability));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(VariableKind::Binomial {
                trials: trials as u32,
                success_probability,
            })
        }
        other => Err(Error::UnknownDistribution(other.to_string())),
    }
}

fn ensure_argument_count(
    distribution: &'static str,
    expected: usize,
    found: usize,
) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::ArgumentCount {
            distribution,
            expected,
            found,
        })
    }
}

/// Checks that a `Range` bound is integral and within `i32`.
fn integral_bound(value: f64) -> Result<i32> {
    if value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        #[allow(clippy::cast_possible_truncation)]
        Ok(value as i32)
    } else {
        Err(Error::NonIntegralBound(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryOp, ExpressionTree};

    #[test]
    fn parse_full_definition() {
        let input = "\
trials=4
random x=Range(1,6)
var y=x+x
record var z=y*2
";
        let definition = parse(input).unwrap();

        assert_eq!(definition.trial_count, 4);
        assert_eq!(definition.variables.len(), 3);

        let x = &definition.variables[0];
        assert_eq!(x.name, "x");
        assert!(!x.recorded);
        assert_eq!(x.kind, VariableKind::Uniform { lower: 1, upper: 6 });

        let y = &definition.variables[1];
        assert_eq!(y.name, "y");
        assert!(!y.recorded);

        let z = &definition.variables[2];
        assert_eq!(z.name, "z");
        assert!(z.recorded);
        assert_eq!(
            z.kind,
            VariableKind::Expression(ExpressionTree::Binary {
                op: BinaryOp::Product,
                left: Box::new(ExpressionTree::Variable("y".to_string())),
                right: Box::new(ExpressionTree::Constant(2.0)),
            })
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let input = "# heading\n\n   \ntrials=2\n# tail comment\n";
        let definition = parse(input).unwrap();
        assert_eq!(definition.trial_count, 2);
        assert!(definition.variables.is_empty());
    }

    #[test]
    fn crlf_input_parses_like_lf() {
        let definition = parse("trials=7\r\nrandom x=Range(0,1)\r\n").unwrap();
        assert_eq!(definition.trial_count, 7);
        assert_eq!(definition.variables.len(), 1);
    }

    #[test]
    fn binomial_distribution_parses() {
        let definition = parse("trials=1\nrandom h=B(10,0.5)\n").unwrap();
        assert_eq!(
            definition.variables[0].kind,
            VariableKind::Binomial {
                trials: 10,
                success_probability: 0.5,
            }
        );
    }

    #[test]
    fn missing_trial_count_fails() {
        assert_eq!(
            parse("random x=Range(1,6)\n"),
            Err(Error::MissingTrialCount)
        );
    }

    #[test]
    fn duplicate_trial_count_fails() {
        assert_eq!(
            parse("trials=1\ntrials=2\n"),
            Err(Error::DuplicateTrialCount)
        );
    }

    #[test]
    fn malformed_trial_count_fails() {
        assert_eq!(
            parse("trials=abc\n"),
            Err(Error::MalformedTrialCount("abc".to_string()))
        );
        assert!(matches!(
            parse("trials=99999999999\n"),
            Err(Error::MalformedTrialCount(_))
        ));
    }

    #[test]
    fn duplicate_variable_name_fails() {
        let input = "trials=1\nrandom x=Range(1,6)\nvar x=1+1\n";
        assert_eq!(parse(input), Err(Error::DuplicateVariable("x".to_string())));
    }

    #[test]
    fn undefined_reference_names_the_variable() {
        let input = "trials=1\nvar z=w+1\n";
        assert_eq!(parse(input), Err(Error::UndefinedVariable("w".to_string())));
    }

    #[test]
    fn forward_reference_fails() {
        let input = "trials=1\nvar a=b+1\nrandom b=Range(1,6)\n";
        assert_eq!(parse(input), Err(Error::UndefinedVariable("b".to_string())));
    }

    #[test]
    fn unknown_distribution_fails() {
        assert_eq!(
            parse("trials=1\nrandom x=Poisson(3)\n"),
            Err(Error::UnknownDistribution("Poisson".to_string()))
        );
    }

    #[test]
    fn wrong_argument_count_is_distribution_specific() {
        assert_eq!(
            parse("trials=1\nrandom x=Range(1)\n"),
            Err(Error::ArgumentCount {
                distribution: "Range",
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            parse("trials=1\nrandom x=B(10,0.5,3)\n"),
            Err(Error::ArgumentCount {
                distribution: "B",
                expected: 2,
                found: 3,
            })
        );
    }

    #[test]
    fn non_integral_range_bound_fails() {
        assert_eq!(
            parse("trials=1\nrandom x=Range(1.5,6)\n"),
            Err(Error::NonIntegralBound(1.5))
        );
    }

    #[test]
    fn inverted_range_fails() {
        assert_eq!(
            parse("trials=1\nrandom x=Range(6,1)\n"),
            Err(Error::EmptyRange { lower: 6, upper: 1 })
        );
    }

    #[test]
    fn out_of_range_probability_fails() {
        assert_eq!(
            parse("trials=1\nrandom x=B(10,1.5)\n"),
            Err(Error::ProbabilityOutOfRange(1.5))
        );
    }

    #[test]
    fn negative_binomial_trials_fail() {
        assert_eq!(
            parse("trials=1\nrandom x=B(-2,0.5)\n"),
            Err(Error::InvalidBinomialTrials(-2.0))
        );
    }

    #[test]
    fn unrecognized_line_reports_its_number() {
        let input = "trials=1\nnot a declaration\n";
        assert_eq!(
            parse(input),
            Err(Error::Syntax {
                line: 2,
                reason: "unrecognized line".to_string(),
            })
        );
    }

    #[test]
    fn reparsing_identical_text_yields_identical_checksum() {
        let input = "trials=4\nrandom x=Range(1,6)\nrecord var z=x*2\n";
        assert_eq!(parse(input).unwrap().checksum(), parse(input).unwrap().checksum());
    }

    #[test]
    fn negative_range_bounds_parse() {
        let definition = parse("trials=1\nrandom x=Range(-3,3)\n").unwrap();
        assert_eq!(
            definition.variables[0].kind,
            VariableKind::Uniform {
                lower: -3,
                upper: 3,
            }
        );
    }
}
