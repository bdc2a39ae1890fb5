//! Condition evaluator.

use super::ast::{Condition, Operand, Operator};
use super::parser::parse_number;
use crate::driver::ResponseSet;
use crate::error::EvalError;

/// Evaluate a condition against one round's outputs.
///
/// `result` without an index selects the first output.
pub fn evaluate(condition: &Condition, responses: &ResponseSet) -> Result<bool, EvalError> {
    let index = condition.index.unwrap_or(0);
    let output = responses
        .get(index)
        .ok_or_else(|| EvalError::IndexOutOfRange {
            raw: condition.raw.clone(),
            index,
            len: responses.len(),
        })?;

    let outcome = compare(condition, output)?;
    Ok(outcome != condition.negate)
}

fn compare(condition: &Condition, output: &str) -> Result<bool, EvalError> {
    let operand = &condition.operand;
    match condition.operator {
        Operator::Eq => Ok(values_equal(output, operand)),
        Operator::Neq => Ok(!values_equal(output, operand)),
        Operator::Contains => Ok(output.contains(operand.as_str())),
        Operator::Matches => Ok(match operand {
            Operand::Pattern(re) => re.is_match(output),
            other => output.contains(other.as_str()),
        }),
        Operator::Gt => compare_numbers(condition, output, |a, b| a > b),
        Operator::Ge => compare_numbers(condition, output, |a, b| a >= b),
        Operator::Lt => compare_numbers(condition, output, |a, b| a < b),
        Operator::Le => compare_numbers(condition, output, |a, b| a <= b),
    }
}

fn values_equal(output: &str, operand: &Operand) -> bool {
    let output = output.trim();
    match (parse_number(output), operand.as_number()) {
        (Some(left), Some(right)) => left == right,
        _ => output == operand.as_str(),
    }
}

fn compare_numbers<F>(condition: &Condition, output: &str, cmp: F) -> Result<bool, EvalError>
where
    F: Fn(f64, f64) -> bool,
{
    let trimmed = output.trim();
    let left = parse_number(trimmed).ok_or_else(|| EvalError::NotNumeric {
        raw: condition.raw.clone(),
        value: trimmed.to_string(),
    })?;
    // parse() rejects numeric operators without a numeric operand
    let right = condition.operand.as_number().unwrap_or(f64::NAN);
    Ok(cmp(left, right))
}
