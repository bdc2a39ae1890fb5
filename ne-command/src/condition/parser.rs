//! Condition parser.
//!
//! Grammar: `<key> [not] <operator> <value>`, split shell-style so values
//! containing spaces can be quoted:
//!
//! ```text
//! result[0] contains HUAWEI
//! result[1] not contains "Board Type"
//! result[0] matches "VRP.*V8"
//! result[2] ge 4
//! ```

use regex::RegexBuilder;

use super::ast::{Condition, Operand, Operator};
use crate::error::ConditionError;

/// The only collection a condition may reference.
const RESULT_KEY: &str = "result";

/// Parse a condition string.
pub fn parse(raw: &str) -> Result<Condition, ConditionError> {
    let syntax = |reason: &str| ConditionError::Syntax {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = shlex::split(raw).ok_or_else(|| syntax("unbalanced quotes"))?;
    if tokens.len() < 3 {
        return Err(syntax("expected '<key> <operator> <value>'"));
    }

    let value = tokens.pop().unwrap_or_default();
    let key = tokens.remove(0);

    let mut op_tokens = tokens;
    let negate = match op_tokens.iter().position(|t| t == "not") {
        Some(pos) => {
            op_tokens.remove(pos);
            true
        }
        None => false,
    };

    let op_token = match op_tokens.as_slice() {
        [op] => op.as_str(),
        [] => return Err(syntax("missing operator")),
        _ => return Err(syntax("too many operator tokens")),
    };

    // `notcontains` is shorthand for `not contains`
    let (operator, negate) = match op_token {
        "notcontains" => (Operator::Contains, !negate),
        token => {
            let operator =
                Operator::from_token(token).ok_or_else(|| ConditionError::UnknownOperator {
                    raw: raw.to_string(),
                    operator: token.to_string(),
                })?;
            (operator, negate)
        }
    };

    let (key, index) = parse_key(raw, &key)?;
    let operand = parse_operand(raw, operator, value)?;

    Ok(Condition {
        raw: raw.to_string(),
        key,
        index,
        operator,
        negate,
        operand,
    })
}

/// Parse every condition, failing on the first malformed one.
pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Condition>, ConditionError> {
    raw.iter().map(|c| parse(c.as_ref())).collect()
}

/// Split `result` / `result[N]` into key and optional index.
fn parse_key(raw: &str, key: &str) -> Result<(String, Option<usize>), ConditionError> {
    let unsupported = || ConditionError::UnsupportedKey {
        raw: raw.to_string(),
        key: key.to_string(),
    };

    let rest = key.strip_prefix(RESULT_KEY).ok_or_else(unsupported)?;
    if rest.is_empty() {
        return Ok((RESULT_KEY.to_string(), None));
    }

    let index = rest
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(unsupported)?;

    Ok((RESULT_KEY.to_string(), Some(index)))
}

fn parse_operand(raw: &str, operator: Operator, value: String) -> Result<Operand, ConditionError> {
    if operator == Operator::Matches {
        let re = RegexBuilder::new(&value)
            .multi_line(true)
            .build()
            .map_err(|source| ConditionError::InvalidPattern {
                raw: raw.to_string(),
                source,
            })?;
        return Ok(Operand::Pattern(re));
    }

    match parse_number(&value) {
        Some(number) => Ok(Operand::Number {
            value: number,
            text: value,
        }),
        None if operator.is_numeric() => Err(ConditionError::NonNumericOperand {
            raw: raw.to_string(),
            operator: operator.to_string(),
        }),
        None => Ok(Operand::Text(value)),
    }
}

/// Parse an integer or decimal literal (`42`, `-3`, `0.75`).
///
/// Exponents, `inf` and `NaN` are treated as text.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || frac.is_some_and(|f| !all_digits(f)) {
        return None;
    }

    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indexed_contains() {
        let cond = parse("result[0] contains HUAWEI").unwrap();
        assert_eq!(cond.raw(), "result[0] contains HUAWEI");
        assert_eq!(cond.key(), "result");
        assert_eq!(cond.index(), Some(0));
        assert_eq!(cond.operator(), Operator::Contains);
        assert!(!cond.is_negated());
        assert_eq!(cond.operand().as_str(), "HUAWEI");
    }

    #[test]
    fn test_parse_bare_result() {
        let cond = parse("result eq ok").unwrap();
        assert_eq!(cond.index(), None);
        assert_eq!(cond.operator(), Operator::Eq);
    }

    #[test]
    fn test_parse_not_contains() {
        let cond = parse("result[1] not contains Error").unwrap();
        assert!(cond.is_negated());
        assert_eq!(cond.operator(), Operator::Contains);
        assert_eq!(cond.index(), Some(1));
    }

    #[test]
    fn test_parse_quoted_value() {
        let cond = parse(r#"result[0] contains "Board Type""#).unwrap();
        assert_eq!(cond.operand().as_str(), "Board Type");
        // raw text is reported verbatim, quotes included
        assert_eq!(cond.raw(), r#"result[0] contains "Board Type""#);
    }

    #[test]
    fn test_parse_operator_aliases() {
        for (text, op) in [
            ("==", Operator::Eq),
            ("ne", Operator::Neq),
            ("!=", Operator::Neq),
            (">", Operator::Gt),
            (">=", Operator::Ge),
            ("<", Operator::Lt),
            ("<=", Operator::Le),
            ("contains", Operator::Contains),
            ("notcontains", Operator::Contains),
        ] {
            let cond = parse(&format!("result[0] {text} 1")).unwrap();
            assert_eq!(cond.operator(), op, "alias {text}");
        }
    }

    #[test]
    fn test_parse_notcontains() {
        let cond = parse("result[0] notcontains Error").unwrap();
        assert_eq!(cond.operator(), Operator::Contains);
        assert!(cond.is_negated());
        assert_eq!(cond.operand().as_str(), "Error");

        let cond = parse("result[0] not notcontains Error").unwrap();
        assert!(!cond.is_negated());
    }

    #[test]
    fn test_parse_numeric_operand() {
        let cond = parse("result[0] gt 2.5").unwrap();
        assert_eq!(cond.operand().as_number(), Some(2.5));
        assert_eq!(cond.operand().as_str(), "2.5");
    }

    #[test]
    fn test_parse_numeric_operator_rejects_text() {
        let err = parse("result[0] lt abc").unwrap_err();
        assert!(matches!(err, ConditionError::NonNumericOperand { .. }));
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = parse("result[0] resembles HUAWEI").unwrap_err();
        match err {
            ConditionError::UnknownOperator { operator, .. } => assert_eq!(operator, "resembles"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            parse("result[0] contains").unwrap_err(),
            ConditionError::Syntax { .. }
        ));
        assert!(matches!(parse("").unwrap_err(), ConditionError::Syntax { .. }));
    }

    #[test]
    fn test_parse_unbalanced_quotes() {
        let err = parse(r#"result[0] contains "HUAWEI"#).unwrap_err();
        assert!(matches!(err, ConditionError::Syntax { .. }));
        assert!(err.to_string().contains("result[0] contains"));
    }

    #[test]
    fn test_parse_unsupported_key() {
        for key in ["stdout[0]", "result[]", "result[x]", "result[0", "results"] {
            let err = parse(&format!("{key} contains X")).unwrap_err();
            assert!(
                matches!(err, ConditionError::UnsupportedKey { .. }),
                "key {key} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_matches_compiles_pattern() {
        let cond = parse(r"result[0] matches 'VRP.*V\d+'").unwrap();
        assert!(matches!(cond.operand(), Operand::Pattern(_)));
        assert_eq!(cond.operand().as_str(), r"VRP.*V\d+");

        let err = parse("result[0] matches (unclosed").unwrap_err();
        assert!(matches!(err, ConditionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("0.75"), Some(0.75));
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1."), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_all_stops_at_first_error() {
        let raw = ["result[0] contains A", "result[0] bogus B"];
        assert!(parse_all(&raw).is_err());
        assert_eq!(parse_all(&raw[..1]).unwrap().len(), 1);
    }
}
