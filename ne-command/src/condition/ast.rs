//! Parsed form of a `wait_for` condition.

use std::fmt;

use regex::Regex;

/// Comparison applied between the selected output and the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    Matches,
}

impl Operator {
    /// Look up an operator by any of its spellings.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "eq" | "==" => Operator::Eq,
            "neq" | "ne" | "!=" => Operator::Neq,
            "gt" | ">" => Operator::Gt,
            "ge" | ">=" => Operator::Ge,
            "lt" | "<" => Operator::Lt,
            "le" | "<=" => Operator::Le,
            "contains" => Operator::Contains,
            "matches" => Operator::Matches,
            _ => return None,
        };
        Some(op)
    }

    /// Whether both sides must be numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Contains => "contains",
            Operator::Matches => "matches",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Any value that is not a number.
    Text(String),
    /// A number; `text` keeps the spelling as written.
    Number { value: f64, text: String },
    /// Compiled pattern for `matches`.
    Pattern(Regex),
}

impl Operand {
    /// The operand as written in the condition.
    pub fn as_str(&self) -> &str {
        match self {
            Operand::Text(text) | Operand::Number { text, .. } => text,
            Operand::Pattern(re) => re.as_str(),
        }
    }

    /// Numeric value, if the operand is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// A parsed condition such as `result[0] contains HUAWEI`.
///
/// The raw text is kept so unsatisfied conditions can be reported verbatim.
#[derive(Debug, Clone)]
pub struct Condition {
    pub(crate) raw: String,
    pub(crate) key: String,
    pub(crate) index: Option<usize>,
    pub(crate) operator: Operator,
    pub(crate) negate: bool,
    pub(crate) operand: Operand,
}

impl Condition {
    /// The condition exactly as the caller wrote it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Name of the referenced result collection (always `result`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Selected output, `None` for a bare `result`.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Whether the comparison outcome is inverted (`not`).
    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// The right-hand side.
    pub fn operand(&self) -> &Operand {
        &self.operand
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
