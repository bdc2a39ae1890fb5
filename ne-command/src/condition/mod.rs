//! `wait_for` conditions.
//!
//! A condition compares one command output against a literal:
//! - `result[0] contains HUAWEI`
//! - `result[1] not contains Error`
//! - `result[2] ge 4`
//!
//! Parsing happens once up front; evaluation is a pure function of the
//! parsed condition and one round's [`ResponseSet`](crate::driver::ResponseSet).

mod ast;
mod evaluator;
mod parser;

pub use ast::{Condition, Operand, Operator};
pub use evaluator::evaluate;
pub use parser::{parse, parse_all};

impl std::str::FromStr for Condition {
    type Err = crate::error::ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
