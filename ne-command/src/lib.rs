//! # ne-command
//!
//! Run CLI commands on Huawei VRP network elements and wait until their
//! output satisfies a set of conditions.
//!
//! Each polling round sends the whole command batch, then tests every
//! outstanding condition (`result[0] contains HUAWEI`, `result[1] ge 3`,
//! `result[0] not matches '^Error'`) against the fresh outputs. The run
//! succeeds once the match policy holds, or fails when the retry budget
//! is spent and reports which conditions never held.
//!
//! ## Features
//!
//! - Condition parser and evaluator with text, numeric and regex operators
//! - `all`/`any` match policies with a bounded retry budget
//! - Transport-agnostic core behind [`CommandExecutor`]
//! - Async SSH driver via russh with a built-in Huawei VRP platform
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use ne_command::{Command, DriverBuilder, MatchPolicy, PollBudget, WaitFor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ne_command::Error> {
//!     let wait_for = WaitFor::parse(
//!         &["result[0] contains HUAWEI"],
//!         MatchPolicy::All,
//!         PollBudget::new(5, Duration::from_secs(2)),
//!     )?;
//!
//!     let mut driver = DriverBuilder::new("192.0.2.1")
//!         .username("admin")
//!         .password("secret")
//!         .build()?;
//!     driver.open().await?;
//!
//!     let outcome = wait_for
//!         .run(&[Command::new("display version")], &mut driver)
//!         .await?;
//!     println!("{}", &outcome.responses[0]);
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod command;
pub mod condition;
pub mod driver;
pub mod error;
pub mod params;
pub mod platform;
pub mod poll;
pub mod transport;

pub use command::Command;
pub use condition::Condition;
pub use driver::{CommandExecutor, DriverBuilder, GenericDriver, Response, ResponseSet};
pub use error::{Error, ErrorKind, Result};
pub use params::{ModuleArgs, ModuleResult};
pub use platform::PlatformDefinition;
pub use poll::{MatchPolicy, PollBudget, PollOutcome, WaitFor, run};
pub use transport::{AuthMethod, SshConfig};
