//! Command execution against a device.
//!
//! [`CommandExecutor`] is the seam between the polling engine and whatever
//! actually talks to the device. [`GenericDriver`] is the SSH-backed
//! implementation used by the `ne-command` binary.

mod builder;
mod generic;
pub(crate) mod response;

pub use builder::DriverBuilder;
pub use generic::GenericDriver;
pub use response::{Response, ResponseSet};

use std::future::Future;

use crate::command::Command;
use crate::error::Result;

/// Runs a batch of commands and returns their outputs in the same order.
///
/// Session handling, authentication and prompt/answer interaction are the
/// implementor's concern. Any error aborts the polling run.
pub trait CommandExecutor: Send {
    /// Execute every command in order.
    fn execute(&mut self, commands: &[Command]) -> impl Future<Output = Result<ResponseSet>> + Send;
}

impl<E: CommandExecutor> CommandExecutor for &mut E {
    fn execute(&mut self, commands: &[Command]) -> impl Future<Output = Result<ResponseSet>> + Send {
        (**self).execute(commands)
    }
}
