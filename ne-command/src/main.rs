//! `ne-command`: run commands on a Huawei VRP device and wait for conditions.
//!
//! Reads the JSON module arguments from a file or stdin, prints the JSON
//! result on stdout and exits non-zero when the result is a failure.
//!
//! ```bash
//! echo '{"commands": "display version", "wait_for": "result[0] contains HUAWEI",
//!        "provider": {"host": "192.0.2.1", "username": "admin", "password": "secret"}}' \
//!   | RUST_LOG=debug ne-command
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};

use ne_command::error::ConfigError;
use ne_command::{ModuleArgs, ModuleResult};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON arguments file; stdin when omitted
    args_file: Option<PathBuf>,
}

fn load_args(cli: &Cli) -> ne_command::Result<ModuleArgs> {
    match &cli.args_file {
        Some(path) => {
            let file = File::open(path).map_err(ConfigError::from)?;
            ModuleArgs::from_reader(BufReader::new(file))
        }
        None => ModuleArgs::from_reader(io::stdin().lock()),
    }
}

async fn execute(cli: &Cli) -> ModuleResult {
    let mut args = match load_args(cli) {
        Ok(args) => args,
        Err(e) => return ModuleResult::failure(&e, Vec::new()),
    };

    // conditions are checked before anything touches the device
    let invocation = match args.prepare() {
        Ok(invocation) => invocation,
        Err(e) => return ModuleResult::failure(&e, Vec::new()),
    };
    let warnings = invocation.warnings().to_vec();

    let driver = args
        .provider
        .take()
        .ok_or_else(|| {
            ne_command::Error::from(ConfigError::Invalid {
                message: "provider.host is required".to_string(),
            })
        })
        .and_then(|provider| provider.into_driver());
    let mut driver = match driver {
        Ok(driver) => driver,
        Err(e) => return ModuleResult::failure(&e, warnings),
    };

    if let Err(e) = driver.open().await {
        return ModuleResult::failure(&e, warnings);
    }

    let result = invocation.run(&mut driver).await;

    if let Err(e) = driver.close().await {
        warn!("error closing session: {}", e);
    }
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = execute(&cli).await;

    match result.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("failed to serialize result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
