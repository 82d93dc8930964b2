//! Connector registration CLI
//!
//! Registers the connector application on every digitalSTROM account listed
//! in a `;`-delimited file and writes `tokens.json` and `report.log` to the
//! working directory.
//!
//! # Usage
//!
//! ```bash
//! ds-connector-registration [accounts.csv]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: verbosity of `debug.log` (default `info`)

use ds_connector_registration::config::DEFAULT_INPUT;
use ds_connector_registration::{
    init_file_logger, BatchError, BatchRunner, Config, DigitalStromClient, LogDiagnostics,
    Result, RunSummary,
};
use std::env;
use std::io;
use std::process;

fn main() {
    let config = Config::from_args(env::args());

    if let Err(e) = run(config) {
        println!("{}", e);
        if matches!(e, BatchError::FileOpen { .. }) {
            println!(
                "Either name your input file {} and run the program without arguments or pass the file name as argument.",
                DEFAULT_INPUT
            );
        }
        println!("Program stopped");
        process::exit(1);
    }
}

fn run(config: Config) -> Result<RunSummary> {
    init_file_logger(&config.log_path)?;

    let client = DigitalStromClient::new()?;
    let runner = BatchRunner::new(config, client, LogDiagnostics);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    runner.run(&mut handle)
}
