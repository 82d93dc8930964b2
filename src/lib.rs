//! # ds-connector-registration
//!
//! Registers one application on a batch of digitalSTROM accounts and exports
//! the issued tokens.
//!
//! ## Pipeline
//!
//! - **Parsing**: `link;user;secret` header, then one `;`-delimited account per line
//! - **Registration**: one remote call per account, strictly sequential;
//!   a failure is recorded on the account and the batch continues
//! - **Export**: `tokens.json` with the successful accounts, `report.log`
//!   with one line per account in input order
//!
//! ## Example
//!
//! ```no_run
//! use ds_connector_registration::{BatchRunner, Config, DigitalStromClient, LogDiagnostics};
//!
//! let client = DigitalStromClient::new().unwrap();
//! let runner = BatchRunner::new(Config::default(), client, LogDiagnostics);
//! let summary = runner.run(&mut std::io::stdout()).unwrap();
//! println!("{} of {} accounts registered", summary.succeeded, summary.total);
//! ```

pub mod account;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod parser;
pub mod runner;

pub use account::{AccountRecord, Outcome};
pub use client::{DigitalStromClient, Registrar, APP_NAME};
pub use config::Config;
pub use diagnostics::{init_file_logger, Diagnostics, LogDiagnostics};
pub use error::{BatchError, RegistrationError, Result};
pub use export::{export_report, export_tokens, ExportEntry};
pub use parser::{parse_row, read_accounts, validate_header, EXPECTED_HEADER};
pub use runner::{BatchRunner, RunSummary};
