//! Batch runner: input file in, one registration per account, both exports out.
//!
//! The run has two phases with different failure policies:
//!
//! - **Loading** is all-or-nothing. A missing file, a wrong header or a
//!   malformed row aborts before anything is registered or written.
//! - **Registering and exporting** never aborts. A failed registration is
//!   recorded on its account, and a failed export is reported without
//!   stopping the other export.
//!
//! Accounts are registered strictly one after the other, in file order.

use crate::account::AccountRecord;
use crate::client::Registrar;
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{BatchError, Result};
use crate::export::{export_report, export_tokens};
use crate::parser::read_accounts;
use std::fmt;
use std::fs::File;
use std::io::Write;

/// Counts from a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of accounts read from the input.
    pub total: usize,

    /// Accounts that received a token.
    pub succeeded: usize,

    /// Accounts whose registration failed.
    pub failed: usize,

    /// Exports that could not be written.
    pub export_failures: Vec<BatchError>,
}

impl RunSummary {
    fn from_records(records: &[AccountRecord]) -> Self {
        let succeeded = records.iter().filter(|r| r.succeeded()).count();
        RunSummary {
            total: records.len(),
            succeeded,
            failed: records.len() - succeeded,
            export_failures: Vec::new(),
        }
    }
}

/// Drives a run with an injected registrar and diagnostics sink.
pub struct BatchRunner<R, D> {
    config: Config,
    registrar: R,
    diagnostics: D,
}

impl<R: Registrar, D: Diagnostics> BatchRunner<R, D> {
    /// Creates a runner for `config`.
    pub fn new(config: Config, registrar: R, diagnostics: D) -> Self {
        BatchRunner {
            config,
            registrar,
            diagnostics,
        }
    }

    /// Executes a full run, writing a progress transcript to `console`.
    ///
    /// Returns an error only for structural input problems, in which case no
    /// registration was attempted and no output file was touched.
    pub fn run<W: Write>(&self, console: &mut W) -> Result<RunSummary> {
        self.echo(console, format_args!("\n"));
        self.echo(
            console,
            format_args!(
                "This program will register the application '{}' on all accounts given in the file {}.\n\n",
                self.config.app_name,
                self.config.input_path.display()
            ),
        );

        let records = self.load_accounts(console)?;
        self.echo(
            console,
            format_args!(
                "\nFound {} rows with account data.\n\nWill now continue with registration:\n",
                records.len()
            ),
        );

        let records = self.register_all(records, console);
        let mut summary = RunSummary::from_records(&records);
        self.diagnostics.info(&format!(
            "registration finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        ));

        self.echo(
            console,
            format_args!(
                "\nExporting links and application tokens to file '{}'  ....",
                self.config.export_path.display()
            ),
        );
        match export_tokens(&records, &self.config.export_path, &self.diagnostics) {
            Ok(_) => self.echo(console, format_args!("OK\n")),
            Err(e) => {
                self.report_export_failure(&e, console);
                summary.export_failures.push(e);
            }
        }

        self.echo(
            console,
            format_args!(
                "Exporting success report to file '{}'  ..................",
                self.config.report_path.display()
            ),
        );
        match export_report(&records, &self.config.report_path, &self.diagnostics) {
            Ok(()) => self.echo(console, format_args!("OK\n")),
            Err(e) => {
                self.report_export_failure(&e, console);
                summary.export_failures.push(e);
            }
        }

        self.echo(console, format_args!("Program finished.\n\n"));
        Ok(summary)
    }

    /// Opens the input file and parses all accounts.
    pub fn load_accounts<W: Write>(&self, console: &mut W) -> Result<Vec<AccountRecord>> {
        let path = &self.config.input_path;
        self.echo(console, format_args!("Reading file {}  ... ", path.display()));
        self.diagnostics
            .info(&format!("reading file {}", path.display()));

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                let err = BatchError::FileOpen {
                    path: path.clone(),
                    source,
                };
                self.diagnostics.error(&err.to_string());
                self.echo(console, format_args!("ERROR\n"));
                return Err(err);
            }
        };
        self.echo(console, format_args!("OK\n"));

        read_accounts(file, &self.diagnostics).map_err(|e| {
            self.diagnostics.error(&format!("{}, program aborted", e));
            e
        })
    }

    /// Registers every account in order, printing one progress line each.
    pub fn register_all<W: Write>(
        &self,
        records: Vec<AccountRecord>,
        console: &mut W,
    ) -> Vec<AccountRecord> {
        let total = records.len();
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                self.echo(
                    console,
                    format_args!(
                        "   {}/{}  registering application '{}' at {} .... ",
                        i + 1,
                        total,
                        self.config.app_name,
                        record.endpoint
                    ),
                );
                let record = self.register_one(record);
                let status = if record.succeeded() { "OK" } else { "ERROR" };
                self.echo(console, format_args!("{}\n", status));
                record
            })
            .collect()
    }

    /// Calls the registrar exactly once and returns the finished record.
    pub fn register_one(&self, record: AccountRecord) -> AccountRecord {
        self.diagnostics.info(&format!(
            "registering application '{}' at {}",
            self.config.app_name, record.endpoint
        ));

        let result = self.registrar.register(
            &record.endpoint,
            &record.user,
            &record.secret,
            &self.config.app_name,
        );
        let record = match result {
            Ok(token) => record.succeed(token),
            Err(e) => record.fail(e.to_string()),
        };

        if !record.succeeded() {
            self.diagnostics.error(&format!(
                "registration at {} marked as failed: {}",
                record.endpoint,
                record.failure_reason()
            ));
        }
        record
    }

    fn report_export_failure<W: Write>(&self, err: &BatchError, console: &mut W) {
        self.diagnostics.error(&err.to_string());
        self.echo(console, format_args!("ERROR ({})\n", err));
    }

    /// Writes to the console. A broken console must not interrupt a run
    /// that has already started registering, so failures are only logged.
    fn echo<W: Write>(&self, console: &mut W, text: fmt::Arguments<'_>) {
        if let Err(e) = console.write_fmt(text).and_then(|_| console.flush()) {
            self.diagnostics
                .error(&format!("unable to write to console: {}", e));
        }
    }
}
