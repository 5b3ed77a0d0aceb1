//! Export a Clarity PPM NSQL query to an xlsx workbook.
//!
//! ```sh
//! export NSQL_PPM_PASSWORD='...'
//! nsql-to-excel -H ppm.example.com -u admin -c PRJ001 -f "status = 'Active'"
//! ```

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use nsql_to_excel::{Pipeline, PpmCredentials, RunOptions};

/// Exit status for any failure, including bad arguments.
const EXIT_FAILURE: i32 = -1;

#[derive(Parser, Debug)]
#[command(
    name = "nsql-to-excel",
    version,
    about = "Export a Clarity PPM NSQL query to an xlsx workbook"
)]
struct Cli {
    /// PPM host, with or without scheme (e.g. ppm.example.com)
    #[arg(short = 'H', long = "ppm-host")]
    host: String,

    /// PPM user name
    #[arg(short = 'u', long = "ppm-user")]
    user: String,

    /// PPM password
    #[arg(short = 'p', long = "ppm-password", env = "NSQL_PPM_PASSWORD", hide_env_values = true)]
    password: String,

    /// NSQL query code (e.g. PRJ001)
    #[arg(short = 'c', long = "nsql-query-code")]
    query_code: String,

    /// Output workbook [default: <query code>.xlsx]
    #[arg(short = 'x', long = "xlsx-file-name")]
    output: Option<PathBuf>,

    /// NSQL filter expression
    #[arg(short = 'f', long = "filter-expression", default_value = "")]
    filter: String,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    let credentials = match PpmCredentials::try_new(cli.user, cli.password) {
        Ok(creds) => creds,
        Err(e) => {
            tracing::error!(fatal = true, error = %e, "Invalid arguments");
            process::exit(EXIT_FAILURE);
        }
    };

    let mut options =
        RunOptions::new(cli.host, credentials, cli.query_code).with_filter(cli.filter);
    if let Some(output) = cli.output {
        options = options.with_output(output);
    }

    // The pipeline logs its own terminal line.
    if Pipeline::new(options).run().await.is_err() {
        process::exit(EXIT_FAILURE);
    }
}
