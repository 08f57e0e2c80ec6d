//! webget - fetch a single URL and print the response

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webget_net::{FetchError, HttpClient, Response};

/// Fetch a single http or https URL and print the body
#[derive(Debug, Parser)]
#[command(name = "webget", version)]
struct Cli {
    /// Print the whole message: status line, headers and body
    #[arg(short = 'f', long)]
    full: bool,

    /// Accept any server certificate
    #[arg(short = 'k', long)]
    insecure: bool,

    /// URL to fetch
    url: String,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let client = HttpClient::builder()
        .verify_certificate(!cli.insecure)
        .build();

    match client.get_response(&cli.url) {
        Ok(response) => match print_response(&response, cli.full) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            report_failure(&cli.url, &e);
            ExitCode::FAILURE
        }
    }
}

fn print_response(response: &Response, full: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if full {
        response.write_message(&mut out)?;
        out.write_all(b"\n")?;
    } else {
        out.write_all(&response.body)?;
    }
    out.flush().context("failed to write response to stdout")
}

fn report_failure(url: &str, err: &FetchError) {
    eprintln!("Failed to get '{}': {} [{}]", url, err, err.failure());
}
