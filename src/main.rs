use anyhow::Result;
use clap::Parser;
use colored::Colorize;
mod config;
mod digest;
mod error;
mod http_verifier;
mod key;
mod parse;
mod request;
mod response;
mod service;
mod signing_string;
mod verifier;

use config::Config;
use http_verifier::Verdict;
use service::Service;

#[macro_use]
extern crate log;

/// Fetch a resource from the Keygen API and print it only if the response
/// signature checks out.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Account scoped route, e.g. `licenses?limit=5`
    #[arg(default_value = "")]
    route: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let service = Service::new(Config::new()?)?;
    let fetched = service.fetch(&cli.route)?;
    let status = fetched.response.status;

    let doc = match service.authenticator.authenticate(
        fetched.method,
        &fetched.request_target,
        fetched.response,
    ) {
        Verdict::Verified(doc) => doc,
        Verdict::Rejected(reason) => {
            eprintln!("{}", format!("Signature did not match: {}", reason).red());
            std::process::exit(1);
        }
    };

    if let Some(errors) = doc.errors_pretty()? {
        info!("api returned errors with status {}", status);
        eprintln!("{}", errors.red());
        std::process::exit(1);
    }

    println!("{}", doc.payload_pretty()?.green());
    Ok(())
}
