//! Print the OpenAPI document as JSON, or write it to a file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rest_auth::doc::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Emit the rest-auth OpenAPI document",
    version
)]
struct CliArgs {
    /// Write the document here instead of stdout.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(err) => {
            eprintln!("failed to serialise OpenAPI document: {err}");
            return ExitCode::FAILURE;
        }
    };
    match args.output {
        Some(path) => match fs::write(&path, json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("failed to write {}: {err}", path.display());
                ExitCode::FAILURE
            }
        },
        None => {
            println!("{json}");
            ExitCode::SUCCESS
        }
    }
}
