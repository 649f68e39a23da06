use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use rs_rag_cli::cli::{Cli, run, usage};
use rs_rag_cli::{ClientConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("rs_rag_cli=warn");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if !cli.has_work() {
        eprintln!("{}", usage());
        return ExitCode::FAILURE;
    }

    match run(&cli, ClientConfig::from_env(), &mut std::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
