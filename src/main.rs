// src/main.rs

use std::process::ExitCode;

use parmake::errors::ParmakeError;
use parmake::{cli, logging, run};

fn main() -> ExitCode {
    match run_main() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            report_error(&err);
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2))
        }
    }
}

/// Returns whether every goal was built successfully.
fn run_main() -> Result<bool, ParmakeError> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let report = run(&args)?;
    Ok(report.succeeded())
}

fn report_error(err: &ParmakeError) {
    match err {
        ParmakeError::Syntax { .. } => eprintln!("{err}.  Stop."),
        ParmakeError::ReadMakefile { .. } | ParmakeError::IoError(_) | ParmakeError::Other(_) => {
            eprintln!("parmake: {err:#}")
        }
        _ => eprintln!("parmake: *** {err}.  Stop."),
    }
}
