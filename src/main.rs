//! imgmeta binary entry point.

use std::process::ExitCode;

use imgmeta::ui::output;

fn main() -> ExitCode {
    match imgmeta::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
