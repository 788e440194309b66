use std::process::ExitCode;

use fizzkit::ui::output;

fn main() -> ExitCode {
    match fizzkit::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
