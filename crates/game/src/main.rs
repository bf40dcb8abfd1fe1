use std::process::ExitCode;

use tracing::error;

mod app;

fn main() -> ExitCode {
    if app::wants_help(std::env::args()) {
        app::print_help();
        return ExitCode::SUCCESS;
    }
    match app::build_app() {
        Ok(wiring) => app::run(wiring),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
