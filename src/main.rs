use std::process::ExitCode;

fn main() -> ExitCode {
    match branchwork::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            branchwork::ui::output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
