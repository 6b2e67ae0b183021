use std::process::ExitCode;

fn main() -> ExitCode {
    ipmes_cli::run()
}
