pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ipmes_core::config::{AppConfig, LoadOptions, LogFormat};
use ipmes_core::domain::approval::ApprovalAction;

use crate::commands::session::LoginMethod;
use crate::commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "ipmes",
    about = "IPMES admin client",
    long_about = "Review payment requests, manage request photos, export reports, and inspect client configuration against an IPMES backend.",
    after_help = "Examples:\n  ipmes login --username akinyi --password '...'\n  ipmes payments list --project 3\n  ipmes payments approve 5 --notes 'site verified'\n  ipmes export payment-requests --format pdf --out ./reports"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, the stored session and API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Sign in and store the session token")]
    Login(LoginArgs),
    #[command(about = "Clear the stored session token")]
    Logout,
    #[command(about = "Show the signed-in user and their privileges")]
    Whoami,
    #[command(subcommand, about = "List, inspect and act on payment requests")]
    Payments(PaymentsCommand),
    #[command(subcommand, about = "Manage payment request photos")]
    Photos(PhotosCommand),
    #[command(about = "Export a report to a file")]
    Export {
        #[arg(help = "Report name, e.g. payment-requests or projects")]
        report: String,
        #[arg(long, default_value = "xlsx", help = "xlsx or pdf")]
        format: String,
        #[arg(long, default_value = ".", help = "Directory to write the file into")]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
struct LoginArgs {
    #[arg(long, conflicts_with = "token", requires = "password")]
    username: Option<String>,
    #[arg(long, conflicts_with = "token", requires = "username")]
    password: Option<String>,
    #[arg(long, help = "Store an already issued token instead of signing in")]
    token: Option<String>,
}

#[derive(Debug, Args)]
struct ActionArgs {
    #[arg(help = "Payment request id")]
    id: i64,
    #[arg(long, help = "Reviewer notes; required to reject or return")]
    notes: Option<String>,
    #[arg(long, help = "User id to assign the request to")]
    assign_to: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum PaymentsCommand {
    #[command(about = "List payment requests, optionally for one project")]
    List {
        #[arg(long)]
        project: Option<i64>,
    },
    #[command(about = "Show a request with its approval history")]
    Show { id: i64 },
    #[command(about = "Approve a request at its current level")]
    Approve(ActionArgs),
    #[command(about = "Reject a request")]
    Reject(ActionArgs),
    #[command(about = "Return a request for correction")]
    Return(ActionArgs),
}

#[derive(Debug, Subcommand)]
enum PhotosCommand {
    #[command(about = "Move one photo to a new position")]
    Reorder {
        #[arg(help = "Payment request id")]
        request: i64,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Config => CommandResult { exit_code: 0, output: commands::config::run() },
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Login(args) => match login_method(args) {
            Some(method) => commands::session::login(method),
            None => CommandResult::failure(
                "login",
                "invalid_argument",
                "pass either --token or both --username and --password",
                8,
            ),
        },
        Command::Logout => commands::session::logout(),
        Command::Whoami => commands::session::whoami(),
        Command::Payments(command) => match command {
            PaymentsCommand::List { project } => commands::payments::list(project),
            PaymentsCommand::Show { id } => commands::payments::show(id),
            PaymentsCommand::Approve(args) => act(ApprovalAction::Approve, args),
            PaymentsCommand::Reject(args) => act(ApprovalAction::Reject, args),
            PaymentsCommand::Return(args) => act(ApprovalAction::ReturnedForCorrection, args),
        },
        Command::Photos(PhotosCommand::Reorder { request, from, to }) => {
            commands::photos::reorder(request, from, to)
        }
        Command::Export { report, format, out } => commands::export::run(&report, &format, out),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn act(action: ApprovalAction, args: ActionArgs) -> CommandResult {
    commands::payments::act(args.id, action, args.notes, args.assign_to)
}

fn login_method(args: LoginArgs) -> Option<LoginMethod> {
    match (args.token, args.username, args.password) {
        (Some(token), None, None) => Some(LoginMethod::Token(token)),
        (None, Some(username), Some(password)) => {
            Some(LoginMethod::Credentials { username, password })
        }
        _ => None,
    }
}

/// Logs go to stderr so stdout stays a single JSON payload. Falls back to
/// compact `warn` output when the configuration does not load; the command
/// itself reports that failure.
fn init_logging() {
    use tracing::Level;

    let (log_level, format) = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::INFO),
            config.logging.format,
        ),
        Err(_) => (Level::WARN, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);
    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{login_method, Cli, Command, LoginArgs, PaymentsCommand};
    use crate::commands::session::LoginMethod;

    #[test]
    fn return_subcommand_parses_notes() {
        let cli = Cli::try_parse_from(["ipmes", "payments", "return", "5", "--notes", "fix invoice"])
            .expect("parses");
        let Command::Payments(PaymentsCommand::Return(args)) = cli.command else {
            panic!("expected payments return");
        };
        assert_eq!(args.id, 5);
        assert_eq!(args.notes.as_deref(), Some("fix invoice"));
    }

    #[test]
    fn token_and_password_cannot_be_combined() {
        let parsed =
            Cli::try_parse_from(["ipmes", "login", "--token", "a.b.c", "--username", "akinyi"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn login_needs_token_or_full_credentials() {
        assert!(login_method(LoginArgs { username: None, password: None, token: None }).is_none());
        assert!(matches!(
            login_method(LoginArgs {
                username: Some("akinyi".into()),
                password: Some("pw".into()),
                token: None,
            }),
            Some(LoginMethod::Credentials { .. })
        ));
    }

    #[test]
    fn export_defaults_to_xlsx_in_working_directory() {
        let cli = Cli::try_parse_from(["ipmes", "export", "projects"]).expect("parses");
        let Command::Export { format, out, .. } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(format, "xlsx");
        assert_eq!(out, std::path::PathBuf::from("."));
    }
}
