use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod utils;

use cmd::{ActionArgs, Globals, ScriptArgs};

/// Landscape API CLI (see cmd/{script,attachment,action}.rs)
///
/// Command layout:
///   landscape-api script create -t TITLE -c CODE [-s V1|V2]
///   landscape-api script edit|copy|remove|get|archive|redact SCRIPT_ID ...
///   landscape-api script attachment create|get|remove -s SCRIPT_ID ...
///   landscape-api action ACTION [--param KEY=VALUE ...] [--param-file FILE]
///
/// Global flags / env:
///   -v / -vv             Increase verbosity (RUST_LOG overrides)
///   -q / --quiet         Errors only
///   --base-url URL       Or LANDSCAPE_BASE_URL
///   --token TOKEN        Or LANDSCAPE_API_TOKEN (sent as a bearer token)
///   -H / --header K=V    Extra request header (repeatable)
///   --timeout SECS       Per-request timeout
///   --json               Machine-readable output
///
/// Examples:
///   landscape-api script create -t hello -c 'echo hi' -s V2
///   landscape-api script get 12 -s V1 --json
///   landscape-api script attachment create -s 12 --path ./notes.txt
///   landscape-api action copy-script --param script_id=12 --param destination_title=copy
#[derive(Parser, Debug)]
#[command(
    name = "landscape-api",
    version,
    author,
    about = "Landscape API - manage scripts and script attachments",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Landscape server base URL (or LANDSCAPE_BASE_URL env)
    #[arg(long = "base-url", global = true, value_name = "URL")]
    base_url: Option<String>,

    /// API token sent as a bearer credential (or LANDSCAPE_API_TOKEN env)
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Extra request header(s) (repeatable KEY=VALUE)
    #[arg(short = 'H', long = "header", global = true, value_name = "KEY=VALUE")]
    headers: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage and create Landscape scripts
    Script(ScriptArgs),

    /// Invoke a legacy action with free-form parameters
    Action(ActionArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let globals = Globals {
        base_url: cli.base_url,
        token: cli.token,
        headers: cli.headers,
        timeout: cli.timeout,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Script(args) => cmd::execute_script(&globals, args),
        Commands::Action(args) => cmd::execute_action(&globals, args),
    };

    if let Err(e) = result {
        // The response itself was already printed.
        if let Some(failure) = e.downcast_ref::<cmd::StatusFailure>() {
            if !globals.json {
                eprintln!("{failure}");
            }
        } else {
            cmd::output_error(globals.json, &e);
        }
        std::process::exit(1);
    }
    Ok(())
}
