#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "fnchain: serialize function deployments through synthetic dependencies",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Suppress the report; errors are still printed.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root holding the backend config and function directories.
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Chain dependency-free functions",
        long_about = "Add synthetic function dependencies until the requested share of functions \
                      sits in a dependency chain, verify the result has no cycle, write the backend \
                      config, and add the matching template parameters.",
        after_help = "EXAMPLES:\n    # Chain every function\n    fnchain serialize\n\n    # Chain half of them, preview only\n    fnchain serialize --serialization 50 --dry-run\n\n    # Emit machine-readable output\n    fnchain serialize --format json"
    )]
    Serialize(cmd::serialize::SerializeArgs),

    #[command(
        about = "Check the function graph for cycles",
        long_about = "Report the first dependency cycle and every cycle group without writing anything.",
        after_help = "EXAMPLES:\n    # Check the default backend config\n    fnchain check\n\n    # Check another file\n    fnchain check --config amplify/backend/backend-config.json"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    fnchain completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FNCHAIN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "fnchain=debug,info"
        } else {
            "fnchain=info,warn"
        })
    });

    let format = env::var("FNCHAIN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = match cli.root {
        Some(ref root) => root.clone(),
        None => env::current_dir()?,
    };
    let output = cli.output_mode();
    debug!(root = %project_root.display(), ?output, "starting");

    match cli.command {
        Commands::Serialize(ref args) => {
            cmd::serialize::run_serialize(args, output, cli.quiet, &project_root)
        }
        Commands::Check(ref args) => cmd::check::run_check(args, output, cli.quiet, &project_root),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
