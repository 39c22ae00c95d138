use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod context;
mod format;
mod logging;

/// regscan - Remote Container Registry Scanner
///
/// Enumerates the images hosted in cloud container registries, logs the
/// local container engine in, and pulls the selected images.
#[derive(Parser, Debug)]
#[command(name = "regscan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,

    /// Configuration file
    #[arg(short, long, global = true, env = config::CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Check that each enabled backend's tooling is installed
    Check {
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Log the container engine in to the configured registries
    Login {
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// List the images hosted in the configured registries
    #[command(visible_alias = "ls")]
    List {
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Print pull references only
        #[arg(short, long)]
        quiet: bool,
    },
    /// Pull the selected images into the local engine
    Pull {
        /// Remove the pulled images again afterwards
        #[arg(long)]
        remove: bool,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Display the effective configuration
    Show {
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
}

/// Builds the application context, exiting when the configuration cannot be loaded
fn build_context(config: Option<PathBuf>, color: format::ColorChoice) -> context::AppContext {
    match context::AppContext::build(config, color) {
        Ok(ctx) => ctx,
        Err(e) => {
            format::create_formatter(color).error(&e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}", e);
    }

    let color = format::ColorChoice::from(cli.color.as_str());

    match cli.command {
        Commands::Version => commands::version::print_version(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        Commands::Config { command } => match command {
            ConfigCommands::Init { force } => {
                // Must work even when the current file does not parse
                let path = cli.config.unwrap_or_else(config::default_config_path);
                let formatter = format::create_formatter(color);
                commands::config::handle_init(formatter.as_ref(), &path, force);
            }
            ConfigCommands::Show { format } => {
                let ctx = build_context(cli.config, color);
                let fmt = format::OutputFormat::from(format.as_str());
                commands::config::handle_show(&ctx, fmt);
            }
        },
        Commands::Check { format } => {
            let ctx = build_context(cli.config, color);
            let fmt = format::OutputFormat::from(format.as_str());
            commands::check::handle_check(&ctx, fmt).await;
        }
        Commands::Login { format } => {
            let ctx = build_context(cli.config, color);
            let fmt = format::OutputFormat::from(format.as_str());
            commands::login::handle_login(&ctx, fmt).await;
        }
        Commands::List { format, quiet } => {
            let ctx = build_context(cli.config, color);
            let fmt = format::OutputFormat::from(format.as_str());
            commands::list::handle_list(&ctx, fmt, quiet).await;
        }
        Commands::Pull { remove, format } => {
            let ctx = build_context(cli.config, color);
            let fmt = format::OutputFormat::from(format.as_str());
            commands::pull::handle_pull(&ctx, fmt, remove).await;
        }
    }
}
