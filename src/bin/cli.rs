use clap::{Parser, Subcommand};
use colored::Colorize;
use querysh::{
    parse_manifest_file, ConsoleConfig, HistoryStore, InteractiveShell, ManifestKind, Result,
    UnsupportedExecutor,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "querysh")]
#[command(author, version, about = "Interactive console for distributed query engines")]
struct Cli {
    /// Configuration file path (defaults to ~/.querysh/config.yaml)
    #[arg(short, long, global = true, env = "QUERYSH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive shell
    Shell,

    /// Validate a datastore or connector manifest and print it as YAML
    Manifest {
        /// Manifest kind: datastore or connector
        #[arg(short, long)]
        kind: ManifestKind,

        path: PathBuf,
    },

    /// Print the persisted history that is still within retention
    History {
        /// Retention window in days, overriding the configuration
        #[arg(short, long)]
        days: Option<i64>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::discover()?,
    };

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut shell = InteractiveShell::new(&config, UnsupportedExecutor)?;
            shell.run()
        }
        Commands::Manifest { kind, path } => {
            let manifest = parse_manifest_file(kind, &path)?;
            println!("{} {} manifest '{}'", "✓".green(), kind, manifest.name());
            print!("{}", serde_yaml::to_string(&manifest)?);
            Ok(())
        }
        Commands::History { days } => {
            if let Some(days) = days {
                config.override_retention_days(days)?;
            }
            let store = match HistoryStore::from_config(&config.history) {
                Some(store) => store,
                None => {
                    println!("History is disabled");
                    return Ok(());
                }
            };
            for (i, entry) in store.load_now()?.iter().enumerate() {
                println!("{:>4}  {}", i + 1, entry);
            }
            Ok(())
        }
    }
}
