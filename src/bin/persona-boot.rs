//! persona-boot: run the eight-step persona bootstrap over a data directory
//!
//! Usage:
//!   persona-boot                              → bootstrap ./data
//!   persona-boot --data-dir /srv/rafael       → bootstrap another store
//!   persona-boot --json                       → print the full result as JSON
//!   persona-boot checksums                    → print checksums for the security protocol
//!   persona-boot --dump-config                → print the default config as TOML
//!
//! Exit code 0 means the persona is fully initialized, 1 means the protocol
//! failed, 2 means the run never started (bad arguments, log file or
//! output).

use clap::{Parser, Subcommand};
use persona_boot::{logging, report};
use persona_bootstrap::{bootstrap, BootstrapConfig};
use persona_core::Secret;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "persona-boot",
    about = "Initialize a persona from its data directory",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data directory (overrides the config file)
    #[arg(short, long, global = true, env = "PERSONA_DATA_DIR")]
    data_dir: Option<String>,

    /// Passphrase for the emotional encoding
    #[arg(long, global = true, env = "PERSONA_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Path to config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print the result as JSON instead of the banner
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Emit stderr logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    /// Dump default config as TOML and exit
    #[arg(long, default_value_t = false)]
    dump_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bootstrap protocol (default)
    Run,
    /// Print checksums of the required files
    Checksums,
}

/// Setup problems (logging, config, output) share clap's usage exit code.
const EXIT_SETUP: i32 = 2;

fn main() {
    let code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_SETUP
        }
    };
    if code != 0 {
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if cli.dump_config {
        print!("{}", BootstrapConfig::default().to_toml());
        return Ok(0);
    }

    let log_file = cli.log_file.as_deref().map(expand_tilde);
    let _guard = logging::init_tracing(log_file.as_deref(), cli.log_json)?;

    let mut config = match &cli.config {
        Some(path) => BootstrapConfig::load(&expand_tilde(path)),
        None => BootstrapConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = expand_tilde(dir);
    }
    tracing::info!("Data directory: {}", config.data_dir.display());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Checksums => {
            for line in report::checksum_lines(&config) {
                println!("{}", line);
            }
            Ok(0)
        }
        Commands::Run => {
            let secret = cli.passphrase.map(Secret::new);
            let result = bootstrap(&config, secret);
            if cli.json {
                println!("{}", report::render_json(&result)?);
            } else {
                print!("{}", report::render_text(&result));
            }
            Ok(result.exit_code())
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
