use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mqk")]
#[command(about = "MiniQuantDesk auxiliary-event feed CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> market -> env ...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Auxiliary-event feed commands
    Aux {
        #[command(subcommand)]
        cmd: AuxCmd,
    },
}

#[derive(Subcommand)]
enum AuxCmd {
    /// Replay one symbol's merged aux + bar feed as JSON lines on stdout.
    Replay {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Ticker as named in factor_files/ and map_files/
        #[arg(long)]
        ticker: String,

        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Raw bar CSV (date,close). Without it only aux events are printed.
        #[arg(long)]
        bars: Option<String>,

        /// Mode (BACKTEST | LIVE)
        #[arg(long, default_value = "BACKTEST")]
        mode: String,

        /// Fail instead of warn when the config has keys nothing reads.
        #[arg(long, default_value_t = false)]
        strict_keys: bool,
    },

    /// Print loaded reference tables and every split record.
    Tables {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if missing.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = mqk_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Aux { cmd } => match cmd {
            AuxCmd::Replay {
                config_paths,
                ticker,
                start,
                end,
                bars,
                mode,
                strict_keys,
            } => commands::feed::replay(commands::feed::ReplayArgs {
                config_paths,
                ticker,
                start,
                end,
                bars,
                mode,
                strict_keys,
            })?,

            AuxCmd::Tables { config_paths } => commands::feed::tables(&config_paths)?,
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
