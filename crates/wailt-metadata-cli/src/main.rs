//! wailt-metadata CLI — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use wailt_metadata::MetadataFetcher;
use wailt_metadata_cli::commands::{self, TRACKS_FILE};
use wailt_metadata_cli::config::{resolve_config, resolve_data_dir, MetadataConfig, Overrides};

#[derive(Parser)]
#[command(
    name = "wailt-metadata",
    about = "Fetch versioned track metadata with cache and bundled fallbacks",
    version
)]
struct Cli {
    /// Base URL document names are resolved against.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Data directory; the cache lives in its `wailt` subdirectory.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Use only the copies bundled with this binary.
    #[arg(long, global = true)]
    force_embedded: bool,

    /// Download timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a document and print it.
    Fetch {
        /// Document name, resolved against the base URL.
        #[arg(default_value = TRACKS_FILE)]
        file: String,
    },

    /// Fetch track metadata and print a summary (default).
    Tracks,

    /// Print title and artist for a sound location such as `minecraft:music/game/calm1`.
    Lookup {
        location: String,
    },

    /// Print the effective configuration as JSON.
    Config,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   wailt-metadata completions bash > ~/.local/share/bash-completion/completions/wailt-metadata
    ///   wailt-metadata completions zsh > ~/.zfunc/_wailt-metadata
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let overrides = Overrides {
        url: cli.url,
        force_embedded: cli.force_embedded,
        timeout_ms: cli.timeout_ms,
    };
    let setup = || -> anyhow::Result<(MetadataConfig, MetadataFetcher)> {
        let config = resolve_config(&data_dir, &overrides)?;
        let fetcher = config.fetcher(&data_dir)?;
        tracing::debug!("Cache directory: {}", fetcher.cache_root().display());
        Ok((config, fetcher))
    };

    let output = match cli.command.unwrap_or(Commands::Tracks) {
        Commands::Fetch { file } => {
            let (_, fetcher) = setup()?;
            commands::fetch(&fetcher, &file).await?
        }
        Commands::Tracks => {
            let (_, fetcher) = setup()?;
            commands::tracks(&fetcher).await?
        }
        Commands::Lookup { location } => {
            let (_, fetcher) = setup()?;
            commands::lookup(&fetcher, &location).await?
        }
        Commands::Config => {
            let (config, fetcher) = setup()?;
            commands::config(&config, &fetcher)?
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "wailt-metadata", &mut std::io::stdout());
            return Ok(());
        }
    };
    println!("{output}");

    Ok(())
}
