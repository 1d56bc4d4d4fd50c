use clap::{ArgAction, Parser, Subcommand};
use commands::{backup, config, restore};
use playstate_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "playstate")]
#[command(about = "Playstate - Carry Jellyfin watch progress from one server to another")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write the durable log here instead of the default log directory
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every user's playback state to a backup file
    #[command(long_about = "Fetch all users from the source server and write each user's played items, resume positions, favorites and play counts to a portable JSON file. Items are identified by their IMDb, TMDB and TVDB ids so they can be found again on another server.")]
    Backup {
        /// Server URL (defaults to the configured URL, otherwise prompts)
        #[arg(long)]
        url: Option<String>,

        /// API key (defaults to the stored key, otherwise prompts)
        #[arg(long)]
        api_key: Option<String>,

        /// Backup file to write
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Maximum played items fetched per user
        #[arg(long)]
        limit: Option<u32>,

        /// Collect and count records without writing the file
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Apply one user's exported playback state to a user on a target server
    #[command(long_about = "Read a backup file, pick a target user and a source username, index the target server's catalog by external id, then write the playback state of every matching item. Items with no match or a rejected write are counted and reported, they never stop the run.")]
    Restore {
        /// Server URL (defaults to the configured URL, otherwise prompts)
        #[arg(long)]
        url: Option<String>,

        /// API key (defaults to the stored key, otherwise prompts)
        #[arg(long)]
        api_key: Option<String>,

        /// Backup file to read
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Catalog items requested per page while indexing
        #[arg(long)]
        page_size: Option<usize>,

        /// Target user name or id (prompts when omitted)
        #[arg(long, value_name = "USER")]
        target_user: Option<String>,

        /// Username inside the backup whose records are restored (prompts when omitted)
        #[arg(long, value_name = "USERNAME")]
        source_user: Option<String>,

        /// Resolve every record and report what would change, without writing
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Show or change stored settings
    #[command(long_about = "Manage the configuration file and the stored API key. The API key is masked unless --full is given.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Persist one or more settings
    Set {
        /// Default server URL
        #[arg(long)]
        url: Option<String>,

        /// API key, stored in the credentials file
        #[arg(long)]
        api_key: Option<String>,

        /// Default backup file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Catalog page size
        #[arg(long)]
        page_size: Option<usize>,

        /// Played items fetched per user during backup
        #[arg(long)]
        played_items_limit: Option<u32>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = match cli.log_file {
        Some(path) => path,
        None => {
            let paths = PathManager::default();
            paths
                .ensure_directories()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to create {}: {}", paths.log_dir().display(), e))?;
            paths.log_file()
        }
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Backup { url, api_key, file, limit, dry_run } => {
            let args = backup::BackupArgs { url, api_key, file, limit, dry_run };
            backup::run_backup(args, &output).await
        }
        Commands::Restore {
            url,
            api_key,
            file,
            page_size,
            target_user,
            source_user,
            dry_run,
        } => {
            let args = restore::RestoreArgs {
                url,
                api_key,
                file,
                page_size,
                target_user,
                source_user,
                dry_run,
            };
            restore::run_restore(args, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
