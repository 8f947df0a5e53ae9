use animeshelf_config::{Config, PathManager};
use animeshelf_models::AnimeStatus;
use clap::{ArgAction, Parser, Subcommand};
use commands::{anime, clear, config, history, list, session, sync};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "animeshelf")]
#[command(about = "AnimeShelf - Track what you're watching, what you've finished, and where you left off")]
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

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the watch-list and watch history
    #[command(long_about = "Show the locally known watch-list and watch history. Without a filter flag every collection is shown.")]
    List {
        /// Only the videos being watched
        #[arg(long, action = ArgAction::SetTrue)]
        watching: bool,

        /// Only the completed videos
        #[arg(long, action = ArgAction::SetTrue)]
        completed: bool,

        /// Only the watch history
        #[arg(long, action = ArgAction::SetTrue)]
        history: bool,
    },
    /// Show whether a video is watching, completed, or not tracked
    Status {
        video_id: u64,
    },
    /// Mark a video as watching
    Watch {
        video_id: u64,

        /// Title to store with the entry
        #[arg(long)]
        title: Option<String>,
    },
    /// Mark a video as completed
    Complete {
        video_id: u64,

        /// Title to store with the entry
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a video from the watch-list
    Remove {
        video_id: u64,
    },
    /// Record, inspect, or clear the watch history
    History {
        #[command(subcommand)]
        cmd: HistoryCommands,
    },
    /// Replace local data with the server's copy
    #[command(long_about = "Fetch the watch-list and watch history from the server and replace the local copy. If the server cannot be reached the cached data is kept.")]
    Sync,
    /// Store an API token for the current user
    Login {
        /// API token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,

        /// Signed-in user profile as JSON
        #[arg(long)]
        user_json: Option<String>,
    },
    /// Forget the stored token and user
    Logout,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear local data
    #[command(long_about = "Clear local data or stored credentials. Use --cache to clear the cached watch-list and history, --credentials to clear the stored session, or --all to clear everything.")]
    Clear {
        /// Clear local data and credentials
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear the cached watch-list and history
        #[arg(long, action = ArgAction::SetTrue)]
        cache: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Record a playback session
    Add {
        video_id: u64,

        #[arg(long)]
        episode_id: u64,

        #[arg(long)]
        episode_title: String,

        /// Playback position in seconds
        #[arg(long, default_value_t = 0.0)]
        progress: f64,

        /// Title to store with the entry
        #[arg(long)]
        title: Option<String>,
    },
    /// Show the history, or one video's entry
    Show {
        video_id: Option<u64>,
    },
    /// Remove one video's history entry
    Remove {
        video_id: u64,
    },
    /// Remove every history entry
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the token)
    Show {
        /// Show the token unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Change API or logging settings
    Set {
        /// Base URL of the API (empty for offline mode)
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Default log level
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Logging settings come from the config file; a broken file is reported
    // by the command itself, so fall back to defaults here
    let logging_config = Config::load_or_default(&PathManager::default().config_file())
        .map(|config| config.logging)
        .unwrap_or_default();
    logging::init_logging(
        cli.verbose,
        cli.quiet,
        &logging_config.level,
        logging_config.file.as_deref(),
    )
    .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::List { watching, completed, history } => {
            list::run_list(watching, completed, history, &output).await
        }
        Commands::Status { video_id } => anime::run_status(video_id, &output).await,
        Commands::Watch { video_id, title } => {
            anime::run_track(video_id, title, AnimeStatus::Watching, &output).await
        }
        Commands::Complete { video_id, title } => {
            anime::run_track(video_id, title, AnimeStatus::Completed, &output).await
        }
        Commands::Remove { video_id } => anime::run_remove(video_id, &output).await,
        Commands::History { cmd } => match cmd {
            HistoryCommands::Add { video_id, episode_id, episode_title, progress, title } => {
                history::run_add(video_id, episode_id, episode_title, progress, title, &output).await
            }
            HistoryCommands::Show { video_id } => history::run_show(video_id, &output).await,
            HistoryCommands::Remove { video_id } => history::run_remove(video_id, &output).await,
            HistoryCommands::Clear => history::run_clear(&output).await,
        },
        Commands::Sync => sync::run_sync(&output).await,
        Commands::Login { token, user_json } => session::run_login(token, user_json, &output).await,
        Commands::Logout => session::run_logout(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { all, cache, credentials } => clear::run_clear(all, cache, credentials, &output).await,
    };

    // Human mode leaves the report to color-eyre
    if let Err(e) = &result {
        if output.format() != output::OutputFormat::Human {
            output.error(e.to_string());
        }
    }
    result
}
