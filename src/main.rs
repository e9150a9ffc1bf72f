use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use djassist::{cli, config, error, types::RecommendationParams};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in to Spotify through the browser
    Login(LoginOptions),

    /// Show the stored credential
    Status,

    /// Print a valid access token, refreshing it if needed
    Token,

    /// Search tracks
    Search(SearchOptions),

    /// Show a single track
    Track(TrackOptions),

    /// Show audio features (tempo, key, energy) for tracks
    Features(FeaturesOptions),

    /// Get track recommendations from seeds
    Recommend(RecommendOptions),

    /// Read or change the settings document
    Settings(SettingsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Spotify application client id (defaults to SPOTIFY_CLIENT_ID)
    #[clap(long)]
    pub client_id: Option<String>,

    /// Scope to request; can be repeated (defaults to SPOTIFY_SCOPES)
    #[clap(long = "scope", action = ArgAction::Append, num_args = 1)]
    pub scopes: Vec<String>,

    /// Seconds to wait for the browser redirect
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search query
    pub query: String,

    /// Maximum number of tracks
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct TrackOptions {
    /// Spotify track id
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct FeaturesOptions {
    /// Spotify track ids
    #[clap(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RecommendOptions {
    /// Seed track id; can be repeated
    #[clap(long = "seed-track", action = ArgAction::Append, num_args = 1)]
    pub seed_tracks: Vec<String>,

    /// Seed artist id; can be repeated
    #[clap(long = "seed-artist", action = ArgAction::Append, num_args = 1)]
    pub seed_artists: Vec<String>,

    /// Seed genre; can be repeated
    #[clap(long = "seed-genre", action = ArgAction::Append, num_args = 1)]
    pub seed_genres: Vec<String>,

    /// Target tempo in BPM
    #[clap(long)]
    pub target_tempo: Option<f64>,

    /// Target pitch class (0 = C, 1 = C#, ...)
    #[clap(long)]
    pub target_key: Option<i32>,

    /// Minimum energy (0.0 to 1.0)
    #[clap(long)]
    pub min_energy: Option<f64>,

    /// Maximum energy (0.0 to 1.0)
    #[clap(long)]
    pub max_energy: Option<f64>,

    /// Maximum number of tracks
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct SettingsOptions {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsSubcommand {
    /// Print the settings document (credentials redacted)
    Get,

    /// Set a top-level key; the value is parsed as JSON, else taken as a string
    Set { key: String, value: String },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "djassist=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Login(opt) => cli::login(opt.client_id, opt.scopes, opt.timeout).await,
        Command::Status => cli::status().await,
        Command::Token => cli::token().await,
        Command::Search(opt) => cli::search(opt.query, opt.limit).await,
        Command::Track(opt) => cli::track(opt.id).await,
        Command::Features(opt) => cli::features(opt.ids).await,
        Command::Recommend(opt) => {
            cli::recommend(RecommendationParams {
                seed_tracks: opt.seed_tracks,
                seed_artists: opt.seed_artists,
                seed_genres: opt.seed_genres,
                target_tempo: opt.target_tempo,
                target_key: opt.target_key,
                min_energy: opt.min_energy,
                max_energy: opt.max_energy,
                limit: opt.limit,
            })
            .await
        }
        Command::Settings(opt) => match opt.command {
            SettingsSubcommand::Get => cli::settings_get().await,
            SettingsSubcommand::Set { key, value } => cli::settings_set(key, value).await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
