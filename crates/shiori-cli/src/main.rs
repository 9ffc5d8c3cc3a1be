use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shiori_api::JikanClient;
use shiori_core::config::{AppConfig, ThemePreference};
use shiori_core::models::{MediaType, TrackingStatus};
use shiori_runtime::{
    desktop, DbHandle, DetailsState, ListState, RuntimeError, ScreenCategory, ScreenCoordinator,
};

#[derive(Parser)]
#[command(name = "shiori", about = "Track anime and manga from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the top-rated catalog list
    Top {
        #[arg(value_parser = parse_media, default_value = "anime")]
        media: MediaType,
    },
    /// List tracked entries for a screen category
    List {
        #[arg(value_parser = parse_category)]
        category: ScreenCategory,
        #[arg(value_parser = parse_media, default_value = "anime")]
        media: MediaType,
    },
    /// Show details for one catalog item
    Details {
        #[arg(value_parser = parse_media)]
        media: MediaType,
        mal_id: i64,
    },
    /// Save or update a tracked entry
    Track {
        #[arg(value_parser = parse_media)]
        media: MediaType,
        mal_id: i64,
        #[arg(value_parser = parse_status, default_value = "backlog")]
        status: TrackingStatus,
        #[arg(long)]
        star: bool,
    },
    /// Remove a tracked entry
    Rm {
        #[arg(value_parser = parse_media)]
        media: MediaType,
        mal_id: i64,
    },
    /// Wipe the whole library
    Clear,
    /// Open a catalog page in the browser
    Open { url: String },
    /// Copy a catalog page link to the clipboard
    Share { url: String },
    /// Check whether the catalog API is reachable
    Online,
    /// Set the preferred color scheme (light, dark, system)
    Theme {
        #[arg(value_parser = parse_theme)]
        preference: ThemePreference,
    },
}

fn parse_media(s: &str) -> Result<MediaType, String> {
    MediaType::from_db_str(s).ok_or_else(|| format!("unknown media type `{s}` (anime, manga)"))
}

fn parse_status(s: &str) -> Result<TrackingStatus, String> {
    TrackingStatus::from_db_str(s)
        .ok_or_else(|| format!("unknown status `{s}` (ongoing, backlog, finished, unset)"))
}

fn parse_theme(s: &str) -> Result<ThemePreference, String> {
    match s {
        "light" => Ok(ThemePreference::Light),
        "dark" => Ok(ThemePreference::Dark),
        "system" => Ok(ThemePreference::System),
        _ => Err(format!("unknown theme `{s}` (light, dark, system)")),
    }
}

fn parse_category(s: &str) -> Result<ScreenCategory, String> {
    match s {
        "ongoing" => Ok(ScreenCategory::Ongoing),
        "backlog" => Ok(ScreenCategory::Backlog),
        "finished" => Ok(ScreenCategory::Finished),
        "starred" => Ok(ScreenCategory::Starred),
        "top" => Ok(ScreenCategory::Top),
        _ => Err(format!(
            "unknown category `{s}` (ongoing, backlog, finished, starred, top)"
        )),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "shiori=info".into()),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), RuntimeError> {
    let mut config = AppConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;

    // Desktop helpers don't need the library at all.
    match &cli.command {
        Command::Open { url } => return desktop::open_link(url),
        Command::Share { url } => {
            desktop::share_link(url)?;
            println!("copied {url}");
            return Ok(());
        }
        Command::Online => {
            if desktop::is_online(&config.api.base_url).await {
                println!("online");
                return Ok(());
            }
            return Err(RuntimeError::Api("catalog unreachable".into()));
        }
        Command::Theme { preference } => {
            config.general.theme = *preference;
            config
                .save()
                .map_err(|e| RuntimeError::Config(e.to_string()))?;
            println!("theme set to {}", preference_name(*preference));
            return Ok(());
        }
        _ => {}
    }

    let db_path =
        AppConfig::ensure_db_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
    let db = DbHandle::open(&db_path)
        .ok_or_else(|| RuntimeError::Database("failed to open database".into()))?;
    let catalog = JikanClient::with_base_url(config.api.base_url.clone());

    let mut coord = ScreenCoordinator::new(Arc::new(catalog), Arc::new(db));

    match cli.command {
        Command::Top { media } => {
            coord.request_list(Some(media), ScreenCategory::Top);
            coord.idle().await;
            print_list(coord.current_list())
        }
        Command::List { category, media } => {
            coord.request_list(Some(media), category);
            coord.idle().await;
            print_list(coord.current_list())
        }
        Command::Details { media, mal_id } => {
            coord.request_details(media, mal_id);
            coord.idle().await;
            print_details(coord.current_details())
        }
        Command::Track {
            media,
            mal_id,
            status,
            star,
        } => {
            coord.request_details(media, mal_id);
            coord.idle().await;
            coord.save_or_update(status, star);
            coord.idle().await;
            print_details(coord.current_details())
        }
        Command::Rm { media, mal_id } => {
            // Deletion resolves its namespace from the last list request,
            // so point the coordinator at the right catalog first.
            coord.request_list(Some(media), ScreenCategory::Backlog);
            coord.idle().await;
            coord.request_details(media, mal_id);
            coord.idle().await;
            coord.delete_entry(mal_id);
            coord.idle().await;
            print_details(coord.current_details())
        }
        Command::Clear => {
            coord.clear_library();
            coord.idle().await;
            println!("library cleared");
            Ok(())
        }
        Command::Open { .. } | Command::Share { .. } | Command::Online | Command::Theme { .. } => {
            unreachable!()
        }
    }
}

fn preference_name(preference: ThemePreference) -> &'static str {
    match preference {
        ThemePreference::Light => "light",
        ThemePreference::Dark => "dark",
        ThemePreference::System => "system",
    }
}

fn print_list(state: Option<ListState>) -> Result<(), RuntimeError> {
    match state {
        Some(ListState::Success(items)) => {
            for item in items {
                let score = item
                    .score
                    .map(|s| format!("{s:.2}"))
                    .unwrap_or_else(|| "  - ".into());
                println!("{:>8}  {score}  {}", item.mal_id, item.title);
            }
            Ok(())
        }
        Some(ListState::Empty) => {
            println!("nothing here yet");
            Ok(())
        }
        Some(ListState::Error(e)) => Err(RuntimeError::Api(e)),
        Some(ListState::Loading) | None => {
            Err(RuntimeError::Api("list request did not finish".into()))
        }
    }
}

fn print_details(state: Option<DetailsState>) -> Result<(), RuntimeError> {
    match state {
        Some(DetailsState::Success { media, entry }) => {
            println!("{} ({} #{})", media.title, media.media_type, media.mal_id);
            if let Some(score) = media.score {
                println!("score: {score:.2}");
            }
            if let Some(url) = &media.url {
                println!("url: {url}");
            }
            match entry {
                Some(entry) => {
                    let star = if entry.starred { " *" } else { "" };
                    println!("tracked: {}{star}", entry.status);
                }
                None => println!("not tracked"),
            }
            if let Some(synopsis) = &media.synopsis {
                println!("\n{synopsis}");
            }
            Ok(())
        }
        Some(DetailsState::Error(e)) => Err(RuntimeError::Api(e)),
        Some(DetailsState::Loading) | None => {
            Err(RuntimeError::Api("details request did not finish".into()))
        }
    }
}
