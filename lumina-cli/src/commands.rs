//! CLI command implementations

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use lumina_core::catalog::{NewVideo, VideoFilter};
use lumina_core::config::{LuminaConfig, StorageConfig};
use lumina_core::{LuminaError, MediaId, MediaLibrary, VideoRecord};
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the media server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// Base URL used for links in API responses
        #[arg(long)]
        public_url: Option<String>,
    },
    /// Copy a video into the library and catalog it
    Import {
        /// Video file to import
        video: PathBuf,
        /// Thumbnail image
        #[arg(long)]
        thumbnail: Option<PathBuf>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Duration in seconds
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },
    /// List catalogued videos, newest first
    List {
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive match on title or description
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one video
    Show {
        /// Video id
        id: String,
    },
    /// Remove a video and delete its files
    Remove {
        /// Video id
        id: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the error of the command that failed; domain failures are `LuminaError`s
pub async fn handle_command(command: Commands, uploads: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = LuminaConfig::from_env();
    if let Some(dir) = uploads {
        config.storage = StorageConfig::rooted_at(&dir);
    }

    match command {
        Commands::Serve {
            host,
            port,
            public_url,
        } => serve(config, host, port, public_url).await,
        Commands::Import {
            video,
            thumbnail,
            title,
            description,
            category,
            duration,
        } => {
            let metadata = NewVideo {
                title,
                description,
                category,
                duration_secs: duration,
            };
            import_video(config, &video, thumbnail.as_deref(), metadata).await
        }
        Commands::List { category, search } => {
            list_videos(config, VideoFilter { category, search }).await
        }
        Commands::Show { id } => show_video(config, &id).await,
        Commands::Remove { id } => remove_video(config, &id).await,
    }
}

/// Start the web server
///
/// # Errors
/// - Server startup or runtime failure
pub async fn serve(
    mut config: LuminaConfig,
    host: Option<IpAddr>,
    port: Option<u16>,
    public_url: Option<String>,
) -> anyhow::Result<()> {
    let bind = config.server.bind_address;
    config.server.bind_address = SocketAddr::new(
        host.unwrap_or(bind.ip()),
        port.unwrap_or(bind.port()),
    );
    if let Some(url) = public_url {
        config.server.public_url = url;
    }

    info!(
        "Serving uploads from {}",
        config.storage.uploads_dir.display()
    );
    lumina_web::run_server(config)
        .await
        .map_err(|e| anyhow::anyhow!("server failed: {e}"))
}

/// Import a video file into the library
///
/// # Errors
/// - `LuminaError::Library` - Invalid metadata, unsupported file or copy failure
pub async fn import_video(
    config: LuminaConfig,
    video: &Path,
    thumbnail: Option<&Path>,
    metadata: NewVideo,
) -> anyhow::Result<()> {
    let library = open_library(config).await?;
    let record = library
        .import(video, thumbnail, metadata)
        .await
        .map_err(LuminaError::from)?;

    println!("Imported {} \"{}\"", record.id, record.title);
    println!("  File: {}", record.video_path.display());
    Ok(())
}

/// List catalogued videos
///
/// # Errors
/// - `LuminaError::Library` - Catalog could not be opened
pub async fn list_videos(config: LuminaConfig, filter: VideoFilter) -> anyhow::Result<()> {
    let library = open_library(config).await?;
    let videos = library.catalog().list(&filter);

    if videos.is_empty() {
        println!("No videos found");
        return Ok(());
    }

    println!("{:<24}  {:<14}  {:>6}  {:>10}  TITLE", "ID", "CATEGORY", "VIEWS", "SIZE");
    for video in &videos {
        println!(
            "{:<24}  {:<14}  {:>6}  {:>10}  {}",
            video.id,
            video.category,
            video.views,
            format_size(video.video_size),
            video.title
        );
    }
    println!("\n{} video(s)", videos.len());
    Ok(())
}

/// Show details of one video
///
/// # Errors
/// - `LuminaError::Streaming` - Malformed id
/// - `LuminaError::Catalog` - Unknown id
pub async fn show_video(config: LuminaConfig, id: &str) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let library = open_library(config).await?;
    let video = library
        .catalog()
        .get(&id)
        .ok_or_else(|| LuminaError::from(not_found(id)))?;

    print_video(&video);
    Ok(())
}

/// Remove a video and its files
///
/// # Errors
/// - `LuminaError::Streaming` - Malformed id
/// - `LuminaError::Library` - Unknown id or catalog update failure
pub async fn remove_video(config: LuminaConfig, id: &str) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let library = open_library(config).await?;
    let record = library.remove(&id).await.map_err(LuminaError::from)?;

    println!("Removed {} \"{}\"", record.id, record.title);
    Ok(())
}

async fn open_library(config: LuminaConfig) -> anyhow::Result<MediaLibrary> {
    let catalog_path = config.storage.catalog_path.clone();
    MediaLibrary::open(config.storage)
        .await
        .map_err(LuminaError::from)
        .with_context(|| format!("opening catalog {}", catalog_path.display()))
}

fn parse_id(raw: &str) -> Result<MediaId, LuminaError> {
    raw.parse().map_err(|_| {
        LuminaError::from(lumina_core::StreamError::InvalidIdentifier {
            kind: lumina_core::MediaKind::Video,
            input: raw.to_string(),
        })
    })
}

fn not_found(id: MediaId) -> lumina_core::CatalogError {
    lumina_core::CatalogError::NotFound {
        kind: lumina_core::MediaKind::Video,
        id,
    }
}

fn print_video(video: &VideoRecord) {
    println!("{}", video.title);
    println!("  ID:          {}", video.id);
    println!("  Category:    {}", video.category);
    println!("  Description: {}", video.description);
    println!("  Views:       {}", video.views);
    println!("  Duration:    {}s", video.duration_secs);
    println!(
        "  Video:       {} ({})",
        video.video_path.display(),
        format_size(video.video_size)
    );
    match &video.thumbnail_path {
        Some(path) => println!("  Thumbnail:   {}", path.display()),
        None => println!("  Thumbnail:   none"),
    }
    println!("  Created:     {}", video.created_at.to_rfc3339());
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
