//! Centralized configuration for Lumina.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

/// Central configuration for all Lumina components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct LuminaConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub streaming: StreamingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the API server binds to
    pub bind_address: SocketAddr,
    /// Externally visible base URL used when rendering media links
    pub public_url: String,
    /// Whether to attach a permissive CORS layer
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5000)),
            public_url: "http://localhost:5000".to_string(),
            enable_cors: true,
        }
    }
}

/// Upload storage and catalog configuration.
///
/// Uploaded videos and thumbnails live in subdirectories of `uploads_dir`;
/// the catalog document is a single JSON file.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded media
    pub uploads_dir: PathBuf,
    /// Path of the JSON catalog document
    pub catalog_path: PathBuf,
    /// Temporary file suffix used for atomic catalog writes
    pub temp_file_suffix: &'static str,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new("uploads"))
    }
}

impl StorageConfig {
    /// Creates a storage layout with everything beneath `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            uploads_dir: root.to_path_buf(),
            catalog_path: root.join("catalog.json"),
            temp_file_suffix: ".tmp",
        }
    }

    /// Directory holding uploaded video files.
    pub fn videos_dir(&self) -> PathBuf {
        self.uploads_dir.join("videos")
    }

    /// Directory holding uploaded thumbnail images.
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.uploads_dir.join("thumbnails")
    }
}

/// Byte streaming configuration.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Maximum size of a single body chunk read from disk
    pub chunk_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024, // 64 KiB
        }
    }
}

impl LuminaConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(address) = std::env::var("LUMINA_BIND_ADDRESS")
            && let Ok(address) = address.parse::<SocketAddr>()
        {
            config.server.bind_address = address;
        }

        if let Ok(url) = std::env::var("LUMINA_PUBLIC_URL") {
            config.server.public_url = url;
        }

        if let Ok(dir) = std::env::var("LUMINA_UPLOADS_DIR") {
            config.storage = StorageConfig::rooted_at(Path::new(&dir));
        }

        // Applied after the uploads root so an explicit catalog path wins
        if let Ok(path) = std::env::var("LUMINA_CATALOG_PATH") {
            config.storage.catalog_path = PathBuf::from(path);
        }

        if let Ok(size) = std::env::var("LUMINA_CHUNK_SIZE")
            && let Ok(size) = size.parse::<usize>()
            && size > 0
        {
            config.streaming.chunk_size = size;
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Binds to an ephemeral port and keeps all files beneath `root`.
    pub fn for_testing(root: &Path) -> Self {
        Self {
            server: ServerConfig {
                bind_address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)),
                ..Default::default()
            },
            storage: StorageConfig::rooted_at(root),
            streaming: StreamingConfig {
                chunk_size: 1024, // Small chunks exercise multi-chunk bodies
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = LuminaConfig::default();

        assert_eq!(config.server.bind_address.port(), 5000);
        assert_eq!(config.server.public_url, "http://localhost:5000");
        assert!(config.server.enable_cors);
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(
            config.storage.catalog_path,
            PathBuf::from("uploads/catalog.json")
        );
        assert_eq!(config.storage.videos_dir(), PathBuf::from("uploads/videos"));
        assert_eq!(
            config.storage.thumbnails_dir(),
            PathBuf::from("uploads/thumbnails")
        );
        assert_eq!(config.streaming.chunk_size, 65536);
    }

    #[test]
    fn test_testing_preset() {
        let config = LuminaConfig::for_testing(Path::new("/tmp/lumina-test"));

        assert_eq!(config.server.bind_address.port(), 0);
        assert_eq!(
            config.storage.catalog_path,
            PathBuf::from("/tmp/lumina-test/catalog.json")
        );
        assert_eq!(config.streaming.chunk_size, 1024);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("LUMINA_BIND_ADDRESS", "0.0.0.0:8080");
            std::env::set_var("LUMINA_PUBLIC_URL", "https://media.example.com");
            std::env::set_var("LUMINA_UPLOADS_DIR", "/srv/lumina");
            std::env::set_var("LUMINA_CHUNK_SIZE", "4096");
        }

        let config = LuminaConfig::from_env();

        assert_eq!(config.server.bind_address.port(), 8080);
        assert_eq!(config.server.public_url, "https://media.example.com");
        assert_eq!(config.storage.videos_dir(), PathBuf::from("/srv/lumina/videos"));
        assert_eq!(
            config.storage.catalog_path,
            PathBuf::from("/srv/lumina/catalog.json")
        );
        assert_eq!(config.streaming.chunk_size, 4096);

        // Cleanup
        unsafe {
            std::env::remove_var("LUMINA_BIND_ADDRESS");
            std::env::remove_var("LUMINA_PUBLIC_URL");
            std::env::remove_var("LUMINA_UPLOADS_DIR");
            std::env::remove_var("LUMINA_CHUNK_SIZE");
        }
    }
}
