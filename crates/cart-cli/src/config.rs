//! Service configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cart_core::Product;

/// Default lock table size for the `RocksDB` backend.
pub const DEFAULT_LOCK_STRIPES: usize = 64;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unrecognized backend name.
    #[error("unknown backend {0:?} (expected \"rocksdb\" or \"memory\")")]
    UnknownBackend(String),

    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    CatalogRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog file is not a JSON array of products.
    #[error("failed to parse catalog file {path}: {source}")]
    CatalogParse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Persistent `RocksDB` store in `data_dir`.
    #[default]
    RocksDb,
    /// Process-local in-memory store.
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Path to `RocksDB` data directory (default: "./data/cart").
    pub data_dir: PathBuf,

    /// Storage backend (default: `RocksDb`).
    pub backend: Backend,

    /// Number of lock stripes for the `RocksDB` backend.
    pub lock_stripes: usize,

    /// JSON file of products to load into the catalog at start-up.
    pub catalog_file: Option<PathBuf>,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` if `CART_BACKEND` is set to an
    /// unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("CART_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => Backend::default(),
        };

        Ok(Self {
            data_dir: std::env::var("CART_DATA_DIR")
                .map_or_else(|_| PathBuf::from("./data/cart"), PathBuf::from),
            backend,
            lock_stripes: std::env::var("CART_LOCK_STRIPES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_LOCK_STRIPES),
            catalog_file: std::env::var("CART_CATALOG_FILE").ok().map(PathBuf::from),
        })
    }

    /// Products listed in `catalog_file`, or none if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn seed_products(&self) -> Result<Vec<Product>, ConfigError> {
        match &self.catalog_file {
            Some(path) => {
                let products = load_catalog_file(path)?;
                tracing::info!(path = %path.display(), count = products.len(), "Loaded catalog file");
                Ok(products)
            }
            None => Ok(Vec::new()),
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/cart"),
            backend: Backend::default(),
            lock_stripes: DEFAULT_LOCK_STRIPES,
            catalog_file: None,
        }
    }
}

/// Load products from a JSON file.
fn load_catalog_file(path: &Path) -> Result<Vec<Product>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::CatalogParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn backend_names() {
        assert_eq!("rocksdb".parse::<Backend>().unwrap(), Backend::RocksDb);
        assert_eq!(" Memory ".parse::<Backend>().unwrap(), Backend::Memory);
        assert!(matches!(
            "postgres".parse::<Backend>(),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn seed_products_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"sku-1","name":"Mug","price":"12.50","discount":"2.50"}},
                {{"id":"sku-2","price":"3"}}]"#
        )
        .unwrap();

        let config = CartConfig {
            catalog_file: Some(file.path().to_path_buf()),
            ..CartConfig::default()
        };
        let products = config.seed_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].discounted_price().to_string(), "10.00");
        assert_eq!(products[1].name, "");
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let config = CartConfig {
            catalog_file: Some(PathBuf::from("/nonexistent/catalog.json")),
            ..CartConfig::default()
        };
        assert!(matches!(
            config.seed_products(),
            Err(ConfigError::CatalogRead { .. })
        ));
    }

    #[test]
    fn no_catalog_file_means_no_products() {
        assert!(CartConfig::default().seed_products().unwrap().is_empty());
    }
}
