//! Server configuration
//!
//! Configuration is loaded from environment variables; every value has a
//! sensible default for local development.

use std::env;
use std::path::PathBuf;

use crate::cpc::types::limits;

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory scanned for survey photos at startup
    pub images_dir: PathBuf,

    /// CPC codec configuration
    pub cpc: CpcConfig,

    /// Annotation configuration
    pub annotation: AnnotationConfig,
}

/// CPC-related configuration
#[derive(Debug, Clone)]
pub struct CpcConfig {
    /// Maximum accepted `.cpc` upload size in bytes
    pub max_file_size: u64,
    /// Maximum points in a single `.cpc` file
    pub max_points: u64,
    /// CPCe codes-file path written into from-scratch exports
    pub code_filepath: String,
    /// Windows-side image directory written into from-scratch exports
    pub image_dir: String,
}

/// Annotation-related configuration
#[derive(Debug, Clone)]
pub struct AnnotationConfig {
    /// Cap for generated points per image
    pub max_points_per_image: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            images_dir: PathBuf::from("/var/lib/reefpoint/images"),
            cpc: CpcConfig::default(),
            annotation: AnnotationConfig::default(),
        }
    }
}

impl Default for CpcConfig {
    fn default() -> Self {
        Self {
            max_file_size: limits::MAX_CPC_SIZE_BYTES,
            max_points: limits::MAX_POINTS,
            code_filepath: r"C:\CPCe codes\codes.txt".to_string(),
            image_dir: r"C:\Reef images".to_string(),
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            max_points_per_image: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }
        if let Ok(dir) = env::var("IMAGES_DIR")
            && !dir.is_empty()
        {
            config.images_dir = PathBuf::from(dir);
        }

        if let Ok(val) = env::var("CPC_MAX_FILE_SIZE_KB")
            && let Ok(kb) = val.parse::<u64>()
        {
            config.cpc.max_file_size = kb * 1024;
        }
        if let Ok(val) = env::var("CPC_MAX_POINTS")
            && let Ok(v) = val.parse()
        {
            config.cpc.max_points = v;
        }
        if let Ok(path) = env::var("CPC_CODE_FILEPATH")
            && !path.is_empty()
        {
            config.cpc.code_filepath = path;
        }
        if let Ok(dir) = env::var("CPC_IMAGE_DIR")
            && !dir.is_empty()
        {
            config.cpc.image_dir = dir;
        }

        if let Ok(val) = env::var("MAX_POINTS_PER_IMAGE")
            && let Ok(v) = val.parse()
        {
            config.annotation.max_points_per_image = v;
        }

        config
    }
}
