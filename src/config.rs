//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the moon-config.toml
//! file. It provides a centralized way to configure the view geometry, the tutor
//! service, and other runtime parameters.

use crate::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "moon-config.toml";

/// Errors raised while writing the configuration back to disk.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config IO: {0}")]
    Io(#[from] io::Error),
}

/// Application configuration loaded from moon-config.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// View geometry
    #[serde(default)]
    pub view: ViewConfig,
    /// Tutor service configuration
    #[serde(default)]
    pub tutor: TutorConfig,
}

/// Geometry of the two views, in SVG user units
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Starting angle in degrees when no angle is given on the command line
    pub initial_angle: f64,
    /// Center of the Earth view disk
    pub moon_center: Point,
    /// Radius of the Earth view disk
    pub moon_radius: f64,
    /// Center of the orbit (Earth) in the orbit view
    pub orbit_center: Point,
    /// Orbit radius in the orbit view
    pub orbit_radius: f64,
    /// Radius of the small moon drawn on the orbit
    pub moon_body_radius: f64,
    /// Height of the ASCII rendering in terminal rows
    pub ascii_rows: usize,
}

/// Generative language service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Base URL of the Generative Language REST API
    pub endpoint: String,
    /// Model name used for every request
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Delay before fetching an explanation after the phase changes
    pub explanation_delay_ms: u64,
    /// Number of questions requested per quiz
    pub quiz_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Persona instruction sent with every request
    pub system_instruction: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            initial_angle: 45.0,
            moon_center: Point::new(100.0, 100.0),
            moon_radius: 80.0,
            orbit_center: Point::new(150.0, 150.0),
            orbit_radius: 100.0,
            moon_body_radius: 15.0,
            ascii_rows: 21,
        }
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        TutorConfig {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "API_KEY".to_string(),
            explanation_delay_ms: 1000,
            quiz_size: 3,
            timeout_secs: 30,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.trim().to_string(),
        }
    }
}

/// The "moon doctor" persona: a gentle guide for primary school children.
const DEFAULT_SYSTEM_INSTRUCTION: &str = "
あなたは「お月さま博士」という、優しくて物知りなキャラクターです。
小学生（特に低学年〜中学年）にもわかるように、ひらがなを多めに使ったり、簡単な言葉で説明してください。
難しい漢字には（ふりがな）を振るか、ひらがなで書いてください。
科学的に正しいことを教えつつ、子供がワクワクするようなトーンで話してください。
";

impl Default for Config {
    fn default() -> Self {
        Config {
            view: ViewConfig::default(),
            tutor: TutorConfig::default(),
        }
    }
}

impl TutorConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Config {
    /// Load configuration from moon-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file format: {}", e);
                    log::warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Save current configuration to moon-config.toml
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(CONFIG_FILE)
    }
}
