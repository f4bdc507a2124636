//! Client for the magic worksheet conversion service.
//!
//! A host gathers a [`ConversionForm`], hands it to [`ConversionClient::submit`]
//! together with its [`DisplayTargets`], and attaches the returned
//! [`DownloadAction`]s to whatever download controls it has.

pub mod artifact;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod params;
pub mod render;
pub mod response;
pub mod targets;

pub use artifact::{
    ArtifactKind, BlobStore, DownloadAction, DownloadTarget, ImageSource, ObjectUrl,
    decode_and_offer, decode_base64,
};
pub use client::ConversionClient;
pub use config::{
    ClientConfig, ConfigError, ConfigLoadResult, ConfigSource, FileConfig, apply_env_overrides,
    config_directory, config_path, load_config, save_config,
};
pub use error::{ClientError, ErrorKind};
pub use logging::{LoggingDestination, LoggingError, init_logging};
pub use messages::Locale;
pub use params::{ConversionForm, ConversionRequest, SourceImage};
pub use render::{Rendered, RenderedArtifact, render};
pub use response::{ConversionResponse, HealthStatus, ImageMeta};
pub use targets::{DisplayTargets, ResultsPanel};
