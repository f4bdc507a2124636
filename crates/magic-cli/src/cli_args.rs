use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use magic_core::{ConversionForm, Locale, SourceImage};

/// Top-level CLI entrypoint.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "magic",
    version,
    about = "Turn a picture into a color-by-number worksheet",
    long_about = None,
    subcommand_precedence_over_arg = true
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub convert: ConvertArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Supported subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that the conversion service answers.
    Health,
    /// Inspect or edit the persisted configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration file.
    Show,
    /// Store the base URL of the conversion service.
    SetApiBase { url: String },
    /// Store the language of status messages (fr or en).
    SetLocale {
        #[arg(value_parser = clap::value_parser!(Locale))]
        locale: Locale,
    },
    /// Store the directory downloads are written to.
    SetOutputDir {
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },
    /// Store the request timeout in seconds (0 disables it).
    SetTimeout { secs: u64 },
}

/// Flags shared by every command that talks to the service.
#[derive(Debug, Clone, Args, Default)]
pub struct ConnectionArgs {
    /// Base URL of the conversion service.
    #[arg(long = "api-base", value_name = "URL", global = true)]
    pub api_base: Option<String>,

    /// Abort requests that take longer than this many seconds.
    #[arg(long = "timeout-secs", value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Language of status messages.
    #[arg(long, value_parser = clap::value_parser!(Locale), global = true)]
    pub locale: Option<Locale>,

    /// Mirror logs to stderr.
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,
}

/// Arguments for the conversion flow (default command).
#[derive(Debug, Clone, Args, Default)]
pub struct ConvertArgs {
    /// Image to convert.
    #[arg(value_name = "IMAGE", value_hint = ValueHint::FilePath)]
    pub image: Option<PathBuf>,

    /// Number of color clusters.
    #[arg(long)]
    pub colors: Option<u32>,

    /// Longest image side after downscaling.
    #[arg(long = "max-size")]
    pub max_size: Option<u32>,

    /// Outline stroke width in pixels.
    #[arg(long)]
    pub thickness: Option<u32>,

    /// Smallest region area that gets a number.
    #[arg(long = "min-area")]
    pub min_area: Option<u32>,

    /// Regions smaller than this are merged into a neighbour.
    #[arg(long = "merge-area")]
    pub merge_area: Option<u32>,

    /// Outline strategy understood by the service (labels, union).
    #[arg(long = "outline-mode", value_name = "MODE")]
    pub outline_mode: Option<String>,

    /// Ask the service for the quantized color preview.
    #[arg(long = "include-preview", action = ArgAction::SetTrue)]
    pub include_preview: bool,

    /// Directory where the returned images are written.
    #[arg(short, long = "out-dir", value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Show the results without writing any file.
    #[arg(long = "no-save", action = ArgAction::SetTrue)]
    pub no_save: bool,
}

impl ConvertArgs {
    /// Returns true when no conversion flag was provided.
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.colors.is_none()
            && self.max_size.is_none()
            && self.thickness.is_none()
            && self.min_area.is_none()
            && self.merge_area.is_none()
            && self.outline_mode.is_none()
            && !self.include_preview
            && self.out_dir.is_none()
            && !self.no_save
    }

    pub fn to_form(&self, file: Option<SourceImage>) -> ConversionForm {
        ConversionForm {
            file,
            colors: self.colors,
            max_size: self.max_size,
            thickness: self.thickness,
            min_area: self.min_area,
            merge_area: self.merge_area,
            outline_mode: self.outline_mode.clone(),
            include_preview: self.include_preview,
        }
    }
}
