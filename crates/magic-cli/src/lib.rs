//! Terminal host for the magic conversion client.

pub mod cli_args;
pub mod terminal;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use magic_core::config::{load_config_from, normalize_api_base, save_config_to};
use magic_core::{
    ClientConfig, ConversionClient, ConversionRequest, FileConfig, SourceImage,
    apply_env_overrides, config_path,
};
use thiserror::Error;

use cli_args::{Cli, Command, ConfigCommand, ConnectionArgs, ConvertArgs};
use terminal::{DirectoryTarget, TerminalView};

#[derive(Debug, Error)]
pub enum CliFailure {
    #[error("{0}")]
    Message(String),
    /// The failure was already shown as a status line.
    #[error("conversion failed")]
    Reported,
}

impl From<String> for CliFailure {
    fn from(message: String) -> Self {
        CliFailure::Message(message)
    }
}

pub async fn run(cli: Cli) -> Result<(), CliFailure> {
    run_with_config_path(cli, &config_path()).await
}

/// Same as [`run`], reading and writing the configuration at `path`.
pub async fn run_with_config_path(cli: Cli, path: &Path) -> Result<(), CliFailure> {
    let load = load_config_from(path);
    for warning in &load.warnings {
        eprintln!("Warning: {warning}");
    }
    let file_config = load.config;

    match cli.command {
        Some(command) => {
            if !cli.convert.is_empty() {
                return Err(
                    "Conversion flags cannot be combined with other commands."
                        .to_string()
                        .into(),
                );
            }
            match command {
                Command::Health => {
                    let config = resolve_client_config(&file_config, &cli.connection)?;
                    run_health(config).await
                }
                Command::Config(cmd) => handle_config_command(cmd, file_config, path),
            }
        }
        None => {
            let config = resolve_client_config(&file_config, &cli.connection)?;
            let out_dir = resolve_output_dir(&file_config, &cli.convert);
            run_convert(&cli.convert, config, out_dir, cli.connection.verbose).await
        }
    }
}

/// File configuration, then `MAGIC_*` variables, then command-line flags.
pub fn resolve_client_config(
    file_config: &FileConfig,
    connection: &ConnectionArgs,
) -> Result<ClientConfig, String> {
    let mut config = file_config.client_config();
    apply_env_overrides(&mut config).map_err(|err| err.to_string())?;

    if let Some(base) = connection.api_base.as_ref() {
        let normalized = normalize_api_base(base);
        if normalized.is_empty() {
            return Err("--api-base must not be empty.".to_string());
        }
        config.api_base = normalized;
    }
    if let Some(secs) = connection.timeout_secs {
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if let Some(locale) = connection.locale {
        config.locale = locale;
    }
    Ok(config)
}

pub fn resolve_output_dir(file_config: &FileConfig, args: &ConvertArgs) -> PathBuf {
    args.out_dir
        .clone()
        .or_else(|| file_config.output.directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Advisory warnings the terminal prints itself. Empty when logs are mirrored
/// to stderr, where the client's `warn` events already carry them.
pub fn advisories_to_print(request: &ConversionRequest, logs_on_stderr: bool) -> Vec<String> {
    if logs_on_stderr {
        return Vec::new();
    }
    request
        .advisories()
        .into_iter()
        .map(|advisory| format!("Warning: {advisory}"))
        .collect()
}

async fn run_convert(
    args: &ConvertArgs,
    config: ClientConfig,
    out_dir: PathBuf,
    logs_on_stderr: bool,
) -> Result<(), CliFailure> {
    let file = match args.image.as_deref() {
        Some(path) => Some(
            SourceImage::from_path(path)
                .await
                .map_err(|err| format!("{}: {}", path.display(), err))?,
        ),
        None => None,
    };

    let form = args.to_form(file);
    for line in advisories_to_print(&form.to_request(), logs_on_stderr) {
        eprintln!("{line}");
    }

    let client = ConversionClient::new(config).map_err(|err| err.to_string())?;
    let mut view = TerminalView::new(io::stdout());
    if client.submit(&form, &mut view).await.is_err() {
        return Err(CliFailure::Reported);
    }

    if !args.no_save {
        let mut target = DirectoryTarget::new(out_dir);
        view.save_downloads(&mut target)
            .map_err(|err| err.to_string())?;
    }
    Ok(())
}

async fn run_health(config: ClientConfig) -> Result<(), CliFailure> {
    let base = config.api_base.clone();
    let client = ConversionClient::new(config).map_err(|err| err.to_string())?;
    let health = client
        .health()
        .await
        .map_err(|err| format!("{base}: {err}"))?;
    if !health.is_ok() {
        return Err(format!("{base} reports status '{}'", health.status).into());
    }
    println!("{base}: {}", health.status);
    Ok(())
}

fn handle_config_command(
    command: ConfigCommand,
    mut config: FileConfig,
    path: &Path,
) -> Result<(), CliFailure> {
    let message = match command {
        ConfigCommand::Show => {
            let rendered = magic_core::config::render_config(&config)
                .map_err(|err| err.to_string())?;
            println!("# {}", path.display());
            print!("{rendered}");
            return Ok(());
        }
        ConfigCommand::SetApiBase { url } => {
            let normalized = normalize_api_base(&url);
            if normalized.is_empty() {
                return Err("API base URL must not be empty.".to_string().into());
            }
            config.client.api_base = normalized.clone();
            format!("API base set to {normalized}")
        }
        ConfigCommand::SetLocale { locale } => {
            config.client.locale = locale;
            format!("Locale set to {locale}")
        }
        ConfigCommand::SetOutputDir { dir } => {
            let display = dir.display().to_string();
            config.output.directory = Some(display.clone());
            format!("Output directory set to {display}")
        }
        ConfigCommand::SetTimeout { secs } => {
            config.client.timeout_secs = (secs > 0).then_some(secs);
            if secs == 0 {
                "Request timeout disabled".to_string()
            } else {
                format!("Request timeout set to {secs}s")
            }
        }
    };

    save_config_to(path, &config).map_err(|err| err.to_string())?;
    println!("{message}");
    Ok(())
}
