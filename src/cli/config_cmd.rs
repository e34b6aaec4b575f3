//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{
    resolve_options, ContainerFormat, OutputKind, PartialRecorderConfig, RecorderConfig,
};
use crate::domain::error::{CompileError, ConfigError};

use super::args::ConfigAction;
use super::presenter::Presenter;

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
        ConfigAction::Show => handle_show(store, presenter).await,
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

async fn handle_show<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let file_config = store.load().await?;
    if !store.exists() {
        presenter.info("No config file, showing defaults");
    }

    presenter.output(render_effective(&file_config)?.trim_end());
    Ok(())
}

/// Resolve `file_config` over the defaults and render it as TOML.
pub fn render_effective(file_config: &PartialRecorderConfig) -> Result<String, ConfigError> {
    let home = dirs::home_dir();
    let config = resolve_options(None, file_config, home.as_deref());
    validate_config(&config)?;

    toml::to_string_pretty(&config).map_err(|e| ConfigError::SerializeError(e.to_string()))
}

/// Check the free-form keys that only the pipeline compiler interprets
pub fn validate_config(config: &RecorderConfig) -> Result<(), ConfigError> {
    let invalid = |key: &str, e: CompileError| ConfigError::ValidationError {
        key: key.to_string(),
        message: e.to_string(),
    };

    config
        .output
        .parse::<OutputKind>()
        .map_err(|e| invalid("output", e))?;
    config
        .format
        .parse::<ContainerFormat>()
        .map_err(|e| invalid("format", e))?;

    if config.video.fps == 0 {
        return Err(ConfigError::ValidationError {
            key: "video.fps".to_string(),
            message: "Value must be greater than 0".to_string(),
        });
    }
    Ok(())
}
