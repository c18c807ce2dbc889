//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::batch::ErrorPolicy;
use crate::app::context::StrategyKind;
use crate::app::format::OutputFormat;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".packer/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub batch: Batch,
    #[serde(default)]
    pub output: Output,
}

/// Section structs keep every field optional so a layer only overrides what it sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Engine {
    #[serde(default)]
    strategy: Option<StrategyKind>,
}

impl Engine {
    pub fn strategy(&self) -> StrategyKind {
        self.strategy.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Batch {
    #[serde(default)]
    on_error: Option<ErrorPolicy>,
    #[serde(default)]
    parallel: Option<bool>,
}

impl Batch {
    pub fn on_error(&self) -> ErrorPolicy {
        self.on_error.unwrap_or_default()
    }

    pub fn parallel(&self) -> bool {
        self.parallel.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    format: Option<OutputFormat>,
}

impl Output {
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    strategy: Option<String>,
    on_error: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            strategy: env::var("PACKER_STRATEGY").ok(),
            on_error: env::var("PACKER_ON_ERROR").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(strategy: &str, on_error: &str) -> Self {
        Self {
            strategy: Some(strategy.to_owned()),
            on_error: Some(on_error.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    /// Built-in defaults plus env overrides, ignoring every config file.
    pub fn load_builtin() -> Result<Self> {
        Self::load_with_layers(None, None, EnvOverrides::from_env())
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        apply_env_overrides(merged, env_overrides)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            engine: merge_engine(self.engine, other.engine),
            batch: merge_batch(self.batch, other.batch),
            output: merge_output(self.output, other.output),
        }
    }
}

fn merge_engine(mut base: Engine, overlay: Engine) -> Engine {
    if let Some(value) = overlay.strategy {
        base.strategy = Some(value);
    }
    base
}

fn merge_batch(mut base: Batch, overlay: Batch) -> Batch {
    if let Some(value) = overlay.on_error {
        base.on_error = Some(value);
    }
    if let Some(value) = overlay.parallel {
        base.parallel = Some(value);
    }
    base
}

fn merge_output(mut base: Output, overlay: Output) -> Output {
    if let Some(value) = overlay.format {
        base.format = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("packer/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(strategy) = env.strategy {
        config.engine.strategy = Some(
            strategy
                .parse()
                .context("invalid PACKER_STRATEGY override")?,
        );
    }
    if let Some(on_error) = env.on_error {
        config.batch.on_error = Some(
            on_error
                .parse()
                .context("invalid PACKER_ON_ERROR override")?,
        );
    }
    Ok(config)
}
