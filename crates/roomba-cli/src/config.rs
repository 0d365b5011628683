//! Configuration – reads/writes `~/.roomba/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use roomba_runtime::{ControlLoopConfig, TreeConfig};
use roomba_types::{RoombaError, RoombaResult};

/// Persisted simulator configuration stored in `~/.roomba/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Timer window for spot cleaning, in ticks.
    #[serde(default = "default_spot_clean_ticks")]
    pub spot_clean_ticks: u32,

    /// Timer window for dusty-spot cleaning during a general pass, in ticks.
    #[serde(default = "default_dusty_clean_ticks")]
    pub dusty_clean_ticks: u32,

    /// Probability that the dusty-spot sensor fires when a round is seeded.
    #[serde(default = "default_dusty_spot_probability")]
    pub dusty_spot_probability: f64,

    /// Bound on general-cleaning passes per tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until_fail_max_iterations: Option<u64>,

    /// Abort a round after this many ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks_per_run: Option<u64>,

    /// Make `MarkGeneralDone` clear the spot flag (compatibility mode).
    #[serde(default)]
    pub legacy_general_done: bool,

    /// Fixed RNG seed for reproducible rounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_spot_clean_ticks() -> u32 {
    20
}
fn default_dusty_clean_ticks() -> u32 {
    35
}
fn default_dusty_spot_probability() -> f64 {
    0.4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spot_clean_ticks: default_spot_clean_ticks(),
            dusty_clean_ticks: default_dusty_clean_ticks(),
            dusty_spot_probability: default_dusty_spot_probability(),
            until_fail_max_iterations: None,
            max_ticks_per_run: None,
            legacy_general_done: false,
            seed: None,
        }
    }
}

impl Config {
    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> RoombaResult<()> {
        if self.spot_clean_ticks == 0 || self.dusty_clean_ticks == 0 {
            return Err(RoombaError::Config("timer windows must be at least one tick".to_string()));
        }
        if !(0.0..=1.0).contains(&self.dusty_spot_probability) {
            return Err(RoombaError::Config(format!(
                "dusty_spot_probability {} is outside [0, 1]",
                self.dusty_spot_probability
            )));
        }
        if self.max_ticks_per_run == Some(0) {
            return Err(RoombaError::Config("max_ticks_per_run must be at least one tick".to_string()));
        }
        if self.until_fail_max_iterations == Some(0) {
            return Err(RoombaError::Config("until_fail_max_iterations must be at least one pass".to_string()));
        }
        Ok(())
    }

    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            spot_clean_ticks: self.spot_clean_ticks,
            dusty_clean_ticks: self.dusty_clean_ticks,
            until_fail_max_iterations: self.until_fail_max_iterations,
            legacy_general_done: self.legacy_general_done,
        }
    }

    pub fn control_loop_config(&self) -> ControlLoopConfig {
        ControlLoopConfig {
            max_ticks: self.max_ticks_per_run,
            dusty_spot_probability: self.dusty_spot_probability,
        }
    }
}

/// Return the path to `~/.roomba/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".roomba").join("config.toml")
}

/// Load the config from disk, apply environment overrides, then validate.
/// Returns `None` if the file does not exist.
pub fn load() -> RoombaResult<Option<Config>> {
    load_at(&config_path())
}

pub(crate) fn load_at(path: &Path) -> RoombaResult<Option<Config>> {
    let mut cfg = load_from(path)?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
        cfg.validate()?;
    }
    Ok(cfg)
}

/// Parse the file without overrides or validation.
pub(crate) fn load_from(path: &Path) -> RoombaResult<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| RoombaError::Config(format!("failed to read {}: {e}", path.display())))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| RoombaError::Config(format!("failed to parse config: {e}")))?;
    Ok(Some(cfg))
}

/// Apply `ROOMBA_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROOMBA_SPOT_CLEAN_TICKS` | `spot_clean_ticks` |
/// | `ROOMBA_DUSTY_CLEAN_TICKS` | `dusty_clean_ticks` |
/// | `ROOMBA_DUSTY_SPOT_PROBABILITY` | `dusty_spot_probability` |
/// | `ROOMBA_MAX_TICKS` | `max_ticks_per_run` |
/// | `ROOMBA_SEED` | `seed` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(v) = env_parse("ROOMBA_SPOT_CLEAN_TICKS") {
        cfg.spot_clean_ticks = v;
    }
    if let Some(v) = env_parse("ROOMBA_DUSTY_CLEAN_TICKS") {
        cfg.dusty_clean_ticks = v;
    }
    if let Some(v) = env_parse("ROOMBA_DUSTY_SPOT_PROBABILITY") {
        cfg.dusty_spot_probability = v;
    }
    if let Some(v) = env_parse("ROOMBA_MAX_TICKS") {
        cfg.max_ticks_per_run = Some(v);
    }
    if let Some(v) = env_parse("ROOMBA_SEED") {
        cfg.seed = Some(v);
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Save the config to disk, creating `~/.roomba/` if necessary.
pub fn save(cfg: &Config) -> RoombaResult<()> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> RoombaResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RoombaError::Config(format!("failed to create config directory: {e}")))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| RoombaError::Config(format!("failed to set config directory permissions: {e}")))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RoombaError::Config(format!("failed to serialize config: {e}")))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| RoombaError::Config(format!("failed to write {}: {e}", path.display())))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| RoombaError::Config(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}
