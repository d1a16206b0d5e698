//! Configuration file – reads/writes `~/.rover/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use rover_runtime::MissionConfig;
use rover_types::MineralPosition;
use serde::{Deserialize, Serialize};

/// Simulation parameters for the headless rover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Slot the simulated detector places the gold mineral in.
    pub gold_position: MineralPosition,
    /// Length of the autonomous window; the run signal drops afterwards.
    pub autonomous_period_ms: u64,
    /// Chassis rotation per simulation step at full turning power.
    pub degrees_per_step: f64,
    /// Encoder advance per simulation step at full power.
    pub ticks_per_step: f64,
    /// Detector polls per fresh frame.
    pub detection_every: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gold_position: MineralPosition::Center,
            autonomous_period_ms: 30_000,
            degrees_per_step: 0.5,
            ticks_per_step: 4.0,
            detection_every: 5,
        }
    }
}

/// Persisted configuration stored in `~/.rover/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mission: MissionConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

/// `$ROVER_CONFIG` if set, otherwise `~/.rover/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("ROVER_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rover").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `ROVER_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVER_TARGET_LABEL` | `mission.vision.target_label` |
/// | `ROVER_MANEUVER_TIMEOUT_MS` | `mission.maneuver_timeout_ms` |
/// | `ROVER_AUTONOMOUS_PERIOD_MS` | `sim.autonomous_period_ms` |
///
/// Numeric values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ROVER_TARGET_LABEL") {
        cfg.mission.vision.target_label = v;
    }
    if let Ok(v) = std::env::var("ROVER_MANEUVER_TIMEOUT_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.mission.maneuver_timeout_ms = Some(ms);
    }
    if let Ok(v) = std::env::var("ROVER_AUTONOMOUS_PERIOD_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.sim.autonomous_period_ms = ms;
    }
}

/// Save the config to disk, creating `~/.rover/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.mission.geometry.ticks_per_revolution, 1440.0);
        assert_eq!(loaded.mission.retreat.distance_cm, 30.0);
        assert_eq!(loaded.sim.gold_position, MineralPosition::Center);
        assert_eq!(loaded.sim.autonomous_period_ms, 30_000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[mission.retreat]\npower = 0.5\n\n[sim]\ngold_position = \"left\"\n",
        )
        .expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.mission.retreat.power, 0.5);
        assert_eq!(loaded.mission.retreat.distance_cm, 30.0);
        assert_eq!(loaded.sim.gold_position, MineralPosition::Left);
        assert_eq!(loaded.sim.detection_every, 5);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[mission\n").expect("write");
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn config_path_points_to_rover_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".rover"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_changes_target_label() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ROVER_TARGET_LABEL", "Gold Cube") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.mission.vision.target_label, "Gold Cube");
        unsafe { std::env::remove_var("ROVER_TARGET_LABEL") };
    }

    #[test]
    fn apply_env_overrides_sets_maneuver_timeout() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ROVER_MANEUVER_TIMEOUT_MS", "4000") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.mission.maneuver_timeout_ms, Some(4000));
        unsafe { std::env::remove_var("ROVER_MANEUVER_TIMEOUT_MS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_period() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("ROVER_AUTONOMOUS_PERIOD_MS", "soon") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.sim.autonomous_period_ms, 30_000);
        unsafe { std::env::remove_var("ROVER_AUTONOMOUS_PERIOD_MS") };
    }
}
