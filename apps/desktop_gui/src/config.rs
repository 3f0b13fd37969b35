//! Viewer settings: defaults, then `folio.toml`, then `FOLIO__*` environment
//! overrides, then CLI flags.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use carousel_core::CarouselTiming;
use serde::Deserialize;

const DEFAULT_MANIFEST: &str = "portfolio.toml";
const DEFAULT_CONFIG_FILE: &str = "folio.toml";

const MIN_WINDOW_MS: u64 = 100;
const MAX_WINDOW_MS: u64 = 60_000;
const MAX_REVEAL_MS: u64 = 2_000;

#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub portfolio_path: PathBuf,
    pub timing: CarouselTiming,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            portfolio_path: PathBuf::from(DEFAULT_MANIFEST),
            timing: CarouselTiming::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    portfolio: Option<PathBuf>,
    advance_ms: Option<u64>,
    resume_ms: Option<u64>,
    reset_ms: Option<u64>,
    reveal_ms: Option<u64>,
}

pub fn load_settings(
    config_path: Option<&Path>,
    portfolio_override: Option<&Path>,
) -> ViewerSettings {
    let mut settings = ViewerSettings::default();

    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(&config_file) {
        match toml::from_str::<FileConfig>(&raw) {
            Ok(file_cfg) => apply_file_config(&mut settings, file_cfg),
            Err(err) => tracing::warn!(
                "ignoring unreadable config '{}': {err}",
                config_file.display()
            ),
        }
    }

    if let Ok(v) = std::env::var("FOLIO__PORTFOLIO") {
        settings.portfolio_path = PathBuf::from(v);
    }
    if let Some(ms) = env_millis("FOLIO__ADVANCE_MS") {
        settings.timing.advance_period = clamp_window(ms);
    }
    if let Some(ms) = env_millis("FOLIO__RESUME_MS") {
        settings.timing.resume_delay = clamp_window(ms);
    }
    if let Some(ms) = env_millis("FOLIO__RESET_MS") {
        settings.timing.reset_delay = clamp_window(ms);
    }
    if let Some(ms) = env_millis("FOLIO__REVEAL_MS") {
        settings.timing.reveal_delay = clamp_reveal(ms);
    }

    if let Some(path) = portfolio_override {
        settings.portfolio_path = path.to_path_buf();
    }

    settings
}

fn apply_file_config(settings: &mut ViewerSettings, file: FileConfig) {
    if let Some(path) = file.portfolio {
        settings.portfolio_path = path;
    }
    if let Some(ms) = file.advance_ms {
        settings.timing.advance_period = clamp_window(ms);
    }
    if let Some(ms) = file.resume_ms {
        settings.timing.resume_delay = clamp_window(ms);
    }
    if let Some(ms) = file.reset_ms {
        settings.timing.reset_delay = clamp_window(ms);
    }
    if let Some(ms) = file.reveal_ms {
        settings.timing.reveal_delay = clamp_reveal(ms);
    }
}

fn env_millis(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
}

/// Timer windows stay within [100ms, 60s]; the carousel semantics do not
/// survive a zero period.
fn clamp_window(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(MIN_WINDOW_MS, MAX_WINDOW_MS))
}

fn clamp_reveal(ms: u64) -> Duration {
    Duration::from_millis(ms.min(MAX_REVEAL_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_timing_windows() {
        assert_eq!(clamp_window(0), Duration::from_millis(100));
        assert_eq!(clamp_window(2500), Duration::from_millis(2500));
        assert_eq!(clamp_window(10_000_000), Duration::from_millis(60_000));
        assert_eq!(clamp_reveal(0), Duration::ZERO);
        assert_eq!(clamp_reveal(100_000), Duration::from_millis(2_000));
    }

    #[test]
    fn file_config_overrides_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            portfolio = "work/portfolio.toml"
            advance_ms = 3000
            reveal_ms = 0
            "#,
        )
        .expect("config");

        let mut settings = ViewerSettings::default();
        apply_file_config(&mut settings, file);
        assert_eq!(settings.portfolio_path, PathBuf::from("work/portfolio.toml"));
        assert_eq!(settings.timing.advance_period, Duration::from_millis(3000));
        assert_eq!(settings.timing.reveal_delay, Duration::ZERO);
        assert_eq!(settings.timing.resume_delay, Duration::from_millis(1000));
        assert_eq!(settings.timing.reset_delay, Duration::from_millis(500));
    }

    #[test]
    fn partial_file_config_keeps_remaining_defaults() {
        let file: FileConfig = toml::from_str("reset_ms = 50").expect("config");
        let mut settings = ViewerSettings::default();
        apply_file_config(&mut settings, file);
        assert_eq!(settings.timing.reset_delay, Duration::from_millis(100));
        assert_eq!(settings.portfolio_path, PathBuf::from("portfolio.toml"));
    }
}
