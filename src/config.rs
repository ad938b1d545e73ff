use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::percentages::PercentageConfig;
use crate::session::machine::ExamSettings;

pub const MAX_QUESTIONS: usize = 90;
pub const MAX_TIMER_MINUTES: u32 = 999;
pub const MAX_HISTORY_CAP: usize = 500;
pub const LOCALES: [&str; 2] = ["en", "es"];

/// Minutes allotted to a full 90-question exam; shorter exams scale down.
const FULL_EXAM_MINUTES: f64 = 120.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default)]
    pub timer_enabled: bool,
    #[serde(default = "default_timer_for_default_count")]
    pub timer_minutes: u32,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub bank_path: Option<PathBuf>,
    #[serde(default)]
    pub bank_url: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub percentages: PercentageConfig,
}

fn default_question_count() -> usize {
    20
}
fn default_timer_for_default_count() -> u32 {
    default_timer_minutes(default_question_count())
}
fn default_history_cap() -> usize {
    50
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_locale() -> String {
    "en".to_string()
}

/// `round(count / 90 * 120)`, at least one minute.
pub fn default_timer_minutes(count: usize) -> u32 {
    let minutes = (count as f64 / MAX_QUESTIONS as f64 * FULL_EXAM_MINUTES).round() as u32;
    minutes.clamp(1, MAX_TIMER_MINUTES)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            timer_enabled: false,
            timer_minutes: default_timer_for_default_count(),
            percentages: PercentageConfig::default(),
            history_cap: default_history_cap(),
            theme: default_theme(),
            locale: default_locale(),
            bank_path: None,
            bank_url: None,
            seed: None,
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("examsim")
            .join("config.toml")
    }

    /// Clamp numeric fields into range and reset unknown theme or locale names.
    /// Call after loading, since files may be hand-edited or from older builds.
    pub fn validate(&mut self, valid_themes: &[&str]) {
        self.question_count = self.question_count.clamp(1, MAX_QUESTIONS);
        self.timer_minutes = self.timer_minutes.clamp(1, MAX_TIMER_MINUTES);
        self.history_cap = self.history_cap.clamp(1, MAX_HISTORY_CAP);
        if !valid_themes.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
        if !LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
    }

    pub fn exam_settings(&self) -> ExamSettings {
        ExamSettings {
            question_count: self.question_count,
            timer_minutes: self.timer_enabled.then_some(self.timer_minutes),
            percentages: self.percentages,
        }
    }
}
