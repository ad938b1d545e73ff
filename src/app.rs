use std::path::PathBuf;
use std::time::{Duration, Instant};

use rust_i18n::t;
use tracing::{info, warn};

use crate::bank::loader::BankNotice;
use crate::config::{self, Config, LOCALES, MAX_QUESTIONS, MAX_TIMER_MINUTES};
use crate::engine::ledger::Category;
use crate::error::{ExamError, ValidationError};
use crate::session::machine::{ExamMachine, ExamPhase};
use crate::session::timer::TickOutcome;
use crate::ui::theme::Theme;

/// Percentage step used by the settings screen.
pub const PERCENT_STEP: i32 = 5;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Configure,
    Exam,
    Results,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingField {
    QuestionCount,
    TimerEnabled,
    TimerMinutes,
    NewPercent,
    IncorrectPercent,
    CorrectPercent,
    Theme,
    Locale,
}

impl SettingField {
    pub const ALL: [SettingField; 8] = [
        SettingField::QuestionCount,
        SettingField::TimerEnabled,
        SettingField::TimerMinutes,
        SettingField::NewPercent,
        SettingField::IncorrectPercent,
        SettingField::CorrectPercent,
        SettingField::Theme,
        SettingField::Locale,
    ];

    fn category(self) -> Option<Category> {
        match self {
            SettingField::NewPercent => Some(Category::New),
            SettingField::IncorrectPercent => Some(Category::Incorrect),
            SettingField::CorrectPercent => Some(Category::Correct),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirm {
    ResetHistory,
    FinishExam,
}

pub struct App {
    pub machine: ExamMachine,
    pub config: Config,
    /// Where settings are written back; `None` keeps them in memory only.
    pub config_path: Option<PathBuf>,
    pub theme: Theme,
    pub should_quit: bool,
    pub settings_selected: usize,
    pub confirm: Option<Confirm>,
    pub review_scroll: usize,
    pub status: Option<StatusMessage>,
    last_second: Instant,
}

impl App {
    pub fn new(machine: ExamMachine, config: Config, theme: Theme) -> Self {
        Self {
            machine,
            config,
            config_path: None,
            theme,
            should_quit: false,
            settings_selected: 0,
            confirm: None,
            review_scroll: 0,
            status: None,
            last_second: Instant::now(),
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn screen(&self) -> AppScreen {
        match self.machine.phase() {
            ExamPhase::Configuring => AppScreen::Configure,
            ExamPhase::InProgress(_) => AppScreen::Exam,
            ExamPhase::Finished(_) => AppScreen::Results,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    /// Surface bank loading problems and import recovery on the first screen.
    pub fn report_startup(&mut self, notices: &[BankNotice], import_recovered: bool) {
        for notice in notices {
            match notice {
                BankNotice::FellBack { reason } => self.set_status(
                    StatusKind::Warning,
                    t!("status.bank_fallback", reason = reason),
                ),
                BankNotice::Skipped { count } => {
                    self.set_status(StatusKind::Warning, t!("status.bank_skipped", count = count))
                }
            }
        }
        if import_recovered {
            self.set_status(StatusKind::Warning, t!("status.import_recovered"));
        }
    }

    pub fn selected_field(&self) -> SettingField {
        SettingField::ALL[self.settings_selected.min(SettingField::ALL.len() - 1)]
    }

    pub fn settings_up(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_down(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SettingField::ALL.len() - 1);
    }

    pub fn settings_cycle_forward(&mut self) {
        self.adjust_setting(1);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.adjust_setting(-1);
    }

    fn adjust_setting(&mut self, dir: i32) {
        let field = self.selected_field();
        if let Some(category) = field.category() {
            self.config.percentages.nudge(category, dir * PERCENT_STEP);
            return;
        }
        match field {
            SettingField::QuestionCount => {
                let count = step(self.config.question_count as i64, dir, 1, MAX_QUESTIONS as i64);
                self.config.question_count = count as usize;
                self.config.timer_minutes = config::default_timer_minutes(self.config.question_count);
            }
            SettingField::TimerEnabled => {
                self.config.timer_enabled = !self.config.timer_enabled;
            }
            SettingField::TimerMinutes => {
                let minutes = step(self.config.timer_minutes as i64, dir, 1, MAX_TIMER_MINUTES as i64);
                self.config.timer_minutes = minutes as u32;
            }
            SettingField::Theme => {
                let themes = Theme::available_themes();
                if let Some(name) = cycle(&themes, &self.config.theme, dir) {
                    self.config.theme = name;
                    if let Some(theme) = Theme::load(&self.config.theme) {
                        self.theme = theme;
                    }
                }
            }
            SettingField::Locale => {
                let locales: Vec<String> = LOCALES.iter().map(|l| l.to_string()).collect();
                if let Some(name) = cycle(&locales, &self.config.locale, dir) {
                    rust_i18n::set_locale(&name);
                    self.config.locale = name;
                }
            }
            SettingField::NewPercent | SettingField::IncorrectPercent | SettingField::CorrectPercent => {}
        }
    }

    pub fn reset_percentages(&mut self) {
        self.config.percentages.reset();
    }

    pub fn start_exam(&mut self) {
        let settings = self.config.exam_settings();
        match self.machine.start(&settings) {
            Ok(()) => {
                self.status = None;
                self.review_scroll = 0;
                self.last_second = Instant::now();
                self.save_config();
            }
            Err(e) => {
                info!(error = %e, "exam not started");
                self.set_status(StatusKind::Error, describe_error(&e));
            }
        }
    }

    pub fn answer(&mut self, display_index: usize) {
        if let Err(e) = self.machine.answer_current(display_index) {
            self.set_status(StatusKind::Error, describe_error(&e));
        }
    }

    pub fn next_question(&mut self) {
        self.machine.next();
    }

    pub fn prev_question(&mut self) {
        self.machine.prev();
    }

    /// Enter on the last question ends the exam; elsewhere it moves on.
    pub fn advance_or_finish(&mut self) {
        let on_last = self.machine.session().is_some_and(|s| s.is_last());
        if on_last {
            self.finish_exam();
        } else {
            self.machine.next();
        }
    }

    pub fn request_finish(&mut self) {
        if self.screen() == AppScreen::Exam {
            self.confirm = Some(Confirm::FinishExam);
        }
    }

    pub fn finish_exam(&mut self) {
        self.confirm = None;
        if self.machine.finish() {
            self.review_scroll = 0;
        }
    }

    pub fn restart(&mut self) {
        if self.machine.restart() {
            self.review_scroll = 0;
        }
    }

    pub fn request_reset_history(&mut self) {
        if self.screen() == AppScreen::Configure {
            self.confirm = Some(Confirm::ResetHistory);
        }
    }

    /// Answer an open confirmation prompt.
    pub fn resolve_confirm(&mut self, accepted: bool) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        if !accepted {
            return;
        }
        match confirm {
            Confirm::ResetHistory => {
                self.machine.reset_history();
                self.set_status(StatusKind::Info, t!("status.history_reset"));
            }
            Confirm::FinishExam => self.finish_exam(),
        }
    }

    pub fn scroll_review(&mut self, delta: isize) {
        let len = self.machine.report().map_or(0, |r| r.review.len());
        let max = len.saturating_sub(1);
        self.review_scroll = self.review_scroll.saturating_add_signed(delta).min(max);
    }

    /// Feed wall-clock time to the exam countdown, one machine tick per whole
    /// elapsed second.
    pub fn on_tick(&mut self, now: Instant) {
        if self.screen() != AppScreen::Exam {
            self.last_second = now;
            return;
        }
        while now.saturating_duration_since(self.last_second) >= ONE_SECOND {
            self.last_second += ONE_SECOND;
            if self.machine.tick() == TickOutcome::Expired {
                self.confirm = None;
                self.review_scroll = 0;
                self.set_status(StatusKind::Warning, t!("status.time_up"));
                break;
            }
        }
    }

    pub fn quit(&mut self) {
        self.save_config();
        self.should_quit = true;
    }

    fn save_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, path = %path.display(), "failed to save config");
        }
    }
}

fn step(value: i64, dir: i32, min: i64, max: i64) -> i64 {
    (value + dir as i64).clamp(min, max)
}

/// Neighbour of `current` in `items`, wrapping around. Unknown values jump to
/// the first item.
fn cycle(items: &[String], current: &str, dir: i32) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let len = items.len() as i32;
    let next = match items.iter().position(|i| i == current) {
        Some(idx) => (idx as i32 + dir).rem_euclid(len) as usize,
        None => 0,
    };
    Some(items[next].clone())
}

/// User-facing text for errors returned by the exam machine.
pub fn describe_error(err: &ExamError) -> String {
    match err {
        ExamError::Validation(ValidationError::PercentageTotal { total }) => {
            t!("errors.percentage_total", total = total).into_owned()
        }
        ExamError::Validation(ValidationError::QuestionCount) => {
            t!("errors.question_count").into_owned()
        }
        ExamError::EmptyBank => t!("errors.empty_bank").into_owned(),
        other => other.to_string(),
    }
}
