use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use examsim::app::{App, AppScreen};
use examsim::bank::loader::{self, BankRequest};
use examsim::config::{self, Config};
use examsim::event::{AppEvent, EventHandler};
use examsim::logging;
use examsim::session::machine::ExamMachine;
use examsim::store::json_store::{JsonStore, default_data_dir};
use examsim::store::schema::ExportData;
use examsim::ui;
use examsim::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "examsim", version, about = "Terminal multiple-choice exam simulator")]
struct Cli {
    #[arg(short, long, help = "Question bank JSON file")]
    bank: Option<PathBuf>,

    #[arg(long, help = "Download the question bank from this URL")]
    bank_url: Option<String>,

    #[arg(short = 'n', long, help = "Number of questions per exam")]
    count: Option<usize>,

    #[arg(long, help = "Exam time limit in minutes (enables the timer)")]
    timer: Option<u32>,

    #[arg(long, help = "Seed for reproducible question selection")]
    seed: Option<u64>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface language (en, es)")]
    locale: Option<String>,

    #[arg(long, help = "Directory for history files and the log")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Write history and settings to FILE and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Replace history with the contents of FILE and exit")]
    import: Option<PathBuf>,
}

impl Cli {
    fn overrides_config(&self) -> bool {
        self.bank.is_some()
            || self.bank_url.is_some()
            || self.count.is_some()
            || self.timer.is_some()
            || self.seed.is_some()
            || self.theme.is_some()
            || self.locale.is_some()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    logging::init(&data_dir);

    let config_path = Config::config_path();
    let mut config = Config::load_from(&config_path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    });
    let themes = Theme::available_themes();
    let theme_names: Vec<&str> = themes.iter().map(String::as_str).collect();
    config.validate(&theme_names);
    apply_overrides(&mut config, &cli);
    config.validate(&theme_names);
    rust_i18n::set_locale(&config.locale);

    let store = JsonStore::with_base_dir(data_dir.clone())
        .with_context(|| format!("cannot use data directory {}", data_dir.display()))?;
    let import_recovered = store.check_interrupted_import();

    if let Some(path) = &cli.export {
        let export = store.export_all(&config);
        let json = serde_json::to_string_pretty(&export)?;
        fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
        println!("Exported history to {}", path.display());
        return Ok(());
    }
    if let Some(path) = &cli.import {
        let content =
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
        let data: ExportData = serde_json::from_str(&content)?;
        store.import_all(&data)?;
        println!("Imported history from {}", path.display());
        return Ok(());
    }

    let loaded = loader::load(&BankRequest {
        path: config.bank_path.clone(),
        url: config.bank_url.clone(),
        data_dir: Some(data_dir),
    });
    info!(source = ?loaded.source, questions = loaded.bank.len(), "bank ready");

    let rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let machine =
        ExamMachine::new(loaded.bank, Box::new(store), rng).with_history_cap(config.history_cap);
    let theme = Theme::load(&config.theme).unwrap_or_default();

    let mut app = App::new(machine, config, theme);
    if !cli.overrides_config() {
        app = app.with_config_path(config_path);
    }
    app.report_startup(&loaded.notices, import_recovered);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(path) = &cli.bank {
        config.bank_path = Some(path.clone());
    }
    if let Some(url) = &cli.bank_url {
        config.bank_url = Some(url.clone());
    }
    if let Some(count) = cli.count {
        config.question_count = count;
        config.timer_minutes = config::default_timer_minutes(count);
    }
    if let Some(minutes) = cli.timer {
        config.timer_enabled = true;
        config.timer_minutes = minutes;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(locale) = &cli.locale {
        config.locale = locale.clone();
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::screens::render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick(now) => app.on_tick(now),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    if app.confirm.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_confirm(false),
            _ => {}
        }
        return;
    }

    match app.screen() {
        AppScreen::Configure => handle_configure_key(app, key),
        AppScreen::Exam => handle_exam_key(app, key),
        AppScreen::Results => handle_results_key(app, key),
    }
}

fn handle_configure_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.settings_up(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_down(),
        KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        KeyCode::Enter | KeyCode::Char('s') => app.start_exam(),
        KeyCode::Char('p') => app.reset_percentages(),
        KeyCode::Char('R') => app.request_reset_history(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}

fn handle_exam_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(ch @ '1'..='4') => app.answer(ch as usize - '1' as usize),
        KeyCode::Char(ch @ 'a'..='d') => app.answer(ch as usize - 'a' as usize),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_question(),
        KeyCode::Enter => app.advance_or_finish(),
        KeyCode::Char('f') => app.request_finish(),
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.scroll_review(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_review(1),
        KeyCode::PageUp => app.scroll_review(-5),
        KeyCode::PageDown => app.scroll_review(5),
        KeyCode::Char('r') => app.restart(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}
