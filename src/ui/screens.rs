use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use rust_i18n::t;

use crate::app::{App, AppScreen, Confirm, StatusKind};
use crate::session::timer::{Urgency, format_clock};
use crate::ui::components::confirm::ConfirmDialog;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::components::question_card::QuestionCard;
use crate::ui::components::question_map::QuestionMap;
use crate::ui::components::results_panel::{ResultsSummary, ReviewList};
use crate::ui::components::settings_panel::SettingsPanel;
use crate::ui::components::stats_panel::StatsPanel;
use crate::ui::layout::{AppLayout, pack_hint_lines};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = footer_hints(app);
    let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
    let hint_lines = pack_hint_lines(&hint_refs, area.width as usize);
    let status_lines = u16::from(app.status.is_some());
    let layout = AppLayout::new(area, hint_lines.len() as u16 + status_lines);

    match app.screen() {
        AppScreen::Configure => render_configure(frame, app, &layout),
        AppScreen::Exam => render_exam(frame, app, &layout),
        AppScreen::Results => render_results(frame, app, &layout),
    }

    render_footer(frame, app, layout.footer, hint_lines);

    if let Some(confirm) = app.confirm {
        let (title, message) = match confirm {
            Confirm::ResetHistory => (t!("confirm.reset_title"), t!("confirm.reset_message")),
            Confirm::FinishExam => {
                let unanswered = app
                    .machine
                    .session()
                    .map_or(0, |s| s.len() - s.answered_count());
                (
                    t!("confirm.finish_title"),
                    t!("confirm.finish_message", unanswered = unanswered),
                )
            }
        };
        frame.render_widget(ConfirmDialog::new(title, message, &app.theme), area);
    }
}

fn footer_hints(app: &App) -> Vec<String> {
    let hints = match app.screen() {
        AppScreen::Configure => vec![
            t!("hints.move"),
            t!("hints.adjust"),
            t!("hints.start"),
            t!("hints.reset_pct"),
            t!("hints.reset_history"),
            t!("hints.quit"),
        ],
        AppScreen::Exam => vec![
            t!("hints.answer"),
            t!("hints.navigate"),
            t!("hints.next_or_finish"),
            t!("hints.finish"),
        ],
        AppScreen::Results => vec![t!("hints.scroll"), t!("hints.restart"), t!("hints.quit")],
    };
    hints.into_iter().map(|h| h.into_owned()).collect()
}

fn header_line<'a>(app: &App, info: String, right: Option<Span<'a>>) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    let mut spans = vec![
        Span::styled(
            format!(" {} ", t!("app.title")),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {info}"),
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ),
    ];
    if let Some(right) = right {
        spans.push(Span::styled("  ", Style::default().bg(colors.header_bg())));
        spans.push(right);
    }
    Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg()))
}

fn render_configure(frame: &mut Frame, app: &App, layout: &AppLayout) {
    let info = format!(
        "{} | {}",
        t!("app.subtitle"),
        t!("app.bank_size", count = app.machine.bank().len())
    );
    frame.render_widget(header_line(app, info, None), layout.header);

    let stats = StatsPanel::new(
        app.machine.breakdown(),
        app.machine.overview(),
        app.machine.ledger().exam_attempts,
        &app.theme,
    );
    let settings = SettingsPanel::new(&app.config, app.settings_selected, &app.theme);

    match layout.sidebar {
        Some(sidebar) => {
            frame.render_widget(settings, layout.main);
            frame.render_widget(stats, sidebar);
        }
        None => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(12), Constraint::Min(0)])
                .split(layout.main);
            frame.render_widget(settings, rows[0]);
            frame.render_widget(stats, rows[1]);
        }
    }
}

fn render_exam(frame: &mut Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let Some(session) = app.machine.session() else {
        return;
    };
    let Some(id) = session.current_id() else {
        return;
    };
    let Some(question) = app.machine.bank().get(id) else {
        return;
    };

    let info = format!(
        "{} | {}",
        t!(
            "exam.question",
            current = session.position() + 1,
            total = session.len()
        ),
        t!(
            "exam.answered",
            answered = session.answered_count(),
            total = session.len()
        ),
    );
    let clock = match &session.timer {
        Some(timer) => {
            let color = match timer.urgency() {
                Urgency::Calm => colors.header_fg(),
                Urgency::Warning => colors.warning(),
                Urgency::Critical => colors.error(),
            };
            Span::styled(
                format!(" ⏱ {} ", format_clock(timer.remaining_secs())),
                Style::default()
                    .fg(color)
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            )
        }
        None => Span::styled(
            format!(" {} ", t!("exam.untimed")),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    };
    frame.render_widget(header_line(app, info, Some(clock)), layout.header);

    let show_bar = layout.tier.show_progress_bar(layout.main.height);
    let main_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(if show_bar { 3 } else { 0 }),
        ])
        .split(layout.main);

    let card = QuestionCard::new(
        question,
        session.option_order(id),
        session.answer_display(id),
        session.category(id),
        &app.theme,
    );
    frame.render_widget(card, main_rows[0]);

    if show_bar {
        let label = t!(
            "exam.answered",
            answered = session.answered_count(),
            total = session.len()
        );
        frame.render_widget(
            ProgressBar::new(label, session.progress(), &app.theme),
            main_rows[1],
        );
    }

    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(QuestionMap::new(session, &app.theme), sidebar);
    }
}

fn render_results(frame: &mut Frame, app: &App, layout: &AppLayout) {
    let Some(report) = app.machine.report() else {
        return;
    };

    let info = format!(
        "{} | {}",
        t!("results.title"),
        report.finished_at.format("%Y-%m-%d %H:%M")
    );
    frame.render_widget(header_line(app, info, None), layout.header);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(layout.main);
    frame.render_widget(ResultsSummary::new(report, &app.theme), rows[0]);
    frame.render_widget(
        ReviewList::new(report, app.review_scroll, &app.theme),
        rows[1],
    );

    if let Some(sidebar) = layout.sidebar {
        let stats = StatsPanel::new(
            app.machine.breakdown(),
            app.machine.overview(),
            app.machine.ledger().exam_attempts,
            &app.theme,
        );
        frame.render_widget(stats, sidebar);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect, hint_lines: Vec<String>) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.accent(),
            StatusKind::Warning => colors.warning(),
            StatusKind::Error => colors.error(),
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", status.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    lines.extend(
        hint_lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::bank::tests::sample_bank;
    use crate::config::Config;
    use crate::session::machine::ExamMachine;
    use crate::store::MemoryStore;
    use crate::ui::theme::{Theme, ThemeColors};

    fn test_app() -> App {
        let machine = ExamMachine::new(
            sample_bank(6),
            Box::new(MemoryStore::new()),
            SmallRng::seed_from_u64(5),
        );
        let theme = Theme {
            name: "test".to_string(),
            colors: ThemeColors::default(),
        };
        let mut config = Config::default();
        config.question_count = 4;
        App::new(machine, config, theme)
    }

    fn draw(app: &App, width: u16, height: u16) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
    }

    #[test]
    fn test_every_screen_renders_at_several_sizes() {
        let mut app = test_app();
        for (w, h) in [(120, 40), (80, 24), (50, 16)] {
            draw(&app, w, h);
        }
        app.start_exam();
        app.answer(0);
        for (w, h) in [(120, 40), (80, 24), (50, 16)] {
            draw(&app, w, h);
        }
        app.request_finish();
        draw(&app, 80, 24);
        app.resolve_confirm(true);
        for (w, h) in [(120, 40), (80, 24), (50, 16)] {
            draw(&app, w, h);
        }
    }
}
