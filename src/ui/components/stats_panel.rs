use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::engine::ledger::LedgerBreakdown;
use crate::session::result::AttemptOverview;
use crate::ui::theme::Theme;

/// History overview shown next to the exam settings.
pub struct StatsPanel<'a> {
    breakdown: LedgerBreakdown,
    overview: AttemptOverview,
    exam_attempts: u32,
    theme: &'a Theme,
}

impl<'a> StatsPanel<'a> {
    pub fn new(
        breakdown: LedgerBreakdown,
        overview: AttemptOverview,
        exam_attempts: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            breakdown,
            overview,
            exam_attempts,
            theme,
        }
    }
}

fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

impl Widget for StatsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let b = &self.breakdown;
        let total = b.total();

        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.title")))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().fg(colors.muted());
        let row = |name: String, value: String, color| {
            Line::from(vec![
                Span::styled(format!(" {name}: "), label),
                Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ])
        };

        let mut lines = vec![
            row(
                t!("stats.new").into_owned(),
                format!("{} ({:.1}%)", b.new, share(b.new, total)),
                colors.accent(),
            ),
            row(
                t!("stats.incorrect").into_owned(),
                format!("{} ({:.1}%)", b.incorrect, share(b.incorrect, total)),
                colors.error(),
            ),
            row(
                t!("stats.correct").into_owned(),
                format!("{} ({:.1}%)", b.correct, share(b.correct, total)),
                colors.success(),
            ),
            Line::from(""),
            row(
                t!("stats.total_correct_answers").into_owned(),
                b.total_correct_answers.to_string(),
                colors.fg(),
            ),
            row(
                t!("stats.total_wrong_answers").into_owned(),
                b.total_wrong_answers.to_string(),
                colors.fg(),
            ),
            row(
                t!("stats.exam_attempts").into_owned(),
                self.exam_attempts.to_string(),
                colors.fg(),
            ),
            Line::from(""),
        ];

        if self.overview.count == 0 {
            lines.push(Line::from(Span::styled(format!(" {}", t!("stats.none")), label)));
        } else {
            lines.push(row(
                t!("stats.saved_attempts").into_owned(),
                self.overview.count.to_string(),
                colors.fg(),
            ));
            lines.push(row(
                t!("stats.mean").into_owned(),
                format!("{}%", self.overview.mean_percentage),
                colors.accent(),
            ));
            let recent = self
                .overview
                .recent
                .iter()
                .map(|p| format!("{p}%"))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(row(t!("stats.recent").into_owned(), recent, colors.fg()));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
