use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::engine::scoring::{Outcome, Verdict, format_score};
use crate::session::result::{ExamReport, FinishReason};
use crate::session::timer::format_clock;
use crate::ui::theme::Theme;

pub fn verdict_text(verdict: Verdict) -> String {
    match verdict {
        Verdict::Excellent => t!("results.verdict.excellent"),
        Verdict::Good => t!("results.verdict.good"),
        Verdict::NeedsPractice => t!("results.verdict.needs_practice"),
    }
    .into_owned()
}

/// Counts, official score and verdict.
pub struct ResultsSummary<'a> {
    report: &'a ExamReport,
    theme: &'a Theme,
}

impl<'a> ResultsSummary<'a> {
    pub fn new(report: &'a ExamReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }
}

impl Widget for ResultsSummary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let score = &self.report.score;
        let verdict = self.report.verdict();
        let verdict_color = match verdict {
            Verdict::Excellent => colors.success(),
            Verdict::Good => colors.warning(),
            Verdict::NeedsPractice => colors.error(),
        };

        let block = Block::bordered()
            .title(format!(" {} ", t!("results.title")))
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().fg(colors.muted());
        let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        let reason = match self.report.reason {
            FinishReason::Manual => t!("results.reason_manual"),
            FinishReason::TimeUp => t!("results.reason_time_up"),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {}: ", t!("results.score")), label),
                Span::styled(format_score(score.official_score), bold(colors.accent())),
                Span::styled(format!(" {}", t!("results.out_of")), label),
                Span::styled(format!("   {}: ", t!("results.percentage")), label),
                Span::styled(format!("{}%", score.percentage), bold(colors.fg())),
            ]),
            Line::from(vec![
                Span::styled(format!(" {}: ", t!("results.correct")), label),
                Span::styled(score.correct.to_string(), bold(colors.success())),
                Span::styled(format!("   {}: ", t!("results.incorrect")), label),
                Span::styled(score.incorrect.to_string(), bold(colors.error())),
                Span::styled(format!("   {}: ", t!("results.unanswered")), label),
                Span::styled(score.unanswered.to_string(), bold(colors.warning())),
            ]),
            Line::from(vec![
                Span::styled(format!(" {}: ", t!("results.elapsed")), label),
                Span::styled(
                    format_clock(self.report.elapsed_secs.max(0) as u32),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(format!("   {reason}"), label),
            ]),
            Line::from(Span::styled(format!(" {}", verdict_text(verdict)), bold(verdict_color))),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Per-question review, starting at entry `scroll`.
pub struct ReviewList<'a> {
    report: &'a ExamReport,
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> ReviewList<'a> {
    pub fn new(report: &'a ExamReport, scroll: usize, theme: &'a Theme) -> Self {
        Self {
            report,
            scroll,
            theme,
        }
    }
}

impl Widget for ReviewList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let total = self.report.review.len();

        let block = Block::bordered()
            .title(format!(
                " {} {}/{} ",
                t!("results.review"),
                (self.scroll + 1).min(total),
                total
            ))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().fg(colors.muted());
        let mut lines: Vec<Line> = Vec::new();
        for entry in self.report.review.iter().skip(self.scroll) {
            let (mark, mark_color) = match entry.outcome {
                Outcome::Correct => ("✓", colors.success()),
                Outcome::Wrong => ("✗", colors.error()),
                Outcome::Unanswered => ("–", colors.warning()),
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {mark} {}. ", entry.position + 1),
                    Style::default().fg(mark_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    entry.prompt.clone(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                ),
            ]));

            let chosen = entry
                .chosen
                .clone()
                .unwrap_or_else(|| t!("results.not_answered").into_owned());
            let chosen_color = if entry.outcome == Outcome::Correct {
                colors.success()
            } else {
                colors.error()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("   {}: ", t!("results.your_answer")), label),
                Span::styled(chosen, Style::default().fg(chosen_color)),
            ]));
            if entry.outcome != Outcome::Correct {
                lines.push(Line::from(vec![
                    Span::styled(format!("   {}: ", t!("results.correct_answer")), label),
                    Span::styled(entry.correct.clone(), Style::default().fg(colors.success())),
                ]));
            }
            if let Some(feedback) = &entry.feedback {
                lines.push(Line::from(Span::styled(
                    format!("   {feedback}"),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::ITALIC),
                )));
            }
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
