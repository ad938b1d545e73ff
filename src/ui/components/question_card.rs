use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::bank::{Letter, Question};
use crate::engine::ledger::Category;
use crate::engine::shuffle::OptionOrder;
use crate::ui::theme::Theme;

pub fn category_badge(category: Category) -> String {
    match category {
        Category::New => t!("category.new"),
        Category::Incorrect => t!("category.incorrect"),
        Category::Correct => t!("category.correct"),
    }
    .into_owned()
}

pub fn category_color(category: Category, theme: &Theme) -> Color {
    match category {
        Category::New => theme.colors.accent(),
        Category::Incorrect => theme.colors.error(),
        Category::Correct => theme.colors.success(),
    }
}

/// Prompt and shuffled options for the current question. The chosen option is
/// highlighted; correctness is not revealed until the results screen.
pub struct QuestionCard<'a> {
    question: &'a Question,
    order: OptionOrder,
    chosen: Option<Letter>,
    category: Category,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(
        question: &'a Question,
        order: OptionOrder,
        chosen: Option<Letter>,
        category: Category,
        theme: &'a Theme,
    ) -> Self {
        Self {
            question,
            order,
            chosen,
            category,
            theme,
        }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let badge_color = category_color(self.category, self.theme);

        let block = Block::bordered()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", category_badge(self.category)),
                    Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(Span::styled(
                self.question.prompt.clone(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (display, canonical) in self.order.iter() {
            let is_chosen = self.chosen == Some(display);
            let marker = if is_chosen { "●" } else { "○" };
            let style = if is_chosen {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else if self.chosen.is_some() {
                Style::default().fg(colors.muted())
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!(
                    " {marker} {}) {}",
                    display,
                    self.question.option_text(canonical)
                ),
                style,
            )));
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
