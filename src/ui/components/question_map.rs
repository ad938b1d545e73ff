use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::exam::ExamSession;
use crate::ui::theme::Theme;

/// Grid of question numbers: answered ones filled, the current one bold.
pub struct QuestionMap<'a> {
    session: &'a ExamSession,
    theme: &'a Theme,
}

impl<'a> QuestionMap<'a> {
    pub fn new(session: &'a ExamSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for QuestionMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("exam.navigator")))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let spans: Vec<Span> = self
            .session
            .order()
            .iter()
            .enumerate()
            .map(|(pos, &id)| {
                let mut style = if self.session.answer(id).is_some() {
                    Style::default().fg(colors.bg()).bg(colors.bar_filled())
                } else {
                    Style::default().fg(colors.muted())
                };
                if pos == self.session.position() {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                Span::styled(format!("{:>3}", pos + 1), style)
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
