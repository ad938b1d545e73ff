use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::app::SettingField;
use crate::config::Config;
use crate::ui::theme::Theme;

pub struct SettingsPanel<'a> {
    config: &'a Config,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(config: &'a Config, selected: usize, theme: &'a Theme) -> Self {
        Self {
            config,
            selected,
            theme,
        }
    }

    fn label(field: SettingField) -> String {
        let text = match field {
            SettingField::QuestionCount => t!("settings.question_count"),
            SettingField::TimerEnabled => t!("settings.timer_enabled"),
            SettingField::TimerMinutes => t!("settings.timer_minutes"),
            SettingField::NewPercent => t!("settings.pct_new"),
            SettingField::IncorrectPercent => t!("settings.pct_incorrect"),
            SettingField::CorrectPercent => t!("settings.pct_correct"),
            SettingField::Theme => t!("settings.theme"),
            SettingField::Locale => t!("settings.locale"),
        };
        text.into_owned()
    }

    fn value(&self, field: SettingField) -> String {
        let c = self.config;
        match field {
            SettingField::QuestionCount => c.question_count.to_string(),
            SettingField::TimerEnabled if c.timer_enabled => t!("settings.on").into_owned(),
            SettingField::TimerEnabled => t!("settings.off").into_owned(),
            SettingField::TimerMinutes => t!("settings.minutes", count = c.timer_minutes).into_owned(),
            SettingField::NewPercent => format!("{}%", c.percentages.new),
            SettingField::IncorrectPercent => format!("{}%", c.percentages.incorrect),
            SettingField::CorrectPercent => format!("{}%", c.percentages.correct),
            SettingField::Theme => c.theme.clone(),
            SettingField::Locale => c.locale.clone(),
        }
    }
}

impl Widget for SettingsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("settings.title")))
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label_width = SettingField::ALL
            .iter()
            .map(|f| Self::label(*f).chars().count())
            .max()
            .unwrap_or(0);

        let mut lines: Vec<Line> = Vec::new();
        for (i, field) in SettingField::ALL.iter().enumerate() {
            let is_selected = i == self.selected;
            let dimmed = *field == SettingField::TimerMinutes && !self.config.timer_enabled;
            let indicator = if is_selected { ">" } else { " " };
            let label = format!(" {indicator} {:<label_width$}  ", Self::label(*field));
            let value = format!("< {} >", self.value(*field));

            let mut label_style = Style::default().fg(colors.fg());
            let mut value_style = Style::default().fg(if dimmed { colors.muted() } else { colors.accent() });
            if is_selected {
                label_style = label_style.add_modifier(Modifier::BOLD).bg(colors.selected_bg());
                value_style = value_style.add_modifier(Modifier::BOLD).bg(colors.selected_bg());
            }
            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::styled(value, value_style),
            ]));

            if *field == SettingField::CorrectPercent {
                let total = self.config.percentages.total();
                let total_color = if total == 100 {
                    colors.success()
                } else {
                    colors.error()
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("   {:<label_width$}  ", t!("settings.total")),
                        Style::default().fg(colors.muted()),
                    ),
                    Span::styled(
                        format!("  {total}%"),
                        Style::default().fg(total_color).add_modifier(Modifier::BOLD),
                    ),
                ]));
            }
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
