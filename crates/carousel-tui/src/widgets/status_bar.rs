use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use carousel_core::{LayoutMode, SelectionState};

use crate::app::{alignment_name, layout_name, App};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status_text = match &app.status_message {
            Some(msg) => format!(" {}", msg),
            None => summary(app),
        };

        let help_hint = " q:quit h/l:move 1-3:layout a:align +/-:density f/w/c/s:effects ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.width() + help_hint.width());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn summary(app: &App) -> String {
    let carousel = &app.carousel;
    let config = carousel.config();

    let mut mode = layout_name(config.layout_mode).to_uppercase();
    if config.layout_mode == LayoutMode::Wheel {
        mode = format!("{}:{}", mode, alignment_name(config.wheel_alignment));
    }
    let state = match carousel.state() {
        SelectionState::Idle => "",
        SelectionState::ManipulationActive => " | DRAG",
        SelectionState::AutoAdvancing => " | JUMP",
    };

    match carousel.selected_item() {
        Some(item) => format!(
            " {} | {}/{} {} | D={}{}",
            mode,
            carousel.selected_index() + 1,
            carousel.items().len(),
            item,
            config.density(),
            state
        ),
        None => format!(" {} | D={}", mode, config.density()),
    }
}
