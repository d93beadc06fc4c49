//! Page size selection dialog

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Dialog listing the allowed page sizes
#[derive(Default)]
pub struct PageSizeDialog {
    list_state: ListState,
}

impl PageSizeDialog {
    pub fn draw_with_options(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        options: &[usize],
        current: usize,
        selected_index: usize,
    ) -> Result<()> {
        let height = options.len() as u16 + 5;
        let popup_area = centered_popup(area, 32, height);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Rows per page ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let list_area = Rect::new(
            inner.x,
            inner.y + 1,
            inner.width,
            inner.height.saturating_sub(3),
        );
        let help_area = Rect::new(
            inner.x,
            inner.y + inner.height.saturating_sub(1),
            inner.width,
            1.min(inner.height),
        );

        let items: Vec<ListItem> = options
            .iter()
            .map(|size| {
                let marker = if *size == current { "●" } else { " " };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("  {} ", marker), Style::default().fg(Color::Green)),
                    Span::raw(format!("{} rows", size)),
                ]))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        self.list_state
            .select(Some(selected_index.min(options.len().saturating_sub(1))));
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(
                " Enter ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Apply  "),
            Span::styled(
                " Esc ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Cancel"),
        ]))
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(help, help_area);

        Ok(())
    }
}

impl Component for PageSizeDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ModalDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ModalUp),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_with_options(frame, area, &[], 0, 0)
    }
}
