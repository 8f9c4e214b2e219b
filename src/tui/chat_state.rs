use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::config::Config;
use crate::entities::message::Message;
use crate::lifecycle::{ChatSnapshot, LifecycleService};
use crate::tui::{AppContext, State, Transition, View};

#[derive(Debug)]
pub struct ChatState {
    pub service: LifecycleService,
    pub snapshot: ChatSnapshot,
    pub input: String,
    glitch_threshold_secs: u32,
}

impl ChatState {
    /// Open the channel. Must be called from inside a tokio runtime.
    pub fn new(config: &Config) -> Self {
        let service = LifecycleService::spawn(
            config.lifecycle_settings(),
            Some(config.welcome_text()),
        );
        let snapshot = service.snapshot();

        Self {
            service,
            snapshot,
            input: String::new(),
            glitch_threshold_secs: config.glitch_threshold_secs,
        }
    }

    fn message_item(&self, msg: &Message) -> ListItem<'static> {
        let alignment = if msg.is_mine() {
            Alignment::Right
        } else {
            Alignment::Left
        };
        let critical = msg.is_critical(self.glitch_threshold_secs);

        let text_style = match (msg.is_mine(), critical) {
            (_, true) => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::SLOW_BLINK),
            (true, false) => Style::default().fg(Color::Green),
            (false, false) => Style::default().fg(Color::White),
        };

        let mut meta = msg.time_label();
        if msg.is_mine() {
            meta.push_str("  ");
            meta.push_str(msg.delivery.marker());
        }

        let countdown_style = if critical {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        ListItem::new(vec![
            Line::from(Span::styled(msg.text.clone(), text_style)).alignment(alignment),
            Line::from(Span::styled(meta, Style::default().fg(Color::Gray))).alignment(alignment),
            Line::from(Span::styled(msg.countdown_label(), countdown_style)).alignment(alignment),
            Line::from(""),
        ])
    }

    fn render_messages(&self, f: &mut Frame, area: Rect) {
        let mut items: Vec<ListItem> = self
            .snapshot
            .visible
            .iter()
            .map(|msg| self.message_item(msg))
            .collect();

        if self.snapshot.peer_typing {
            items.push(ListItem::new(Line::from(Span::styled(
                "• • •",
                Style::default().fg(Color::Green),
            ))));
        }

        // Keep the newest messages in view
        let capacity = area.height.saturating_sub(2) as usize / 4;
        let skip = items.len().saturating_sub(capacity.max(1));
        let items: Vec<ListItem> = items.into_iter().skip(skip).collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Messages"));
        f.render_widget(list, area);
    }
}

impl State for ChatState {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
        _ctx: &mut AppContext,
    ) -> Result<Option<Transition>> {
        match (key, modifiers) {
            (KeyCode::Esc, _) => Ok(Some(Transition::Navigate(View::Dashboard))),
            (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
                self.input.push(c);
                Ok(None)
            }
            (KeyCode::Backspace, _) => {
                self.input.pop();
                Ok(None)
            }
            (KeyCode::Enter, _) => {
                if !self.input.trim().is_empty() {
                    if let Err(e) = self.service.submit(self.input.clone()) {
                        tracing::warn!("Failed to submit message: {}", e);
                    }
                    self.input.clear();
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn render(&self, f: &mut Frame, ctx: &AppContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "SECURE CHANNEL #1",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "End-to-end encrypted • Self-destructing • Esc: Back",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("● SECURE"));
        f.render_widget(header, chunks[0]);

        self.render_messages(f, chunks[1]);

        let input = Paragraph::new(self.input.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Type encrypted message..."),
            );
        f.render_widget(input, chunks[2]);

        let footer = Paragraph::new(format!(
            "All messages self-destruct after {} seconds • End-to-end encrypted",
            ctx.config.lifespan()
        ))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
        f.render_widget(footer, chunks[3]);
    }

    fn update(&mut self, _ctx: &mut AppContext) -> Result<Option<Transition>> {
        self.snapshot = self.service.snapshot();
        Ok(None)
    }
}
