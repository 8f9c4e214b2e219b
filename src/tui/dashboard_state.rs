use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::tui::{AppContext, State, Transition, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardOption {
    EnterChat,
    Logout,
}

/// Static figures shown on the dashboard cards
#[derive(Debug, Clone)]
pub struct OperatorStats {
    pub online: bool,
    pub active_users: u32,
    pub messages_sent: u32,
    pub messages_received: u32,
    pub rank: &'static str,
    pub operator_id: &'static str,
    pub clearance: &'static str,
}

impl Default for OperatorStats {
    fn default() -> Self {
        Self {
            online: true,
            active_users: 7,
            messages_sent: 142,
            messages_received: 198,
            rank: "ALPHA-1",
            operator_id: "TCS-2847",
            clearance: "CLASSIFIED",
        }
    }
}

#[derive(Debug)]
pub struct DashboardState {
    pub selected_option: DashboardOption,
    pub stats: OperatorStats,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            selected_option: DashboardOption::EnterChat,
            stats: OperatorStats::default(),
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn logout(&mut self, ctx: &mut AppContext) -> Result<Option<Transition>> {
        if let Err(e) = ctx.auth.set_authenticated(false) {
            tracing::warn!("Failed to clear session: {:#}", e);
            ctx.notifications
                .push_error("Logout Failed", "Could not clear the session");
            return Ok(None);
        }
        ctx.notifications
            .push_success("Logout Successful", "Secure connection terminated");
        tracing::info!("Operator logged out");
        Ok(Some(Transition::Navigate(View::Login)))
    }

    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(area);

        let link = if self.stats.online { "ONLINE" } else { "OFFLINE" };
        let entries = [
            ("CONNECTION", link.to_string()),
            ("ACTIVE USERS", self.stats.active_users.to_string()),
            ("SENT", self.stats.messages_sent.to_string()),
            ("RECEIVED", self.stats.messages_received.to_string()),
        ];

        for ((title, value), card) in entries.into_iter().zip(cards.iter()) {
            let widget = Paragraph::new(Span::styled(
                value,
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(widget, *card);
        }
    }

    fn render_menu(&self, f: &mut Frame, area: Rect) {
        let selected_style = Style::default().fg(Color::Yellow).bg(Color::Blue);
        let normal_style = Style::default().fg(Color::White);

        let items: Vec<ListItem> = [
            (DashboardOption::EnterChat, "Enter Secure Channel"),
            (DashboardOption::Logout, "Logout"),
        ]
        .into_iter()
        .map(|(option, label)| {
            let style = if option == self.selected_option {
                selected_style
            } else {
                normal_style
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();

        let menu = List::new(items).block(Block::default().borders(Borders::ALL).title("Operations"));
        f.render_widget(menu, area.inner(Margin::new(2, 1)));
    }
}

impl State for DashboardState {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        _modifiers: KeyModifiers,
        ctx: &mut AppContext,
    ) -> Result<Option<Transition>> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_option = DashboardOption::EnterChat;
                Ok(None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_option = DashboardOption::Logout;
                Ok(None)
            }
            KeyCode::Enter => match self.selected_option {
                DashboardOption::EnterChat => Ok(Some(Transition::Navigate(View::Chat))),
                DashboardOption::Logout => self.logout(ctx),
            },
            _ => Ok(None),
        }
    }

    fn render(&self, f: &mut Frame, _ctx: &AppContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.area());

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                "MISSION CONTROL",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Operator Dashboard • Classified Access",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        self.render_stats(f, chunks[1]);
        self.render_menu(f, chunks[2]);

        let status = Paragraph::new(format!(
            "RANK: {}  |  ID: {}  |  CLEARANCE: {}",
            self.stats.rank, self.stats.operator_id, self.stats.clearance
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Operator Status"));
        f.render_widget(status, chunks[3]);

        let help = Paragraph::new("↑/↓ or j/k: Navigate, Enter: Select, Ctrl+Q: Quit")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(help, chunks[4]);
    }

    fn update(&mut self, _ctx: &mut AppContext) -> Result<Option<Transition>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryAuthStore, ReadOnlyAuthStore};
    use crate::config::Config;
    use crate::notification::ToastLevel;

    fn signed_in() -> AppContext {
        let mut auth = MemoryAuthStore::default();
        auth.record.authenticated = true;
        AppContext::new(Config::default(), Box::new(auth))
    }

    #[test]
    fn test_enter_chat() -> Result<()> {
        let mut ctx = signed_in();
        let mut state = DashboardState::new();

        let transition = state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;
        assert_eq!(transition, Some(Transition::Navigate(View::Chat)));
        assert!(ctx.auth.is_authenticated());
        Ok(())
    }

    #[test]
    fn test_logout_clears_flag() -> Result<()> {
        let mut ctx = signed_in();
        let mut state = DashboardState::new();

        state.handle_key_event(KeyCode::Down, KeyModifiers::NONE, &mut ctx)?;
        let transition = state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;

        assert_eq!(transition, Some(Transition::Navigate(View::Login)));
        assert!(!ctx.auth.is_authenticated());
        assert_eq!(
            ctx.notifications.latest().unwrap().title,
            "Logout Successful"
        );
        Ok(())
    }

    #[test]
    fn test_failed_logout_stays_on_dashboard() -> Result<()> {
        let auth = ReadOnlyAuthStore {
            authenticated: true,
        };
        let mut ctx = AppContext::new(Config::default(), Box::new(auth));
        let mut state = DashboardState::new();

        state.handle_key_event(KeyCode::Down, KeyModifiers::NONE, &mut ctx)?;
        let transition = state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;

        assert_eq!(transition, None);
        let toast = ctx.notifications.latest().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.title, "Logout Failed");
        Ok(())
    }
}
