use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};

use crate::auth::Credentials;
use crate::config::Config;
use crate::tui::{AppContext, State, Transition, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    RememberMe,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Username => Field::Password,
            Field::Password => Field::RememberMe,
            Field::RememberMe => Field::Username,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Username => Field::RememberMe,
            Field::Password => Field::Username,
            Field::RememberMe => Field::Password,
        }
    }
}

/// Simulated handshake: a short "authenticating" pause, then the unlock animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Editing,
    Authenticating { since: Instant },
    Unlocked { since: Instant },
}

#[derive(Debug)]
pub struct LoginState {
    pub credentials: Credentials,
    pub remember_me: bool,
    pub focus: Field,
    pub phase: LoginPhase,
    auth_delay: Duration,
    unlock_delay: Duration,
}

impl LoginState {
    pub fn new(config: &Config) -> Self {
        Self {
            credentials: Credentials {
                username: config.username.clone(),
                password: String::new(),
            },
            remember_me: false,
            focus: Field::Username,
            phase: LoginPhase::Editing,
            auth_delay: config.auth_delay(),
            unlock_delay: config.unlock_delay(),
        }
    }

    fn submit(&mut self, ctx: &mut AppContext) {
        match self.credentials.validate() {
            Ok(()) => {
                tracing::info!("Authenticating operator {}", self.credentials.username);
                self.phase = LoginPhase::Authenticating {
                    since: Instant::now(),
                };
            }
            Err(e) => {
                tracing::warn!("Login rejected: {}", e);
                ctx.notifications.push_error("Access Denied", &e.to_string());
            }
        }
    }

    fn open_session(&self, ctx: &mut AppContext) -> Result<()> {
        if self.remember_me {
            ctx.auth.set_remember_me(true)?;
        }
        ctx.auth.set_authenticated(true)
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Username => Some(&mut self.credentials.username),
            Field::Password => Some(&mut self.credentials.password),
            Field::RememberMe => None,
        }
    }
}

impl State for LoginState {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
        ctx: &mut AppContext,
    ) -> Result<Option<Transition>> {
        if self.phase != LoginPhase::Editing {
            return Ok(None);
        }

        match key {
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Enter => self.submit(ctx),
            KeyCode::Char(' ') if self.focus == Field::RememberMe => {
                self.remember_me = !self.remember_me;
            }
            KeyCode::Char(c) if matches!(modifiers, KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                if let Some(input) = self.focused_input() {
                    input.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.focused_input() {
                    input.pop();
                }
            }
            _ => {}
        }

        Ok(None)
    }

    fn render(&self, f: &mut Frame, _ctx: &AppContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        let badge = match self.phase {
            LoginPhase::Unlocked { .. } => "[ UNLOCKED ]",
            _ => "[ SHIELD ]",
        };
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{badge} SECURE ACCESS"),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "TACTICAL COMMUNICATION SYSTEM",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, chunks[0]);

        let masked = "•".repeat(self.credentials.password.chars().count());
        render_field(
            f,
            chunks[1],
            "Operator ID",
            &self.credentials.username,
            self.focus == Field::Username,
        );
        render_field(
            f,
            chunks[2],
            "Access Code",
            &masked,
            self.focus == Field::Password,
        );

        let checkbox = if self.remember_me { "[x]" } else { "[ ]" };
        render_field(
            f,
            chunks[3],
            "Options",
            &format!("{checkbox} Remember credentials"),
            self.focus == Field::RememberMe,
        );

        let (status, color) = match self.phase {
            LoginPhase::Editing => ("SECURE LOGIN (Enter)", Color::Green),
            LoginPhase::Authenticating { .. } => ("AUTHENTICATING...", Color::Yellow),
            LoginPhase::Unlocked { .. } => ("ACCESS GRANTED", Color::Green),
        };
        let button = Paragraph::new(status)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(button, chunks[4]);

        let help = Paragraph::new("Tab/↑/↓: Move, Space: Toggle, Enter: Login, Ctrl+Q: Quit")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(help, chunks[6]);
    }

    fn update(&mut self, ctx: &mut AppContext) -> Result<Option<Transition>> {
        match self.phase {
            LoginPhase::Editing => Ok(None),
            LoginPhase::Authenticating { since } => {
                if since.elapsed() >= self.auth_delay {
                    self.phase = LoginPhase::Unlocked {
                        since: Instant::now(),
                    };
                }
                Ok(None)
            }
            LoginPhase::Unlocked { since } => {
                if since.elapsed() < self.unlock_delay {
                    return Ok(None);
                }

                if let Err(e) = self.open_session(ctx) {
                    tracing::warn!("Failed to save session: {:#}", e);
                    ctx.notifications
                        .push_error("Access Denied", "Could not save the session");
                    self.phase = LoginPhase::Editing;
                    return Ok(None);
                }
                ctx.notifications
                    .push_success("Access Granted", "Secure connection established");
                tracing::info!("Operator {} authenticated", self.credentials.username);

                Ok(Some(Transition::Navigate(View::Dashboard)))
            }
        }
    }
}

fn render_field(f: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let field = Paragraph::new(value.to_string())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(field, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryAuthStore, ReadOnlyAuthStore};
    use crate::notification::ToastLevel;

    fn ctx() -> AppContext {
        let config = Config {
            username: String::new(),
            auth_delay_ms: 0,
            unlock_delay_ms: 0,
            ..Config::default()
        };
        AppContext::new(config, Box::new(MemoryAuthStore::default()))
    }

    fn type_text(state: &mut LoginState, text: &str, ctx: &mut AppContext) {
        for c in text.chars() {
            state
                .handle_key_event(KeyCode::Char(c), KeyModifiers::NONE, ctx)
                .unwrap();
        }
    }

    #[test]
    fn test_missing_fields_raise_error_toast() -> Result<()> {
        let mut ctx = ctx();
        let mut state = LoginState::new(&ctx.config);

        state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;

        assert_eq!(state.phase, LoginPhase::Editing);
        let toast = ctx.notifications.latest().unwrap();
        assert_eq!(toast.title, "Access Denied");
        assert_eq!(toast.description, "All fields are required for authentication");
        assert!(!ctx.auth.is_authenticated());
        Ok(())
    }

    #[test]
    fn test_successful_login_sets_flag_and_navigates() -> Result<()> {
        let mut ctx = ctx();
        let mut state = LoginState::new(&ctx.config);

        type_text(&mut state, "ghost", &mut ctx);
        state.handle_key_event(KeyCode::Tab, KeyModifiers::NONE, &mut ctx)?;
        type_text(&mut state, "s3cret", &mut ctx);
        state.handle_key_event(KeyCode::Tab, KeyModifiers::NONE, &mut ctx)?;
        state.handle_key_event(KeyCode::Char(' '), KeyModifiers::NONE, &mut ctx)?;
        state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;

        assert_eq!(state.credentials.username, "ghost");
        assert_eq!(state.credentials.password, "s3cret");
        assert!(state.remember_me);
        assert!(matches!(state.phase, LoginPhase::Authenticating { .. }));

        // authenticating -> unlocked
        assert_eq!(state.update(&mut ctx)?, None);
        assert!(matches!(state.phase, LoginPhase::Unlocked { .. }));

        // unlocked -> dashboard
        let transition = state.update(&mut ctx)?;
        assert_eq!(transition, Some(Transition::Navigate(View::Dashboard)));
        assert!(ctx.auth.is_authenticated());
        assert_eq!(ctx.notifications.latest().unwrap().title, "Access Granted");
        Ok(())
    }

    #[test]
    fn test_input_ignored_while_authenticating() -> Result<()> {
        let mut ctx = ctx();
        let mut state = LoginState::new(&ctx.config);
        state.credentials.username = "ghost".to_string();
        state.credentials.password = "pw".to_string();
        state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;

        type_text(&mut state, "zzz", &mut ctx);
        assert_eq!(state.credentials.username, "ghost");
        Ok(())
    }

    #[test]
    fn test_modified_chars_are_not_typed() -> Result<()> {
        let mut ctx = ctx();
        let mut state = LoginState::new(&ctx.config);

        state.handle_key_event(KeyCode::Char('a'), KeyModifiers::CONTROL, &mut ctx)?;
        state.handle_key_event(KeyCode::Char('x'), KeyModifiers::ALT, &mut ctx)?;
        state.handle_key_event(KeyCode::Char('G'), KeyModifiers::SHIFT, &mut ctx)?;
        assert_eq!(state.credentials.username, "G");
        Ok(())
    }

    #[test]
    fn test_username_starts_empty() {
        let state = LoginState::new(&Config::default());
        assert!(state.credentials.username.is_empty());
    }

    #[test]
    fn test_failed_session_write_stays_on_login() -> Result<()> {
        let mut ctx = AppContext::new(
            Config {
                auth_delay_ms: 0,
                unlock_delay_ms: 0,
                ..Config::default()
            },
            Box::new(ReadOnlyAuthStore::default()),
        );
        let mut state = LoginState::new(&ctx.config);
        state.credentials.username = "ghost".to_string();
        state.credentials.password = "pw".to_string();
        state.handle_key_event(KeyCode::Enter, KeyModifiers::NONE, &mut ctx)?;

        state.update(&mut ctx)?;
        let transition = state.update(&mut ctx)?;

        assert_eq!(transition, None);
        assert_eq!(state.phase, LoginPhase::Editing);
        assert!(!ctx.auth.is_authenticated());
        let toast = ctx.notifications.latest().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        Ok(())
    }

    #[test]
    fn test_space_types_into_text_fields() {
        let mut ctx = ctx();
        let mut state = LoginState::new(&ctx.config);
        type_text(&mut state, "a b", &mut ctx);
        assert_eq!(state.credentials.username, "a b");
        assert!(!state.remember_me);
    }
}
