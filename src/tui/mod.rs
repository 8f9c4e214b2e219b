use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::time::Duration;

use crate::auth::AuthStore;
use crate::config::Config;
use crate::notification::{Notifications, ToastLevel};

pub mod chat_state;
pub mod dashboard_state;
pub mod login_state;

use chat_state::ChatState;
use dashboard_state::DashboardState;
use login_state::LoginState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Chat,
}

impl View {
    pub fn requires_auth(&self) -> bool {
        !matches!(self, View::Login)
    }
}

/// What a view asks the app to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Navigate(View),
    Quit,
}

#[derive(Debug)]
pub enum AppState {
    Login(LoginState),
    Dashboard(DashboardState),
    Chat(ChatState),
    Quit,
}

impl AppState {
    pub fn view(&self) -> Option<View> {
        match self {
            AppState::Login(_) => Some(View::Login),
            AppState::Dashboard(_) => Some(View::Dashboard),
            AppState::Chat(_) => Some(View::Chat),
            AppState::Quit => None,
        }
    }
}

/// Collaborators shared by every view
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub auth: Box<dyn AuthStore>,
    pub notifications: Notifications,
}

impl AppContext {
    pub fn new(config: Config, auth: Box<dyn AuthStore>) -> Self {
        let notifications = Notifications::new(config.toast_duration());
        Self {
            config,
            auth,
            notifications,
        }
    }
}

pub trait State {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
        ctx: &mut AppContext,
    ) -> Result<Option<Transition>>;
    fn render(&self, f: &mut Frame, ctx: &AppContext);
    fn update(&mut self, ctx: &mut AppContext) -> Result<Option<Transition>>;
}

pub struct TuiApp {
    pub state: AppState,
    pub ctx: AppContext,
}

impl TuiApp {
    /// Start on the dashboard when a session is already open, otherwise on login
    pub fn new(ctx: AppContext) -> Self {
        let mut app = Self {
            state: AppState::Quit,
            ctx,
        };
        app.navigate(View::Dashboard);
        app
    }

    /// Swap in the requested view, bouncing gated views to login when signed out.
    /// Dropping the previous view tears down anything it owned.
    pub fn navigate(&mut self, view: View) {
        let view = if view.requires_auth() && !self.ctx.auth.is_authenticated() {
            tracing::info!("Not authenticated, redirecting {:?} to login", view);
            View::Login
        } else {
            view
        };

        tracing::info!("Navigating to {:?}", view);
        self.state = match view {
            View::Login => AppState::Login(LoginState::new(&self.ctx.config)),
            View::Dashboard => AppState::Dashboard(DashboardState::new()),
            View::Chat => AppState::Chat(ChatState::new(&self.ctx.config)),
        };
    }

    fn apply(&mut self, transition: Option<Transition>) {
        match transition {
            Some(Transition::Navigate(view)) => self.navigate(view),
            Some(Transition::Quit) => self.state = AppState::Quit,
            None => {}
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        if key == KeyCode::Char('q') && modifiers == KeyModifiers::CONTROL {
            self.state = AppState::Quit;
            return Ok(());
        }

        let ctx = &mut self.ctx;
        let transition = match &mut self.state {
            AppState::Login(login_state) => login_state.handle_key_event(key, modifiers, ctx)?,
            AppState::Dashboard(dashboard_state) => {
                dashboard_state.handle_key_event(key, modifiers, ctx)?
            }
            AppState::Chat(chat_state) => chat_state.handle_key_event(key, modifiers, ctx)?,
            AppState::Quit => None,
        };

        self.apply(transition);
        Ok(())
    }

    pub fn render(&self, f: &mut Frame) {
        match &self.state {
            AppState::Login(login_state) => login_state.render(f, &self.ctx),
            AppState::Dashboard(dashboard_state) => dashboard_state.render(f, &self.ctx),
            AppState::Chat(chat_state) => chat_state.render(f, &self.ctx),
            AppState::Quit => {} // No rendering needed for quit state
        }

        render_toast(f, &self.ctx.notifications);
    }

    pub fn update(&mut self) -> Result<()> {
        self.ctx.notifications.prune();

        let ctx = &mut self.ctx;
        let transition = match &mut self.state {
            AppState::Login(login_state) => login_state.update(ctx)?,
            AppState::Dashboard(dashboard_state) => dashboard_state.update(ctx)?,
            AppState::Chat(chat_state) => chat_state.update(ctx)?,
            AppState::Quit => None,
        };

        self.apply(transition);
        Ok(())
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            // Advance timers, pick up lifecycle snapshots
            self.update()?;

            terminal.draw(|f| self.render(f))?;

            if matches!(self.state, AppState::Quit) {
                break;
            }

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code, key.modifiers)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn render_toast(f: &mut Frame, notifications: &Notifications) {
    let Some(toast) = notifications.latest() else {
        return;
    };

    let area = f.area();
    let width = area.width.min(48);
    let banner = Rect::new(
        area.x + area.width.saturating_sub(width),
        area.y,
        width,
        area.height.min(4),
    );

    let color = match toast.level {
        ToastLevel::Success => Color::Green,
        ToastLevel::Error => Color::Red,
    };

    let text = vec![
        Line::from(Span::styled(
            toast.title.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw(toast.description.as_str())),
    ];

    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

    f.render_widget(Clear, banner);
    f.render_widget(widget, banner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryAuthStore;

    fn app(authenticated: bool) -> TuiApp {
        let mut auth = MemoryAuthStore::default();
        auth.record.authenticated = authenticated;
        TuiApp::new(AppContext::new(Config::default(), Box::new(auth)))
    }

    #[test]
    fn test_starts_on_login_when_signed_out() {
        let app = app(false);
        assert_eq!(app.state.view(), Some(View::Login));
    }

    #[test]
    fn test_starts_on_dashboard_when_signed_in() {
        let app = app(true);
        assert_eq!(app.state.view(), Some(View::Dashboard));
    }

    #[test]
    fn test_gated_views_redirect_to_login() {
        let mut app = app(false);
        app.navigate(View::Chat);
        assert_eq!(app.state.view(), Some(View::Login));
        app.navigate(View::Dashboard);
        assert_eq!(app.state.view(), Some(View::Login));
    }

    #[tokio::test]
    async fn test_chat_reachable_when_signed_in() {
        let mut app = app(true);
        app.navigate(View::Chat);
        assert_eq!(app.state.view(), Some(View::Chat));

        app.handle_key_event(KeyCode::Esc, KeyModifiers::NONE).unwrap();
        assert_eq!(app.state.view(), Some(View::Dashboard));
    }

    #[test]
    fn test_ctrl_q_quits_everywhere() {
        let mut app = app(false);
        app.handle_key_event(KeyCode::Char('q'), KeyModifiers::CONTROL)
            .unwrap();
        assert!(matches!(app.state, AppState::Quit));
    }
}
