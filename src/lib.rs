pub mod auth;
pub mod config;
pub mod entities;
pub mod lifecycle;
pub mod notification;
pub mod tui;
