pub mod engine;
pub mod service;
pub mod task;
pub mod types;

pub use engine::MessageEngine;
pub use service::LifecycleService;
pub use types::{ChatSnapshot, LifecycleCommand, LifecycleEvent, LifecycleSettings, Scheduled};
