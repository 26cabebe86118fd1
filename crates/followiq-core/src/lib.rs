pub mod auth;
pub mod backend;
pub mod config;
pub mod contact;
pub mod error;
pub mod profile;

pub use backend::{Backend, MemoryBackend, RestBackend};
pub use config::{AppConfig, EasingType, MotionConfig};
pub use error::{Error, Result};
