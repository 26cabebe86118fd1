mod models;
mod service;

pub use models::{Profile, ProfileUpdate};
pub use service::ProfileService;
