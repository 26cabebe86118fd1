mod models;
mod service;

pub use models::{ContactSubmission, NewContactSubmission};
pub use service::{ContactService, InboxFilter};
