mod models;
mod service;
mod store;

pub use models::{AdminSession, Credentials, OAuthProvider, Session, SignUpOutcome, User};
pub use service::AuthService;
pub use store::SessionStore;
