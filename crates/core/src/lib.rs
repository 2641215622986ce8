//! Eva core: login session, token claims and client configuration

pub mod config;
pub mod error;
pub mod session;
pub mod state_dir;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use session::{Claims, DecodeError, Session, SessionStore, TokenStorage};
pub use state_dir::StateDir;
