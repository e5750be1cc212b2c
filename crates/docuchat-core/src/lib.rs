//! DocuChat core library.
//! Session gate, Document QA API client (live and mock), server actions and chat panel state
//! for the DocuChat gateway.

pub mod actions;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod panel;
pub mod session;
pub mod types;
pub mod validation;

pub use actions::{Actions, Outcome};
pub use api::{build_api, ApiMode, DocumentApi, LiveApi, MockApi, Operation};
pub use cache::ChatViewCache;
pub use crate::config::GatewayConfig;
pub use error::{ActionError, ActionResult};
pub use gate::{classify, decide, is_gated, GateDecision, PageClass, APP_ROOT, LOGIN_PATH, SIGNUP_PATH};
pub use panel::{ChatPanel, ChatView, DocumentOrigin, Effect, Notice, PanelDocument, PanelDriver, PanelEvent};
pub use session::{SessionChange, SessionContext, SessionToken, GUEST_TOKEN, SESSION_COOKIE, SESSION_MAX_AGE_SECS};
pub use types::{Answer, ChatMessage, Document, DocumentId, FileUpload, QaPair, Role};
pub use validation::{Credentials, PasswordRule};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
