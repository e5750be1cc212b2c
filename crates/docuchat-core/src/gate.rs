//! Edge gate: route/session classifier run before every gated request.
//!
//! | session            | page class | decision                          |
//! |--------------------|------------|-----------------------------------|
//! | guest              | auth       | pass through                      |
//! | non-guest          | auth       | redirect to `/chat`               |
//! | any                | `/`        | redirect to `/chat`               |
//! | any                | app        | pass through                      |
//! | none               | app        | redirect to `/chat` + guest token |
//! | none               | auth/other | pass through                      |

use crate::session::SessionToken;

pub const APP_ROOT: &str = "/chat";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    Auth,
    App,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    PassThrough,
    Redirect(&'static str),
    /// Redirect and set the guest session cookie on the same response.
    IssueGuest(&'static str),
}

pub fn classify(path: &str) -> PageClass {
    if path == LOGIN_PATH || path == SIGNUP_PATH {
        PageClass::Auth
    } else if path == "/" || path.starts_with(APP_ROOT) {
        PageClass::App
    } else {
        PageClass::Other
    }
}

/// Paths the gate runs on: `/`, the auth pages, `/chat/**` and `/api/**`.
pub fn is_gated(path: &str) -> bool {
    path == "/"
        || path == LOGIN_PATH
        || path == SIGNUP_PATH
        || under(path, APP_ROOT)
        || under(path, "/api")
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn decide(path: &str, token: Option<&SessionToken>) -> GateDecision {
    let class = classify(path);
    match token {
        Some(token) => {
            if class == PageClass::Auth {
                if token.is_guest() {
                    return GateDecision::PassThrough;
                }
                return GateDecision::Redirect(APP_ROOT);
            }
            if path == "/" {
                return GateDecision::Redirect(APP_ROOT);
            }
            GateDecision::PassThrough
        }
        None if class == PageClass::App => GateDecision::IssueGuest(APP_ROOT),
        None => GateDecision::PassThrough,
    }
}
