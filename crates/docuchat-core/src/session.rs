//! Session token carried in the `docuchat_access_token` cookie.
//!
//! There is no server-side session store: the token is an opaque bearer credential whose meaning
//! belongs to the Document QA API. The only value this crate interprets is [`GUEST_TOKEN`].

use std::fmt;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "docuchat_access_token";

/// Reserved token issued to anonymous visitors by the edge gate.
pub const GUEST_TOKEN: &str = "mock_token_guest";

/// One week.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn guest() -> Self {
        Self(GUEST_TOKEN.to_string())
    }

    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_TOKEN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Bearer credentials stay out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_guest() {
            f.write_str("SessionToken(guest)")
        } else {
            f.write_str("SessionToken(***)")
        }
    }
}

/// Per-request session state, handed explicitly to every action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<SessionToken>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    /// Builds the context from a raw cookie value. A present but empty cookie still counts as
    /// a session.
    pub fn from_cookie(value: Option<&str>) -> Self {
        Self {
            token: value.map(SessionToken::new),
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn is_guest(&self) -> bool {
        self.token.as_ref().is_some_and(SessionToken::is_guest)
    }
}

/// Cookie mutation requested by an action; applied by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Keep,
    Set(SessionToken),
    Clear,
}
