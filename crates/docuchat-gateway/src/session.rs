//! Session cookie plumbing between axum-extra's `CookieJar` and the core `SessionContext`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use docuchat_core::{SessionChange, SessionContext, SessionToken, SESSION_COOKIE, SESSION_MAX_AGE_SECS};

pub fn context_from(jar: &CookieJar) -> SessionContext {
    SessionContext::from_cookie(jar.get(SESSION_COOKIE).map(|c| c.value()))
}

fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(SESSION_MAX_AGE_SECS))
        .build()
}

// Emitted even when the request carried no cookie, so logout always clears the browser's copy.
fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

pub fn apply(jar: CookieJar, change: &SessionChange, secure: bool) -> CookieJar {
    match change {
        SessionChange::Keep => jar,
        SessionChange::Set(token) => jar.add(session_cookie(token, secure)),
        SessionChange::Clear => jar.add(removal_cookie(secure)),
    }
}
