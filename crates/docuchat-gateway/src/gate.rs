//! Edge gate middleware. Runs the core decision table on every gated path.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use docuchat_core::{decide, is_gated, GateDecision, SessionChange, SessionToken};

use crate::session;
use crate::AppState;

pub async fn edge_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !is_gated(&path) {
        return next.run(request).await;
    }

    let ctx = session::context_from(&jar);
    let decision = decide(&path, ctx.token());
    tracing::debug!(%path, session = ?ctx.token(), ?decision, "Edge gate");

    match decision {
        GateDecision::PassThrough => next.run(request).await,
        GateDecision::Redirect(to) => Redirect::temporary(to).into_response(),
        GateDecision::IssueGuest(to) => {
            let change = SessionChange::Set(SessionToken::guest());
            let jar = session::apply(jar, &change, state.config.is_production());
            (jar, Redirect::temporary(to)).into_response()
        }
    }
}
