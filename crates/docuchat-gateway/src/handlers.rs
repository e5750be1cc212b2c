//! Page routes and the `/api/*` action endpoints.
//!
//! Action endpoints always answer 200 with `{"success": ..}`; only bodies the extractors cannot
//! parse are rejected.

use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use docuchat_core::{
    ActionResult, Answer, ChatPanel, ChatView, Credentials, Document, DocumentId, FileUpload,
    QaPair, APP_ROOT, LOGIN_PATH,
};
use serde::Deserialize;

use crate::session;
use crate::AppState;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn root() -> Redirect {
    Redirect::temporary(APP_ROOT)
}

pub async fn login_page() -> Html<&'static str> {
    const LOGIN: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/login.html"));
    Html(LOGIN)
}

pub async fn signup_page() -> Html<&'static str> {
    const SIGNUP: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/signup.html"));
    Html(SIGNUP)
}

/// Initial chat view: guest flag, history (cached per token) and the documents it mentions.
pub async fn chat_page(State(state): State<AppState>, jar: CookieJar) -> Json<ChatView> {
    let ctx = session::context_from(&jar);
    let history = state.actions.chat_view_history(&ctx).await;
    Json(ChatPanel::new(history, ctx.is_guest()).view())
}

/// Login/signup body, accepted as JSON or as an HTML form post.
pub struct CredentialsInput(pub Credentials);

#[async_trait]
impl<S> FromRequest<S> for CredentialsInput
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(credentials) = Json::<Credentials>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(credentials))
        } else {
            let Form(credentials) = Form::<Credentials>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(credentials))
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    CredentialsInput(credentials): CredentialsInput,
) -> (CookieJar, Json<ActionResult<()>>) {
    let ctx = session::context_from(&jar);
    let outcome = state.actions.login(&ctx, &credentials).await;
    let jar = session::apply(jar, &outcome.session, state.config.is_production());
    (jar, Json(outcome.result))
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    CredentialsInput(credentials): CredentialsInput,
) -> (CookieJar, Json<ActionResult<()>>) {
    let ctx = session::context_from(&jar);
    let outcome = state.actions.signup(&ctx, &credentials).await;
    let jar = session::apply(jar, &outcome.session, state.config.is_production());
    (jar, Json(outcome.result))
}

/// Clears the session and sends the browser to the login page (303).
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let ctx = session::context_from(&jar);
    let change = state.actions.logout(&ctx);
    let jar = session::apply(jar, &change, state.config.is_production());
    (jar, Redirect::to(LOGIN_PATH))
}

pub async fn history(State(state): State<AppState>, jar: CookieJar) -> Json<ActionResult<Vec<QaPair>>> {
    let ctx = session::context_from(&jar);
    Json(state.actions.history(&ctx).await)
}

/// Reads the `file` part; any other parts are ignored.
async fn read_file_part(mut multipart: Multipart) -> Result<Option<FileUpload>, MultipartError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some(FileUpload::new(file_name, mime_type, bytes.to_vec()));
    }
    Ok(upload)
}

pub async fn upload(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Json<ActionResult<Document>>, MultipartError> {
    let ctx = session::context_from(&jar);
    let file = read_file_part(multipart).await?;
    Ok(Json(state.actions.upload(&ctx, file).await))
}

#[derive(Debug, Deserialize)]
pub struct AskInput {
    pub document_id: DocumentId,
    #[serde(default)]
    pub question: String,
}

pub async fn ask(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<AskInput>,
) -> Json<ActionResult<Answer>> {
    let ctx = session::context_from(&jar);
    Json(state.actions.ask(&ctx, input.document_id, &input.question).await)
}
