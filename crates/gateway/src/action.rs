//! The chat action: one submitted message in, one result out.
//!
//! - `POST /`        takes the page's form and re-renders the page
//! - `POST /v1/chat` takes JSON (`{message, chatHistory}`) or the same form
//!   and returns the [`ActionResult`] record

use axum::{
    extract::{Form, FromRequest, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::{Json, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use parley_chat::{ActionResult, parse_snapshot, parse_snapshot_value};

use crate::frontend::page_response;
use crate::{ApiError, SharedState};

/// Fields posted by the chat page.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub message: String,

    /// Client-held conversation snapshot (JSON text)
    #[serde(rename = "chat-history", default)]
    pub chat_history: Option<String>,
}

/// JSON body for `POST /v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Prior turns; an array, snapshot text, or any falsy value
    #[serde(rename = "chatHistory", default)]
    pub chat_history: serde_json::Value,
}

/// POST /: run the action for the page and render the updated conversation.
pub(crate) async fn form_action_handler(
    State(state): State<SharedState>,
    Form(form): Form<ActionForm>,
) -> Response {
    let history = match parse_snapshot(form.chat_history.as_deref()) {
        Ok(history) => history,
        Err(e) => {
            warn!(error = %e, "Rejected form action with malformed history");
            return page_response(StatusCode::BAD_REQUEST, state.pages.error(&e.to_string()));
        }
    };

    if form.message.trim().is_empty() {
        return page_response(StatusCode::OK, state.pages.chat(&history));
    }

    let result = state.completer.respond(&history, &form.message).await;
    page_response(StatusCode::OK, state.pages.chat(&result.updated_history()))
}

/// POST /v1/chat: run the action and return the result record.
pub(crate) async fn chat_handler(
    State(state): State<SharedState>,
    mut req: Request,
) -> Result<Json<ActionResult>, ApiError> {
    let (message, history) = if is_form(&req) {
        // The form extractor matches the media type case-sensitively.
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let Form(form) = Form::<ActionForm>::from_request(req, &())
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let history = parse_snapshot(form.chat_history.as_deref())?;
        (form.message, history)
    } else {
        let Json(body) = Json::<ChatRequest>::from_request(req, &())
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let history = parse_snapshot_value(body.chat_history)?;
        (body.message, history)
    };

    if message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    debug!(history_len = history.len(), "Chat action");
    Ok(Json(state.completer.respond(&history, &message).await))
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|media| {
            media
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}
