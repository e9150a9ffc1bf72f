use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, http::StatusCode, response::Html};
use tokio::sync::{Mutex, oneshot};

use crate::types::RedirectParams;

/// Holds the sender for the one redirect the listener will ever deliver.
pub type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<RedirectParams>>>>;

const SIGNED_IN_PAGE: &str =
    "<html><body><h2>Logged in. You can close this window.</h2></body></html>";

const NOT_COMPLETED_PAGE: &str = "<html><body><h2>Sign-in was not completed.</h2>\
     <p>Return to the terminal and try again.</p></body></html>";

const ALREADY_HANDLED_PAGE: &str =
    "<html><body><h4>This sign-in was already handled. You can close this window.</h4></body></html>";

/// Captures the authorization redirect's query parameters.
///
/// The first request hands its parameters to the waiting login, whatever they
/// contain; inspecting `error`, `state` and `code` is the caller's job.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(slot): Extension<CallbackSlot>,
) -> Html<&'static str> {
    let Some(sender) = slot.lock().await.take() else {
        return Html(ALREADY_HANDLED_PAGE);
    };

    let params = RedirectParams::new(params);
    let page = if params.error().is_some() || params.code().is_none() {
        NOT_COMPLETED_PAGE
    } else {
        SIGNED_IN_PAGE
    };

    if sender.send(params).is_err() {
        tracing::debug!("redirect arrived after the login stopped waiting");
    }

    Html(page)
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
