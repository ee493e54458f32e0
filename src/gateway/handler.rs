use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::inference::InferenceTransport;
use crate::telegram::{ChatSender, ReplyMode, Update, answer_update};

/// `POST /telegram_webhook`.
///
/// Any well-formed update is acknowledged with `{"ok": true}`, including ones that fail to
/// get a reply, so Telegram does not redeliver them.
#[instrument(skip(state, body), fields(update_id = tracing::field::Empty))]
pub async fn telegram_webhook_handler<T, S>(
    State(state): State<HandlerState<T, S>>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError>
where
    T: InferenceTransport + 'static,
    S: ChatSender + ?Sized + 'static,
{
    let update: Update = serde_json::from_slice(&body)?;
    tracing::Span::current().record("update_id", update.update_id);

    match answer_update(
        &state.relay,
        state.sender.as_ref(),
        &update,
        ReplyMode::Direct,
        state.prompt_limit,
    )
    .await
    {
        Ok(outcome) => debug!(?outcome, "update handled"),
        Err(e) => warn!(error = %e, "failed to deliver reply"),
    }

    Ok(Json(json!({ "ok": true })))
}
