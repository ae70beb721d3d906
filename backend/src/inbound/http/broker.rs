//! Broker handlers.
//!
//! ```text
//! POST /        liveness ping
//! POST /handle  {"action":"auth","auth":{...}} | {"action":"log","log":{...}}
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, post, web};
use tracing::warn;

use crate::domain::{Action, Error, ResponseEnvelope};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::BrokerHttpState;

/// Liveness ping kept for callers that probe the broker root.
#[post("/")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(ResponseEnvelope::success(
        "Broker service is up and running",
        None,
    ))
}

/// Decode one action, route it, and answer with the downstream status.
#[post("/handle")]
pub async fn handle_submission(
    state: web::Data<BrokerHttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let action = Action::decode(&body).map_err(|err| Error::invalid_request(err.to_string()))?;
    let response = state.dispatcher.dispatch(action).await?;

    let status = StatusCode::from_u16(response.status).unwrap_or_else(|_| {
        warn!(status = response.status, "downstream returned invalid status");
        StatusCode::BAD_GATEWAY
    });
    Ok(HttpResponse::build(status).json(response.body))
}
