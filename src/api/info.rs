/// Entity info endpoint
use crate::{context::AppContext, error::WhoisResult, lookup::EntityDescriptor};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct InfoParams {
    /// Username, numeric id or t.me link
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    #[serde(flatten)]
    pub entity: EntityDescriptor,
}

pub fn routes() -> Router<AppContext> {
    Router::new().route("/info", get(get_info))
}

/// Resolve a user, bot, group or channel
///
/// A missing `username` parameter is treated like an empty identifier.
pub async fn get_info(
    State(ctx): State<AppContext>,
    Query(params): Query<InfoParams>,
) -> WhoisResult<Json<InfoResponse>> {
    let raw = params.username.unwrap_or_default();

    let outcome = ctx.engine.resolve(&raw, ctx.session.as_ref()).await;
    tracing::info!(identifier = %raw, outcome = outcome.label(), "Entity lookup finished");

    let entity = outcome.into_result()?;

    Ok(Json(InfoResponse {
        success: true,
        entity,
    }))
}
