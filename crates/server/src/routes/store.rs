use std::collections::HashMap;

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use common::types::Envelope;
use service::creations::domain::{Creation, CreationInput, LoadStatus};

use crate::errors::ApiError;
use crate::observability::{COMMITS_TOTAL, COMMIT_DURATION, COMMIT_FAILURES_TOTAL, ROWS_COMMITTED_TOTAL};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct SetRequest {
    pub creation_id: String,
    #[serde(default)]
    pub value: CreationInput,
}

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub creation_id: String,
}

#[derive(Serialize)]
pub struct ValueBody { pub value: Option<Creation> }

#[derive(Serialize)]
pub struct ItemsBody { pub items: HashMap<String, Creation> }

#[derive(Serialize)]
pub struct CommittedBody { pub committed: HashMap<String, Creation> }

#[derive(Serialize)]
pub struct HistoryBody { pub history: HashMap<String, Creation>, pub load: LoadStatus }

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Stage a creation.
pub async fn set(
    State(state): State<ServerState>,
    payload: Result<Json<SetRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    state.store.set(&req.creation_id, req.value).await?;
    Ok(Json(Envelope::empty()))
}

/// Staged value if any, else the committed one, else `null`.
pub async fn get(
    State(state): State<ServerState>,
    query: Result<Query<IdRequest>, QueryRejection>,
) -> ApiResult<ValueBody> {
    let Query(req) = query?;
    let value = state.store.get(&req.creation_id).await;
    Ok(Json(Envelope::ok(ValueBody { value })))
}

/// Unstage a creation; committed creations are left alone.
pub async fn delete(
    State(state): State<ServerState>,
    payload: Result<Json<IdRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    state.store.delete(&req.creation_id).await;
    Ok(Json(Envelope::empty()))
}

pub async fn cart(State(state): State<ServerState>) -> Json<Envelope<ItemsBody>> {
    Json(Envelope::ok(ItemsBody { items: state.store.snapshot().await }))
}

/// Persist everything staged. 502 when the backing store rejects the batch.
pub async fn commit(State(state): State<ServerState>) -> ApiResult<CommittedBody> {
    let timer = COMMIT_DURATION.start_timer();
    let res = state.store.commit().await;
    timer.observe_duration();
    match res {
        Ok(report) => {
            COMMITS_TOTAL.inc();
            ROWS_COMMITTED_TOTAL.inc_by(report.len() as u64);
            Ok(Json(Envelope::ok(CommittedBody { committed: report.committed })))
        }
        Err(e) => {
            COMMIT_FAILURES_TOTAL.inc();
            Err(e.into())
        }
    }
}

pub async fn rollback(State(state): State<ServerState>) -> Json<Envelope<()>> {
    state.store.rollback().await;
    Json(Envelope::empty())
}

pub async fn history(State(state): State<ServerState>) -> Json<Envelope<HistoryBody>> {
    Json(Envelope::ok(HistoryBody {
        history: state.store.history().await,
        load: state.store.load_status().clone(),
    }))
}
