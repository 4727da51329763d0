/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! HTTP surface of the simulator process: the mock DC and DP party endpoints,
//! the exchange outbox the connector submits outgoing messages to, and the
//! discovery query surface backed by the index engine.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dx_simulator::discovery::{
    DatasetDescriptor, DatasetFilter, DiscoveryEngine, DiscoveryProvider, TracingErrorSink,
};
use dx_simulator::routing::{
    build_reply, AutoResponder, SubmissionGateway, SUBMIT_ERROR_PATH, SUBMIT_RESPONSE_PATH,
};
use dx_simulator::{DocumentKind, DocumentModel, ExchangeMessage, ExchangeRouter, Identifier};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) struct AppState {
    pub(crate) engine: Arc<DiscoveryEngine>,
    pub(crate) router: Arc<ExchangeRouter>,
    pub(crate) document_model: Arc<dyn DocumentModel>,
    pub(crate) responder: Arc<dyn AutoResponder>,
    pub(crate) gateway: Arc<dyn SubmissionGateway>,
    pub(crate) connector_port: u16,
}

pub(crate) fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/exchange/outbox", post(exchange_outbox))
        .route("/to-dc", post(to_dc))
        .route("/to-dp", post(to_dp))
        .route("/discovery/participants", get(discovery_participants))
        .route("/discovery/datasets", get(discovery_datasets))
        .with_state(state)
}

/// Entry point of the simulated message-exchange layer: the connector posts an
/// outgoing message here and routing proceeds on its own task.
async fn exchange_outbox(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    match serde_json::from_slice::<ExchangeMessage>(&body) {
        Ok(message) => {
            state.router.dispatch(message);
            StatusCode::ACCEPTED
        }
        Err(err) => {
            warn!("exchange outbox received an unparseable envelope: {err}");
            StatusCode::BAD_REQUEST
        }
    }
}

/// Mock DC party endpoint: logs what arrived and acknowledges.
async fn to_dc(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    let message: ExchangeMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(err) => {
            warn!("DC endpoint received an unparseable envelope: {err}");
            return StatusCode::BAD_REQUEST;
        }
    };

    info!(
        "DC received message from {} with {} payload(s)",
        message.metadata.sender,
        message.payloads.len()
    );
    for payload in &message.payloads {
        debug!(
            "DC received payload content id {} mime type {}",
            payload.content_id, payload.mime_type
        );
    }
    match message
        .primary_payload()
        .map(|payload| state.document_model.classify(&payload.data))
    {
        Some(DocumentKind::Response) => info!("DC received a response document"),
        Some(DocumentKind::ErrorResponse) => info!("DC received an error response document"),
        _ => warn!("DC unable to classify the supplied document"),
    }
    StatusCode::OK
}

/// Mock DP party endpoint: acknowledges immediately and produces the reply on
/// its own task, so a slow provider never stalls the submitter.
async fn to_dp(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    let message: ExchangeMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(err) => {
            warn!("DP endpoint received an unparseable envelope: {err}");
            return StatusCode::BAD_REQUEST;
        }
    };

    info!(
        "DP received message from {} for {}",
        message.metadata.sender, message.metadata.doc_type
    );
    tokio::spawn(async move {
        let Some(primary) = message.payloads.first() else {
            warn!("DP received a message without a payload; nothing to answer");
            return;
        };
        let outcome = state.responder.respond(primary, &message.metadata).await;
        let content_id = format!("{}@dx-simulator", Uuid::new_v4());
        let reply = build_reply(
            state.document_model.as_ref(),
            outcome,
            &message.metadata,
            &content_id,
        );
        let path = match reply.kind {
            DocumentKind::ErrorResponse => SUBMIT_ERROR_PATH,
            _ => SUBMIT_RESPONSE_PATH,
        };
        let target = format!("http://localhost:{}{}", state.connector_port, path);
        info!("DP submitting its reply to {target}");
        if let Err(err) = state.gateway.submit(&target, &reply.message).await {
            warn!("DP reply submission failed: {err}");
        }
    });
    StatusCode::OK
}

#[derive(Deserialize)]
struct DiscoveryQuery {
    dataset_type: String,
    country_code: Option<String>,
    dp_type: Option<String>,
}

/// Directory query surface of the simulated infrastructure.
async fn discovery_participants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoveryQuery>,
) -> Json<Vec<Identifier>> {
    let participants = state
        .engine
        .lookup_participants(query.country_code.as_deref(), &query.dataset_type);
    Json(participants.into_iter().collect())
}

/// Dataset-description query surface. Country-code and DP-type filters are
/// mutually exclusive.
async fn discovery_datasets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoveryQuery>,
) -> Result<Json<Vec<DatasetDescriptor>>, StatusCode> {
    let filter = match (query.country_code, query.dp_type) {
        (Some(_), Some(_)) => return Err(StatusCode::BAD_REQUEST),
        (Some(country), None) => DatasetFilter::Country(country),
        (None, Some(dp_type)) => DatasetFilter::DpType(dp_type),
        (None, None) => DatasetFilter::None,
    };
    Ok(Json(state.engine.query_datasets(
        &query.dataset_type,
        &filter,
        &TracingErrorSink,
    )))
}
