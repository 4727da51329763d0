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

//! One-shot send commands: build a submission from the configured defaults and
//! post it to the local connector's API.

use crate::config::Config;
use dx_simulator::routing::{
    HttpSubmissionGateway, SubmissionGateway, SUBMIT_REQUEST_PATH, SUBMIT_RESPONSE_PATH,
};
use dx_simulator::{
    ExchangeMessage, Identifier, MessageMetadata, MessagePayload, MIME_APPLICATION_XML,
    TRANSPORT_PROFILE_AS4,
};
use std::error::Error;
use tracing::info;

/// Command-line overrides for one send. Schemes always come from the
/// configured defaults; only the values are overridable.
pub(crate) struct SendOverrides {
    pub(crate) file: Option<String>,
    pub(crate) sender: Option<String>,
    pub(crate) receiver: Option<String>,
    pub(crate) doc_type: Option<String>,
}

pub(crate) async fn send_request(
    config: &Config,
    overrides: SendOverrides,
) -> Result<(), Box<dyn Error>> {
    submit(config, overrides, default_request_document, SUBMIT_REQUEST_PATH).await
}

pub(crate) async fn send_response(
    config: &Config,
    overrides: SendOverrides,
) -> Result<(), Box<dyn Error>> {
    submit(config, overrides, default_response_document, SUBMIT_RESPONSE_PATH).await
}

async fn submit(
    config: &Config,
    overrides: SendOverrides,
    default_document: fn() -> Vec<u8>,
    connector_path: &str,
) -> Result<(), Box<dyn Error>> {
    let document = match &overrides.file {
        Some(path) => std::fs::read(path)?,
        None => default_document(),
    };

    let defaults = &config.defaults;
    let metadata = MessageMetadata {
        sender: Identifier::new(
            &defaults.sender_scheme,
            overrides.sender.as_deref().unwrap_or(&defaults.sender),
        ),
        receiver: Identifier::new(
            &defaults.receiver_scheme,
            overrides.receiver.as_deref().unwrap_or(&defaults.receiver),
        ),
        doc_type: Identifier::new(
            &defaults.doc_type_scheme,
            overrides.doc_type.as_deref().unwrap_or(&defaults.doc_type),
        ),
        process: Identifier::new(&defaults.process_scheme, &defaults.process),
        transport_protocol: TRANSPORT_PROFILE_AS4.to_string(),
    };

    let message = ExchangeMessage {
        metadata,
        payloads: vec![MessagePayload {
            content_id: "simulator-send@dx-simulator".to_string(),
            mime_type: MIME_APPLICATION_XML.to_string(),
            data: document,
        }],
    };

    let target = format!(
        "http://localhost:{}{connector_path}",
        config.simulator_config.connector_port
    );
    info!("submitting document to {target}");
    HttpSubmissionGateway::new().submit(&target, &message).await?;
    info!("submission accepted");
    Ok(())
}

fn default_request_document() -> Vec<u8> {
    b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
      <QueryRequest id=\"simulator-default-request\">\n\
      \x20 <Query queryDefinition=\"ConceptQuery\"/>\n\
      </QueryRequest>\n"
        .to_vec()
}

fn default_response_document() -> Vec<u8> {
    b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
      <QueryResponse status=\"urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Success\">\n\
      \x20 <ResultSet/>\n\
      </QueryResponse>\n"
        .to_vec()
}
