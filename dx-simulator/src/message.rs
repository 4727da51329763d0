/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};

pub const MIME_APPLICATION_XML: &str = "application/xml";
pub const MIME_APPLICATION_PDF: &str = "application/pdf";
pub const MIME_APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Transport profile carried in outgoing metadata when none is configured.
pub const TRANSPORT_PROFILE_AS4: &str = "bdxr-transport-ebms3-as4-v1p0";

/// Addressing and routing metadata of one exchanged message.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MessageMetadata {
    pub sender: Identifier,
    pub receiver: Identifier,
    pub doc_type: Identifier,
    pub process: Identifier,
    pub transport_protocol: String,
}

impl MessageMetadata {
    /// Returns the addressing used for a reply: sender and receiver swapped,
    /// document-type and process identifiers unchanged.
    pub fn inverted(&self) -> Self {
        Self {
            sender: self.receiver.clone(),
            receiver: self.sender.clone(),
            doc_type: self.doc_type.clone(),
            process: self.process.clone(),
            transport_protocol: self.transport_protocol.clone(),
        }
    }
}

/// One payload of an exchanged message. The first payload of a message is the
/// primary document; any further payloads are attachments.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MessagePayload {
    pub content_id: String,
    pub mime_type: String,
    #[serde(with = "payload_data")]
    pub data: Vec<u8>,
}

/// A message as it crosses the simulated transport: addressing metadata plus an
/// ordered payload sequence. Built per send/receive event and never shared.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExchangeMessage {
    pub metadata: MessageMetadata,
    pub payloads: Vec<MessagePayload>,
}

impl ExchangeMessage {
    pub fn primary_payload(&self) -> Option<&MessagePayload> {
        self.payloads.first()
    }
}

/// Infers a MIME type from payload content. Mirrors what a real gateway would
/// derive for attachments whose type is not declared by the provider.
pub fn sniff_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"%PDF") {
        return MIME_APPLICATION_PDF;
    }
    let trimmed = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|start| &data[start..])
        .unwrap_or_default();
    if trimmed.starts_with(b"<") {
        return MIME_APPLICATION_XML;
    }
    MIME_APPLICATION_OCTET_STREAM
}

/// Payload bytes travel base64-encoded inside the JSON submission envelope.
mod payload_data {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
