/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
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

//! Canonical structured field keys and value-format helpers.

use crate::message::MessageMetadata;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const CORRELATION: &str = "correlation";

pub const MSG_KIND: &str = "msg_kind";
pub const SENDER: &str = "sender";
pub const RECEIVER: &str = "receiver";
pub const DOC_TYPE: &str = "doc_type";
pub const TARGET: &str = "target";

pub const NONE: &str = "none";

/// Pre-formatted addressing fields for one message, shared by the router's
/// attempt/ok/failed events.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressingFields {
    pub sender: String,
    pub receiver: String,
    pub doc_type: String,
}

impl AddressingFields {
    pub fn from_metadata(metadata: &MessageMetadata) -> Self {
        Self {
            sender: metadata.sender.to_string(),
            receiver: metadata.receiver.to_string(),
            doc_type: metadata.doc_type.to_string(),
        }
    }
}
