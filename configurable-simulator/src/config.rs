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

use dx_simulator::SimulationMode;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) simulator_config: SimulatorConfig,
    pub(crate) capability_config: CapabilityConfig,
    pub(crate) defaults: DefaultAddressing,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    pub(crate) mode: SimulationMode,
    /// Port this process serves its endpoints on.
    pub(crate) listen_port: u16,
    /// Port of the local connector whose submission API one-shot sends and
    /// auto-responses are posted to.
    pub(crate) connector_port: u16,
    /// `/to-dc` endpoint URL of the DC party (used when the DC is external).
    pub(crate) dc_endpoint: String,
    /// `/to-dp` endpoint URL of the DP party (used when the DP is external).
    pub(crate) dp_endpoint: String,
    pub(crate) auto_respond: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CapabilityConfig {
    pub(crate) file_path: String,
}

/// Addressing applied to one-shot sends when not overridden on the command line.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DefaultAddressing {
    pub(crate) sender_scheme: String,
    pub(crate) sender: String,
    pub(crate) receiver_scheme: String,
    pub(crate) receiver: String,
    pub(crate) doc_type_scheme: String,
    pub(crate) doc_type: String,
    pub(crate) process_scheme: String,
    pub(crate) process: String,
}
