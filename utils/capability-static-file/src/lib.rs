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

//! Static-file [`CapabilitySource`]: reads the capability dataset from a JSON
//! file on disk. The file is re-read on every fetch, so a rebuild picks up
//! edits without a restart.

use async_trait::async_trait;
use dx_simulator::discovery::{CapabilityDataset, CapabilitySource, DatasetLoadError};
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use tracing::debug;

pub struct CapabilityStaticFile {
    static_file: String,
}

impl CapabilityStaticFile {
    pub fn new(static_file: String) -> Self {
        CapabilityStaticFile { static_file }
    }
}

#[async_trait]
impl CapabilitySource for CapabilityStaticFile {
    async fn fetch(&self) -> Result<CapabilityDataset, DatasetLoadError> {
        let capability_json_file = PathBuf::from(self.static_file.clone());
        debug!("capability_json_file: {capability_json_file:?}");

        let capability_json_file = canonicalize(capability_json_file)
            .map_err(|e| DatasetLoadError::FileNotFound(format!("{e:?}")))?;

        let data = fs::read_to_string(capability_json_file)
            .map_err(|e| DatasetLoadError::Unreadable(format!("{e:?}")))?;

        let dataset: CapabilityDataset = serde_json::from_str(&data)
            .map_err(|e| DatasetLoadError::Malformed(format!("{e:?}")))?;

        debug!(
            "finished reading capability dataset: {} directory groups, {} dataset records",
            dataset.directory.len(),
            dataset.datasets.len()
        );
        Ok(dataset)
    }
}
