//! Index snapshot storage: the three read-only discovery indices behind an
//! atomically swappable snapshot.

use crate::discovery::dataset::{
    CapabilityDataset, CapabilitySource, DatasetLoadError, DatasetRecord, EndpointInfo,
};
use crate::identifier::Identifier;
use crate::observability::events;
use arc_swap::ArcSwap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

const COMPONENT: &str = "discovery_index";

/// Endpoint and transport details registered for one (participant, doc-type).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointDescriptor {
    pub transport_profile: String,
    pub endpoint_uri: String,
    pub certificate: Vec<u8>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DirectoryKey {
    pub(crate) country_code: Option<String>,
    pub(crate) dataset_type: String,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct ServiceMetadataKey {
    pub(crate) participant: Identifier,
    pub(crate) doc_type: Identifier,
}

/// Failures while building an index snapshot. Build-fatal: a process that
/// cannot build its indices cannot serve discovery queries.
#[derive(Debug)]
pub enum IndexBuildError {
    Load(DatasetLoadError),
    CertificateFileUnreadable { path: String, detail: String },
    CertificateInvalid { participant: String, detail: String },
}

impl Display for IndexBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexBuildError::Load(err) => write!(f, "{err}"),
            IndexBuildError::CertificateFileUnreadable { path, detail } => {
                write!(f, "unable to read referenced certificate {path}: {detail}")
            }
            IndexBuildError::CertificateInvalid {
                participant,
                detail,
            } => write!(f, "invalid embedded certificate for {participant}: {detail}"),
        }
    }
}

impl Error for IndexBuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IndexBuildError::Load(err) => Some(err),
            _ => None,
        }
    }
}

/// One immutable set of the three discovery indices. Built single-threaded,
/// then read concurrently without locking.
pub(crate) struct IndexSnapshot {
    pub(crate) version: u64,
    pub(crate) directory: HashMap<DirectoryKey, BTreeSet<Identifier>>,
    pub(crate) service_metadata: HashMap<ServiceMetadataKey, EndpointDescriptor>,
    pub(crate) datasets: Vec<DatasetRecord>,
}

impl IndexSnapshot {
    pub(crate) fn empty() -> Self {
        Self {
            version: 0,
            directory: HashMap::new(),
            service_metadata: HashMap::new(),
            datasets: Vec::new(),
        }
    }

    /// Builds the three index shapes from one fetched dataset. Duplicate
    /// service-metadata keys resolve last-write-wins.
    pub(crate) fn build(version: u64, dataset: CapabilityDataset) -> Result<Self, IndexBuildError> {
        let mut directory: HashMap<DirectoryKey, BTreeSet<Identifier>> = HashMap::new();
        let mut service_metadata = HashMap::new();

        for group in &dataset.directory {
            for participant in &group.participants {
                for doc_type in &participant.doc_types {
                    directory
                        .entry(DirectoryKey {
                            country_code: group.country_code.clone(),
                            dataset_type: doc_type.dataset_type.clone(),
                        })
                        .or_default()
                        .insert(participant.id.clone());

                    if let Some(endpoint) = &doc_type.endpoint {
                        let certificate = load_certificate(&participant.id, endpoint)?;
                        service_metadata.insert(
                            ServiceMetadataKey {
                                participant: participant.id.clone(),
                                doc_type: doc_type.doc_type_id.clone(),
                            },
                            EndpointDescriptor {
                                transport_profile: endpoint.transport_profile.clone(),
                                endpoint_uri: endpoint.url.clone(),
                                certificate,
                            },
                        );
                    }
                }
            }
        }

        Ok(Self {
            version,
            directory,
            service_metadata,
            datasets: dataset.datasets,
        })
    }
}

fn load_certificate(
    participant: &Identifier,
    endpoint: &EndpointInfo,
) -> Result<Vec<u8>, IndexBuildError> {
    if let Some(encoded) = &endpoint.certificate {
        return BASE64
            .decode(encoded.as_bytes())
            .map_err(|err| IndexBuildError::CertificateInvalid {
                participant: participant.to_string(),
                detail: err.to_string(),
            });
    }
    if let Some(path) = &endpoint.certificate_file {
        return std::fs::read(path).map_err(|err| IndexBuildError::CertificateFileUnreadable {
            path: path.clone(),
            detail: err.to_string(),
        });
    }
    Ok(Vec::new())
}

/// Owner of the current index snapshot.
///
/// Built once at startup; a rebuild constructs a complete new snapshot and
/// swaps the reference atomically, so concurrent readers only ever observe a
/// fully built index set. A failed rebuild leaves the previous snapshot in
/// place.
pub struct DiscoveryEngine {
    snapshot: ArcSwap<IndexSnapshot>,
    next_version: AtomicU64,
}

impl DiscoveryEngine {
    /// Fetches the dataset from `source` and builds the initial snapshot.
    pub async fn load(source: &dyn CapabilitySource) -> Result<Self, IndexBuildError> {
        let engine = Self {
            snapshot: ArcSwap::from_pointee(IndexSnapshot::empty()),
            next_version: AtomicU64::new(1),
        };
        engine.rebuild(source).await?;
        Ok(engine)
    }

    /// Builds a new snapshot from `source` and atomically replaces the current
    /// one. On failure the previously visible snapshot stays in place.
    pub async fn rebuild(&self, source: &dyn CapabilitySource) -> Result<(), IndexBuildError> {
        info!(
            event = events::CAPABILITY_SNAPSHOT_BUILD_START,
            component = COMPONENT,
            "building capability index snapshot"
        );

        let build_result = match source.fetch().await {
            Ok(dataset) => {
                let version = self.next_version.fetch_add(1, Ordering::Relaxed);
                IndexSnapshot::build(version, dataset)
            }
            Err(err) => Err(IndexBuildError::Load(err)),
        };

        match build_result {
            Ok(snapshot) => {
                info!(
                    event = events::CAPABILITY_SNAPSHOT_BUILD_OK,
                    component = COMPONENT,
                    snapshot_version = snapshot.version,
                    directory_keys = snapshot.directory.len(),
                    service_metadata_keys = snapshot.service_metadata.len(),
                    dataset_records = snapshot.datasets.len(),
                    "capability index snapshot ready"
                );
                self.snapshot.store(Arc::new(snapshot));
                Ok(())
            }
            Err(err) => {
                error!(
                    event = events::CAPABILITY_SNAPSHOT_BUILD_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "capability index snapshot build failed; previous snapshot kept"
                );
                Err(err)
            }
        }
    }

    pub(crate) fn current(&self) -> Arc<IndexSnapshot> {
        self.snapshot.load_full()
    }

    #[cfg(test)]
    pub(crate) fn current_version(&self) -> u64 {
        self.snapshot.load().version
    }
}
