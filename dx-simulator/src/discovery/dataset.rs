//! Raw capability-dataset model and the source boundary it is fetched through.
//!
//! The dataset enumerates, per country, the participants of the simulated
//! network together with the document types they support, their registered
//! endpoints, and the dataset records a data provider can answer for. The
//! engine's only contract with the serialization format is "parse into these
//! shapes"; the shipped source is a static JSON file.

use crate::identifier::Identifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Whole capability dataset as fetched from a source.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CapabilityDataset {
    #[serde(default)]
    pub directory: Vec<DirectoryGroup>,
    #[serde(default)]
    pub datasets: Vec<DatasetRecord>,
}

/// Participants registered for one country. Entries without a country code
/// serve queries that carry no country.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DirectoryGroup {
    #[serde(default)]
    pub country_code: Option<String>,
    pub participants: Vec<ParticipantCapability>,
}

/// One participant and the document types it claims to support.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ParticipantCapability {
    pub id: Identifier,
    pub doc_types: Vec<DocTypeCapability>,
}

/// One supported document type, optionally with a registered endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DocTypeCapability {
    /// Dataset-type name the directory is queried by.
    pub dataset_type: String,
    /// Full document-type identifier the service-metadata index is keyed by.
    pub doc_type_id: Identifier,
    #[serde(default)]
    pub endpoint: Option<EndpointInfo>,
}

/// Registered endpoint of a participant for one document type.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EndpointInfo {
    pub transport_profile: String,
    pub url: String,
    /// Base64-encoded certificate embedded in the dataset.
    #[serde(default)]
    pub certificate: Option<String>,
    /// Path of a certificate file referenced instead of embedded.
    #[serde(default)]
    pub certificate_file: Option<String>,
}

/// One queryable dataset capability of a data provider.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatasetRecord {
    pub dataset_id: String,
    /// The data provider publishing this dataset.
    pub publisher: Identifier,
    /// Access-service identifiers in `scheme::value` form; dataset-type
    /// queries substring-match against these.
    pub doc_types: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<DatasetAttribute>,
    pub distribution: Distribution,
    #[serde(default)]
    pub access_conforms_to: Option<String>,
}

/// Secondary attributes a dataset query may prune by.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatasetAttribute {
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub dp_type: Option<String>,
}

/// Distribution details of a dataset record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Distribution {
    pub format: String,
    #[serde(default)]
    pub conforms_to: Option<String>,
}

/// Failures while fetching or parsing the capability dataset. All of these are
/// load-time fatal for discovery.
#[derive(Debug)]
pub enum DatasetLoadError {
    FileNotFound(String),
    Unreadable(String),
    Malformed(String),
}

impl Display for DatasetLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetLoadError::FileNotFound(detail) => {
                write!(f, "capability dataset not found: {detail}")
            }
            DatasetLoadError::Unreadable(detail) => {
                write!(f, "unable to read capability dataset: {detail}")
            }
            DatasetLoadError::Malformed(detail) => {
                write!(f, "unable to parse capability dataset: {detail}")
            }
        }
    }
}

impl Error for DatasetLoadError {}

/// Source the engine fetches its dataset from at load and rebuild time.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    async fn fetch(&self) -> Result<CapabilityDataset, DatasetLoadError>;
}
