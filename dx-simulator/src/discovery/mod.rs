//! Discovery Index Engine: builds the directory, service-metadata, and
//! dataset indices from a static capability dataset and answers point queries
//! against an immutable snapshot.

mod dataset;
mod index;
mod provider;

pub use dataset::{
    CapabilityDataset, CapabilitySource, DatasetAttribute, DatasetLoadError, DatasetRecord,
    DirectoryGroup, Distribution, DocTypeCapability, EndpointInfo, ParticipantCapability,
};
pub use index::{DiscoveryEngine, EndpointDescriptor, IndexBuildError};
pub use provider::{
    normalize_dataset_type, DatasetDescriptor, DatasetFilter, DiscoveryErrorSink,
    DiscoveryProvider, TracingErrorSink,
};
