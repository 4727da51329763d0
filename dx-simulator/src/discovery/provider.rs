//! Discovery query surface: the capability trait answered by the index engine.

use crate::discovery::index::{
    DirectoryKey, DiscoveryEngine, EndpointDescriptor, ServiceMetadataKey,
};
use crate::identifier::Identifier;
use crate::observability::events;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const COMPONENT: &str = "discovery_provider";

/// Secondary attribute filter of a dataset query. Country-code and DP-type
/// filtering are mutually exclusive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DatasetFilter {
    None,
    Country(String),
    DpType(String),
}

/// Query result shape for one matched dataset capability.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct DatasetDescriptor {
    pub dataset_type: String,
    pub dp_identifier: Identifier,
    pub doc_type_identifier: Identifier,
    pub dataset_identifier: String,
    pub distribution_format: String,
    pub distribution_conforms_to: Option<String>,
    pub access_conforms_to: Option<String>,
}

/// Receiver for per-record problems encountered during a dataset query.
/// Malformed records are reported here and skipped; they never fail the query.
pub trait DiscoveryErrorSink: Send + Sync {
    fn on_malformed_record(&self, dataset_id: &str, detail: &str);
}

/// Default sink: reports malformed records as structured warn events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorSink;

impl DiscoveryErrorSink for TracingErrorSink {
    fn on_malformed_record(&self, dataset_id: &str, detail: &str) {
        warn!(
            event = events::DATASET_QUERY_MALFORMED_RECORD,
            component = COMPONENT,
            dataset_id,
            detail,
            "skipping malformed dataset record"
        );
    }
}

/// Read-only discovery capability: directory, service-metadata, and
/// dataset-description queries. Implemented by [`DiscoveryEngine`] and called
/// directly by routing and test code. Query misses are empty results, never
/// errors; queries have no side effects on the indices.
pub trait DiscoveryProvider: Send + Sync {
    /// Exact-match directory lookup. A query without a country code only
    /// matches entries registered without one.
    fn lookup_participants(
        &self,
        country_code: Option<&str>,
        dataset_type: &str,
    ) -> BTreeSet<Identifier>;

    /// Exact-match endpoint lookup. Unregistered participants are an expected
    /// condition, answered with `None`.
    fn lookup_service_metadata(
        &self,
        participant: &Identifier,
        doc_type: &Identifier,
    ) -> Option<EndpointDescriptor>;

    /// Normalized-substring dataset query with filter-then-prune semantics.
    fn query_datasets(
        &self,
        dataset_type: &str,
        filter: &DatasetFilter,
        sink: &dyn DiscoveryErrorSink,
    ) -> Vec<DatasetDescriptor>;
}

/// Normalizes a dataset-type string for containment matching: lower-cases and
/// strips underscores, dashes, and ASCII whitespace. Idempotent.
pub fn normalize_dataset_type(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_ascii_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl DiscoveryProvider for DiscoveryEngine {
    fn lookup_participants(
        &self,
        country_code: Option<&str>,
        dataset_type: &str,
    ) -> BTreeSet<Identifier> {
        let snapshot = self.current();
        let key = DirectoryKey {
            country_code: country_code.map(str::to_string),
            dataset_type: dataset_type.to_string(),
        };
        match snapshot.directory.get(&key) {
            Some(participants) => participants.clone(),
            None => {
                debug!(
                    event = events::DIRECTORY_LOOKUP_EMPTY,
                    component = COMPONENT,
                    country_code = country_code.unwrap_or("none"),
                    dataset_type,
                    snapshot_version = snapshot.version,
                    "no participants registered for directory key"
                );
                BTreeSet::new()
            }
        }
    }

    fn lookup_service_metadata(
        &self,
        participant: &Identifier,
        doc_type: &Identifier,
    ) -> Option<EndpointDescriptor> {
        let snapshot = self.current();
        let key = ServiceMetadataKey {
            participant: participant.clone(),
            doc_type: doc_type.clone(),
        };
        let found = snapshot.service_metadata.get(&key).cloned();
        if found.is_none() {
            debug!(
                event = events::SERVICE_METADATA_MISS,
                component = COMPONENT,
                participant = %participant,
                doc_type = %doc_type,
                "no endpoint registered"
            );
        }
        found
    }

    fn query_datasets(
        &self,
        dataset_type: &str,
        filter: &DatasetFilter,
        sink: &dyn DiscoveryErrorSink,
    ) -> Vec<DatasetDescriptor> {
        let snapshot = self.current();
        let needle = normalize_dataset_type(dataset_type);
        let mut descriptors = Vec::new();

        for record in &snapshot.datasets {
            // Stage one: keep only the doc types whose normalized form
            // contains the normalized query; a record whose list empties out
            // is dropped entirely.
            let matching_doc_types: Vec<&String> = record
                .doc_types
                .iter()
                .filter(|candidate| normalize_dataset_type(candidate).contains(&needle))
                .collect();
            if matching_doc_types.is_empty() {
                continue;
            }

            // Stage two: prune by the secondary attribute; a record whose
            // attributes are all pruned is dropped.
            let survives = match filter {
                DatasetFilter::None => true,
                DatasetFilter::Country(country) => record
                    .attributes
                    .iter()
                    .any(|attr| attr.country_code.as_deref() == Some(country.as_str())),
                DatasetFilter::DpType(dp_type) => record
                    .attributes
                    .iter()
                    .any(|attr| attr.dp_type.as_deref() == Some(dp_type.as_str())),
            };
            if !survives {
                continue;
            }

            for doc_type in matching_doc_types {
                let Some(doc_type_identifier) = Identifier::parse_qualified(doc_type) else {
                    sink.on_malformed_record(
                        &record.dataset_id,
                        &format!("doc type `{doc_type}` is not a scheme::value identifier"),
                    );
                    continue;
                };
                descriptors.push(DatasetDescriptor {
                    dataset_type: doc_type.clone(),
                    dp_identifier: record.publisher.clone(),
                    doc_type_identifier,
                    dataset_identifier: record.dataset_id.clone(),
                    distribution_format: record.distribution.format.clone(),
                    distribution_conforms_to: record.distribution.conforms_to.clone(),
                    access_conforms_to: record.access_conforms_to.clone(),
                });
            }
        }

        debug!(
            event = events::DATASET_QUERY_OK,
            component = COMPONENT,
            dataset_type,
            descriptors = descriptors.len(),
            snapshot_version = snapshot.version,
            "dataset query answered"
        );
        descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_dataset_type, DatasetDescriptor, DatasetFilter, DiscoveryErrorSink,
        DiscoveryProvider,
    };
    use crate::discovery::dataset::{
        CapabilityDataset, CapabilitySource, DatasetAttribute, DatasetLoadError, DatasetRecord,
        DirectoryGroup, Distribution, DocTypeCapability, ParticipantCapability,
    };
    use crate::discovery::index::DiscoveryEngine;
    use crate::identifier::Identifier;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        reports: Mutex<Vec<(String, String)>>,
    }

    impl DiscoveryErrorSink for CollectingSink {
        fn on_malformed_record(&self, dataset_id: &str, detail: &str) {
            self.reports
                .lock()
                .unwrap()
                .push((dataset_id.to_string(), detail.to_string()));
        }
    }

    struct FixedSource(CapabilityDataset);

    #[async_trait]
    impl CapabilitySource for FixedSource {
        async fn fetch(&self) -> Result<CapabilityDataset, DatasetLoadError> {
            Ok(self.0.clone())
        }
    }

    fn record(
        dataset_id: &str,
        doc_types: &[&str],
        attributes: Vec<DatasetAttribute>,
    ) -> DatasetRecord {
        DatasetRecord {
            dataset_id: dataset_id.to_string(),
            publisher: Identifier::new("iso6523-actorid-upis", format!("9915:{dataset_id}")),
            doc_types: doc_types.iter().map(|s| s.to_string()).collect(),
            attributes,
            distribution: Distribution {
                format: "UNSTRUCTURED".to_string(),
                conforms_to: None,
            },
            access_conforms_to: None,
        }
    }

    fn attribute(country: &str, dp_type: &str) -> DatasetAttribute {
        DatasetAttribute {
            country_code: Some(country.to_string()),
            dp_type: Some(dp_type.to_string()),
        }
    }

    async fn engine_with(dataset: CapabilityDataset) -> DiscoveryEngine {
        DiscoveryEngine::load(&FixedSource(dataset))
            .await
            .expect("engine should load")
    }

    fn directory_dataset() -> CapabilityDataset {
        CapabilityDataset {
            directory: vec![
                DirectoryGroup {
                    country_code: Some("SV".to_string()),
                    participants: vec![ParticipantCapability {
                        id: Identifier::new("x", "p1"),
                        doc_types: vec![DocTypeCapability {
                            dataset_type: "REGISTERED_ORGANIZATION_TYPE".to_string(),
                            doc_type_id: Identifier::new("bdxr-docid-qns", "RegisteredOrganization::1.0"),
                            endpoint: None,
                        }],
                    }],
                },
                DirectoryGroup {
                    country_code: None,
                    participants: vec![ParticipantCapability {
                        id: Identifier::new("x", "p2"),
                        doc_types: vec![DocTypeCapability {
                            dataset_type: "REGISTERED_ORGANIZATION_TYPE".to_string(),
                            doc_type_id: Identifier::new("bdxr-docid-qns", "RegisteredOrganization::1.0"),
                            endpoint: None,
                        }],
                    }],
                },
            ],
            datasets: Vec::new(),
        }
    }

    #[test]
    fn normalize_is_idempotent_and_strips_separators() {
        let once = normalize_dataset_type("REGISTERED_ORGANIZATION_TYPE");
        assert_eq!(once, "registeredorganizationtype");
        assert_eq!(normalize_dataset_type(&once), once);
        assert_eq!(normalize_dataset_type("Ship - Certificate"), "shipcertificate");
    }

    #[tokio::test]
    async fn lookup_participants_is_exact_match_with_empty_set_on_miss() {
        let engine = engine_with(directory_dataset()).await;

        let hit = engine.lookup_participants(Some("SV"), "REGISTERED_ORGANIZATION_TYPE");
        assert_eq!(hit.len(), 1);
        assert!(hit.contains(&Identifier::new("x", "p1")));

        assert!(engine
            .lookup_participants(Some("DE"), "REGISTERED_ORGANIZATION_TYPE")
            .is_empty());
        assert!(engine.lookup_participants(Some("SV"), "SHIP_CERTIFICATE_TYPE").is_empty());
    }

    #[tokio::test]
    async fn lookup_without_country_only_matches_countryless_entries() {
        let engine = engine_with(directory_dataset()).await;

        let countryless = engine.lookup_participants(None, "REGISTERED_ORGANIZATION_TYPE");
        assert_eq!(countryless.len(), 1);
        assert!(countryless.contains(&Identifier::new("x", "p2")));
    }

    #[tokio::test]
    async fn query_datasets_matches_normalized_substrings() {
        let dataset = CapabilityDataset {
            directory: Vec::new(),
            datasets: vec![record(
                "ds-elonia",
                &["bdxr-docid-qns::REGISTERED_ORGANIZATION_TYPE"],
                vec![attribute("SV", "public-authority")],
            )],
        };
        let engine = engine_with(dataset).await;
        let sink = CollectingSink::default();

        let hits = engine.query_datasets("REGISTERED_ORGANIZATION", &DatasetFilter::None, &sink);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].dp_identifier, Identifier::new("iso6523-actorid-upis", "9915:ds-elonia"));
        assert_eq!(
            hits[0].doc_type_identifier,
            Identifier::new("bdxr-docid-qns", "REGISTERED_ORGANIZATION_TYPE")
        );

        assert!(engine
            .query_datasets("SHIP_CERT", &DatasetFilter::None, &sink)
            .is_empty());
    }

    #[tokio::test]
    async fn secondary_filter_never_grows_the_result_and_drops_pruned_records() {
        let dataset = CapabilityDataset {
            directory: Vec::new(),
            datasets: vec![
                record(
                    "ds-sv",
                    &["bdxr-docid-qns::REGISTERED_ORGANIZATION_TYPE"],
                    vec![attribute("SV", "public-authority")],
                ),
                record(
                    "ds-pf",
                    &["bdxr-docid-qns::REGISTERED_ORGANIZATION_TYPE"],
                    vec![attribute("PF", "maritime-registry")],
                ),
            ],
        };
        let engine = engine_with(dataset).await;
        let sink = CollectingSink::default();

        let unfiltered = engine.query_datasets("REGISTERED_ORGANIZATION", &DatasetFilter::None, &sink);
        let by_country = engine.query_datasets(
            "REGISTERED_ORGANIZATION",
            &DatasetFilter::Country("SV".to_string()),
            &sink,
        );
        let by_dp_type = engine.query_datasets(
            "REGISTERED_ORGANIZATION",
            &DatasetFilter::DpType("maritime-registry".to_string()),
            &sink,
        );

        assert_eq!(unfiltered.len(), 2);
        assert!(by_country.len() <= unfiltered.len());
        assert_eq!(by_country.len(), 1);
        assert_eq!(by_country[0].dataset_identifier, "ds-sv");
        assert_eq!(by_dp_type.len(), 1);
        assert_eq!(by_dp_type[0].dataset_identifier, "ds-pf");

        let none = engine.query_datasets(
            "REGISTERED_ORGANIZATION",
            &DatasetFilter::Country("DE".to_string()),
            &sink,
        );
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn query_preserves_record_order_and_does_not_mutate_the_snapshot() {
        let dataset = CapabilityDataset {
            directory: Vec::new(),
            datasets: vec![
                record("ds-first", &["a::REGISTERED_ORGANIZATION_TYPE"], Vec::new()),
                record("ds-second", &["b::REGISTERED_ORGANIZATION_TYPE"], Vec::new()),
                record("ds-third", &["c::REGISTERED_ORGANIZATION_TYPE"], Vec::new()),
            ],
        };
        let engine = engine_with(dataset).await;
        let sink = CollectingSink::default();

        let first: Vec<String> = engine
            .query_datasets("REGISTERED_ORGANIZATION", &DatasetFilter::None, &sink)
            .into_iter()
            .map(|d: DatasetDescriptor| d.dataset_identifier)
            .collect();
        let second: Vec<String> = engine
            .query_datasets("REGISTERED_ORGANIZATION", &DatasetFilter::None, &sink)
            .into_iter()
            .map(|d| d.dataset_identifier)
            .collect();

        assert_eq!(first, vec!["ds-first", "ds-second", "ds-third"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn malformed_doc_types_go_to_the_sink_and_wellformed_survive() {
        let dataset = CapabilityDataset {
            directory: Vec::new(),
            datasets: vec![record(
                "ds-mixed",
                &["REGISTERED_ORGANIZATION_NO_SCHEME", "ok::REGISTERED_ORGANIZATION_TYPE"],
                Vec::new(),
            )],
        };
        let engine = engine_with(dataset).await;
        let sink = CollectingSink::default();

        let hits = engine.query_datasets("REGISTERED_ORGANIZATION", &DatasetFilter::None, &sink);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].dataset_type, "ok::REGISTERED_ORGANIZATION_TYPE");
        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "ds-mixed");
    }
}
