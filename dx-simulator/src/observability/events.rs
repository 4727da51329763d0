//! Canonical structured event names used across `dx-simulator`.

// Capability snapshot lifecycle events.
pub const CAPABILITY_SNAPSHOT_BUILD_START: &str = "capability_snapshot_build_start";
pub const CAPABILITY_SNAPSHOT_BUILD_OK: &str = "capability_snapshot_build_ok";
pub const CAPABILITY_SNAPSHOT_BUILD_FAILED: &str = "capability_snapshot_build_failed";

// Discovery query events.
pub const DIRECTORY_LOOKUP_EMPTY: &str = "directory_lookup_empty";
pub const SERVICE_METADATA_MISS: &str = "service_metadata_miss";
pub const DATASET_QUERY_MALFORMED_RECORD: &str = "dataset_query_malformed_record";
pub const DATASET_QUERY_OK: &str = "dataset_query_ok";

// Router classification and policy events.
pub const MESSAGE_CLASSIFIED: &str = "message_classified";
pub const CLASSIFICATION_FAILED: &str = "classification_failed";
pub const REQUEST_ACCEPTED_UNANSWERED: &str = "request_accepted_unanswered";
pub const AUTO_RESPONSE_OK: &str = "auto_response_ok";
pub const AUTO_RESPONSE_FAULT: &str = "auto_response_fault";

// Peer forwarding events.
pub const FORWARD_ATTEMPT: &str = "forward_attempt";
pub const FORWARD_OK: &str = "forward_ok";
pub const FORWARD_FAILED: &str = "forward_failed";
pub const ROUTE_TASK_FAILED: &str = "route_task_failed";
