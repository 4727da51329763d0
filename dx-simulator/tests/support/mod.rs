use capability_static_file::CapabilityStaticFile;
use dx_simulator::discovery::DiscoveryEngine;
use dx_simulator::routing::{DeliveryError, SubmissionGateway};
use dx_simulator::ExchangeMessage;
use std::sync::Mutex;

pub(crate) const CAPABILITY_CONFIG: &str =
    "../utils/capability-static-file/static-configs/testdata.json";

pub(crate) async fn make_engine() -> DiscoveryEngine {
    let source = CapabilityStaticFile::new(CAPABILITY_CONFIG.to_string());

    DiscoveryEngine::load(&source)
        .await
        .expect("engine creation should succeed")
}

/// Gateway double that records every submission instead of performing HTTP.
#[allow(dead_code)]
#[derive(Default)]
pub(crate) struct RecordingGateway {
    submissions: Mutex<Vec<(String, ExchangeMessage)>>,
}

impl RecordingGateway {
    #[allow(dead_code)]
    pub(crate) fn submissions(&self) -> Vec<(String, ExchangeMessage)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit(&self, target: &str, message: &ExchangeMessage) -> Result<(), DeliveryError> {
        self.submissions
            .lock()
            .unwrap()
            .push((target.to_string(), message.clone()));
        Ok(())
    }
}
