//! Exchange router: classifies an outbound message and applies the
//! simulation-mode policy, either auto-responding internally or forwarding
//! to a peer.

use crate::codec::{DocumentKind, DocumentModel};
use crate::message::ExchangeMessage;
use crate::observability::{events, fields::AddressingFields};
use crate::routing::gateway::{DeliveryError, SubmissionGateway};
use crate::routing::responder::{build_reply, AutoResponder};
use crate::routing::simulation::{RoutingContext, SimulationMode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "exchange_router";

/// What the router did with one message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteOutcome {
    /// A request was answered internally and the reply delivered to the DC peer.
    AutoResponded,
    /// A request was accepted but deliberately left unanswered.
    Accepted,
    /// A request was forwarded unmodified to the DP peer.
    ForwardedToDp,
    /// A response or error response was forwarded to the DC peer.
    ForwardedToDc,
    /// The payload matched no known document kind and was dropped.
    Dropped,
}

/// Failures of one routing call. Isolated to the message being handled.
#[derive(Debug)]
pub enum RouteError {
    /// The message carried no payload to classify.
    MissingPayload,
    Delivery(DeliveryError),
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::MissingPayload => write!(f, "message carries no payload"),
            RouteError::Delivery(err) => write!(f, "delivery failed: {err}"),
        }
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RouteError::Delivery(err) => Some(err),
            RouteError::MissingPayload => None,
        }
    }
}

/// Stand-in for the real transport layer. Stateless across messages: every
/// call classifies, decides per the routing context, and either loops the
/// message back internally or forwards it through the submission gateway.
pub struct ExchangeRouter {
    context: RoutingContext,
    document_model: Arc<dyn DocumentModel>,
    responder: Arc<dyn AutoResponder>,
    gateway: Arc<dyn SubmissionGateway>,
}

impl ExchangeRouter {
    pub fn new(
        context: RoutingContext,
        document_model: Arc<dyn DocumentModel>,
        responder: Arc<dyn AutoResponder>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Self {
        Self {
            context,
            document_model,
            responder,
            gateway,
        }
    }

    pub fn context(&self) -> &RoutingContext {
        &self.context
    }

    /// Handles one outbound message to completion, including the peer hop.
    pub async fn route(&self, message: ExchangeMessage) -> Result<RouteOutcome, RouteError> {
        let correlation = Uuid::new_v4();
        let addressing = AddressingFields::from_metadata(&message.metadata);
        let primary = message.primary_payload().ok_or(RouteError::MissingPayload)?;
        let kind = self.document_model.classify(&primary.data);

        debug!(
            event = events::MESSAGE_CLASSIFIED,
            component = COMPONENT,
            correlation = %correlation,
            msg_kind = kind.label(),
            sender = addressing.sender.as_str(),
            receiver = addressing.receiver.as_str(),
            doc_type = addressing.doc_type.as_str(),
            "classified outbound message"
        );

        match kind {
            DocumentKind::Request if self.context.mode == SimulationMode::Dp => {
                if !self.context.auto_respond {
                    info!(
                        event = events::REQUEST_ACCEPTED_UNANSWERED,
                        component = COMPONENT,
                        correlation = %correlation,
                        sender = addressing.sender.as_str(),
                        receiver = addressing.receiver.as_str(),
                        "auto-response disabled; request accepted without reply"
                    );
                    return Ok(RouteOutcome::Accepted);
                }

                let outcome = self.responder.respond(primary, &message.metadata).await;
                match &outcome {
                    Ok(_) => debug!(
                        event = events::AUTO_RESPONSE_OK,
                        component = COMPONENT,
                        correlation = %correlation,
                        "responder produced a response"
                    ),
                    Err(fault) => warn!(
                        event = events::AUTO_RESPONSE_FAULT,
                        component = COMPONENT,
                        correlation = %correlation,
                        fault = %fault,
                        "responder raised a domain fault; replying with error response"
                    ),
                }

                let content_id = format!("{correlation}@dx-simulator");
                let reply =
                    build_reply(self.document_model.as_ref(), outcome, &message.metadata, &content_id);
                self.forward(&self.context.dc_endpoint, reply.kind, &correlation, &reply.message)
                    .await?;
                Ok(RouteOutcome::AutoResponded)
            }
            DocumentKind::Request => {
                self.forward(&self.context.dp_endpoint, kind, &correlation, &message)
                    .await?;
                Ok(RouteOutcome::ForwardedToDp)
            }
            DocumentKind::Response | DocumentKind::ErrorResponse => {
                // A response always flows back toward the consumer role,
                // attachments and payload order intact.
                self.forward(&self.context.dc_endpoint, kind, &correlation, &message)
                    .await?;
                Ok(RouteOutcome::ForwardedToDc)
            }
            DocumentKind::Unknown => {
                warn!(
                    event = events::CLASSIFICATION_FAILED,
                    component = COMPONENT,
                    correlation = %correlation,
                    sender = addressing.sender.as_str(),
                    receiver = addressing.receiver.as_str(),
                    doc_type = addressing.doc_type.as_str(),
                    "payload matches no known document kind; dropping message"
                );
                Ok(RouteOutcome::Dropped)
            }
        }
    }

    /// Spawns `route` on its own task so a slow peer cannot stall the caller.
    /// Failures are logged and isolated to this message.
    pub fn dispatch(self: &Arc<Self>, message: ExchangeMessage) -> tokio::task::JoinHandle<()> {
        let router = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = router.route(message).await {
                error!(
                    event = events::ROUTE_TASK_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "routing task failed"
                );
            }
        })
    }

    async fn forward(
        &self,
        target: &str,
        kind: DocumentKind,
        correlation: &Uuid,
        message: &ExchangeMessage,
    ) -> Result<(), RouteError> {
        let addressing = AddressingFields::from_metadata(&message.metadata);
        debug!(
            event = events::FORWARD_ATTEMPT,
            component = COMPONENT,
            correlation = %correlation,
            msg_kind = kind.label(),
            target,
            "forwarding message to peer endpoint"
        );

        match self.gateway.submit(target, message).await {
            Ok(()) => {
                debug!(
                    event = events::FORWARD_OK,
                    component = COMPONENT,
                    correlation = %correlation,
                    msg_kind = kind.label(),
                    target,
                    "forward succeeded"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::FORWARD_FAILED,
                    component = COMPONENT,
                    correlation = %correlation,
                    msg_kind = kind.label(),
                    target,
                    sender = addressing.sender.as_str(),
                    receiver = addressing.receiver.as_str(),
                    doc_type = addressing.doc_type.as_str(),
                    err = %err,
                    "forward failed; not retrying"
                );
                Err(RouteError::Delivery(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExchangeRouter, RouteError, RouteOutcome};
    use crate::codec::{DocumentKind, DocumentModel, DomainFault, XmlDocumentModel};
    use crate::identifier::Identifier;
    use crate::message::{
        ExchangeMessage, MessageMetadata, MessagePayload, MIME_APPLICATION_XML,
        TRANSPORT_PROFILE_AS4,
    };
    use crate::routing::gateway::{DeliveryError, SubmissionGateway};
    use crate::routing::responder::CannedResponder;
    use crate::routing::simulation::{RoutingContext, SimulationMode};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const DC_ENDPOINT: &str = "http://localhost:8081/to-dc";
    const DP_ENDPOINT: &str = "http://localhost:8082/to-dp";

    #[derive(Default)]
    struct RecordingGateway {
        submissions: Mutex<Vec<(String, ExchangeMessage)>>,
    }

    impl RecordingGateway {
        fn submissions(&self) -> Vec<(String, ExchangeMessage)> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubmissionGateway for RecordingGateway {
        async fn submit(
            &self,
            target: &str,
            message: &ExchangeMessage,
        ) -> Result<(), DeliveryError> {
            self.submissions
                .lock()
                .unwrap()
                .push((target.to_string(), message.clone()));
            Ok(())
        }
    }

    struct RejectingGateway;

    #[async_trait]
    impl SubmissionGateway for RejectingGateway {
        async fn submit(
            &self,
            target: &str,
            _message: &ExchangeMessage,
        ) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected {
                target: target.to_string(),
                status: 502,
            })
        }
    }

    fn context(mode: SimulationMode, auto_respond: bool) -> RoutingContext {
        RoutingContext {
            mode,
            dc_endpoint: DC_ENDPOINT.to_string(),
            dp_endpoint: DP_ENDPOINT.to_string(),
            auto_respond,
        }
    }

    fn metadata() -> MessageMetadata {
        MessageMetadata {
            sender: Identifier::new("iso6523-actorid-upis", "9914:dc-freedonia"),
            receiver: Identifier::new("iso6523-actorid-upis", "9915:dp-elonia"),
            doc_type: Identifier::new("bdxr-docid-qns", "RegisteredOrganization::1.0"),
            process: Identifier::new("bdxr-procid-agreement", "urn:dx:process:dataquery"),
            transport_protocol: TRANSPORT_PROFILE_AS4.to_string(),
        }
    }

    fn message_with(document: &[u8]) -> ExchangeMessage {
        ExchangeMessage {
            metadata: metadata(),
            payloads: vec![MessagePayload {
                content_id: "primary@test".to_string(),
                mime_type: MIME_APPLICATION_XML.to_string(),
                data: document.to_vec(),
            }],
        }
    }

    fn router_with(
        mode: SimulationMode,
        auto_respond: bool,
        responder: CannedResponder,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> ExchangeRouter {
        ExchangeRouter::new(
            context(mode, auto_respond),
            Arc::new(XmlDocumentModel::new()),
            Arc::new(responder),
            gateway,
        )
    }

    #[tokio::test]
    async fn dp_mode_with_auto_response_replies_inverted_to_the_dc_endpoint() {
        let gateway = Arc::new(RecordingGateway::default());
        let router = router_with(
            SimulationMode::Dp,
            true,
            CannedResponder::new(),
            gateway.clone(),
        );

        let outcome = router
            .route(message_with(b"<QueryRequest id=\"r-1\"/>"))
            .await
            .expect("routing should succeed");

        assert_eq!(outcome, RouteOutcome::AutoResponded);
        let submissions = gateway.submissions();
        assert_eq!(submissions.len(), 1);
        let (target, reply) = &submissions[0];
        assert_eq!(target, DC_ENDPOINT);
        assert_eq!(reply.metadata.sender, metadata().receiver);
        assert_eq!(reply.metadata.receiver, metadata().sender);
        assert_eq!(reply.metadata.doc_type, metadata().doc_type);
        assert_eq!(reply.metadata.process, metadata().process);
        assert_eq!(
            XmlDocumentModel::new().classify(&reply.payloads[0].data),
            DocumentKind::Response
        );
    }

    #[tokio::test]
    async fn dp_mode_without_auto_response_makes_no_outbound_call() {
        let gateway = Arc::new(RecordingGateway::default());
        let router = router_with(
            SimulationMode::Dp,
            false,
            CannedResponder::new(),
            gateway.clone(),
        );

        let outcome = router
            .route(message_with(b"<QueryRequest id=\"r-1\"/>"))
            .await
            .expect("routing should succeed");

        assert_eq!(outcome, RouteOutcome::Accepted);
        assert!(gateway.submissions().is_empty());
    }

    #[tokio::test]
    async fn responder_faults_are_forwarded_as_error_responses() {
        let gateway = Arc::new(RecordingGateway::default());
        let router = router_with(
            SimulationMode::Dp,
            true,
            CannedResponder::failing(DomainFault::new("rec-not-found", "no record")),
            gateway.clone(),
        );

        let outcome = router
            .route(message_with(b"<QueryRequest id=\"r-1\"/>"))
            .await
            .expect("a domain fault is not a routing failure");

        assert_eq!(outcome, RouteOutcome::AutoResponded);
        let submissions = gateway.submissions();
        assert_eq!(submissions.len(), 1);
        let (target, reply) = &submissions[0];
        assert_eq!(target, DC_ENDPOINT);
        assert_eq!(
            XmlDocumentModel::new().classify(&reply.payloads[0].data),
            DocumentKind::ErrorResponse
        );
        assert_eq!(reply.metadata.sender, metadata().receiver);
    }

    #[tokio::test]
    async fn requests_outside_dp_mode_forward_unmodified_to_the_dp_endpoint() {
        for mode in [SimulationMode::Sole, SimulationMode::Dc] {
            let gateway = Arc::new(RecordingGateway::default());
            let router = router_with(mode, true, CannedResponder::new(), gateway.clone());
            let original = message_with(b"<QueryRequest id=\"r-1\"/>");

            let outcome = router
                .route(original.clone())
                .await
                .expect("routing should succeed");

            assert_eq!(outcome, RouteOutcome::ForwardedToDp);
            let submissions = gateway.submissions();
            assert_eq!(submissions.len(), 1);
            assert_eq!(submissions[0].0, DP_ENDPOINT);
            assert_eq!(submissions[0].1, original);
        }
    }

    #[tokio::test]
    async fn responses_forward_to_the_dc_endpoint_in_every_mode() {
        for mode in [SimulationMode::Sole, SimulationMode::Dc, SimulationMode::Dp] {
            let gateway = Arc::new(RecordingGateway::default());
            let router = router_with(mode, true, CannedResponder::new(), gateway.clone());

            let outcome = router
                .route(message_with(b"<QueryResponse><Result/></QueryResponse>"))
                .await
                .expect("routing should succeed");

            assert_eq!(outcome, RouteOutcome::ForwardedToDc);
            let submissions = gateway.submissions();
            assert_eq!(submissions.len(), 1);
            assert_eq!(submissions[0].0, DC_ENDPOINT);
        }
    }

    #[tokio::test]
    async fn responses_keep_attachment_order_and_content_ids() {
        let gateway = Arc::new(RecordingGateway::default());
        let router = router_with(
            SimulationMode::Sole,
            false,
            CannedResponder::new(),
            gateway.clone(),
        );
        let mut message = message_with(b"<QueryResponse><Result/></QueryResponse>");
        message.payloads.push(MessagePayload {
            content_id: "evidence-1@dp".to_string(),
            mime_type: "application/pdf".to_string(),
            data: b"%PDF-1.7".to_vec(),
        });
        message.payloads.push(MessagePayload {
            content_id: "evidence-2@dp".to_string(),
            mime_type: "application/octet-stream".to_string(),
            data: vec![1, 2, 3],
        });

        router
            .route(message.clone())
            .await
            .expect("routing should succeed");

        let forwarded = &gateway.submissions()[0].1;
        assert_eq!(forwarded.payloads, message.payloads);
    }

    #[tokio::test]
    async fn unknown_documents_are_dropped_without_forwarding() {
        let gateway = Arc::new(RecordingGateway::default());
        let router = router_with(
            SimulationMode::Dp,
            true,
            CannedResponder::new(),
            gateway.clone(),
        );

        let outcome = router
            .route(message_with(b"<SomethingElse/>"))
            .await
            .expect("unknown kind is not a routing failure");

        assert_eq!(outcome, RouteOutcome::Dropped);
        assert!(gateway.submissions().is_empty());
    }

    #[tokio::test]
    async fn payloadless_messages_fail_without_touching_the_gateway() {
        let gateway = Arc::new(RecordingGateway::default());
        let router = router_with(
            SimulationMode::Sole,
            false,
            CannedResponder::new(),
            gateway.clone(),
        );
        let message = ExchangeMessage {
            metadata: metadata(),
            payloads: Vec::new(),
        };

        assert!(matches!(
            router.route(message).await,
            Err(RouteError::MissingPayload)
        ));
        assert!(gateway.submissions().is_empty());
    }

    #[tokio::test]
    async fn delivery_failures_surface_as_route_errors() {
        let router = router_with(
            SimulationMode::Sole,
            false,
            CannedResponder::new(),
            Arc::new(RejectingGateway),
        );

        let result = router.route(message_with(b"<QueryRequest/>")).await;

        assert!(matches!(result, Err(RouteError::Delivery(_))));
    }
}
