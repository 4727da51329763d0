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

//! # dx-simulator
//!
//! `dx-simulator` stands in for the discovery and transport infrastructure of a
//! cross-border document-exchange network, so a data-consuming (DC) and a
//! data-providing (DP) party can be exercised end-to-end without a live
//! directory, service registry, or gateway network.
//!
//! Typical usage is API-first and centers on [`DiscoveryEngine`] and
//! [`ExchangeRouter`]. Internal modules are organized by domain layer to keep
//! behavior ownership explicit.
//!
//! ## Discovery
//!
//! The engine builds three read-only indices (directory, service metadata,
//! and dataset descriptions) from a static capability dataset at startup and
//! answers point queries through the [`DiscoveryProvider`] trait. Indices are
//! immutable snapshots: a rebuild constructs a new snapshot and swaps the
//! reference atomically, so readers never observe a partially built index.
//!
//! ## Routing
//!
//! The router classifies each outbound message into a closed
//! [`DocumentKind`] union and applies the simulation-mode policy: a request
//! reaching a simulated DP is answered internally (addressing inverted) when
//! auto-response is on, otherwise forwarded to the configured peer endpoint
//! over HTTP; responses always flow back toward the consumer role.
//!
//! ```
//! use std::sync::Arc;
//! use dx_simulator::{
//!     CannedResponder, ExchangeRouter, ExchangeMessage, Identifier, MessageMetadata,
//!     MessagePayload, RouteOutcome, RoutingContext, SimulationMode, XmlDocumentModel,
//! };
//! use dx_simulator::routing::{DeliveryError, SubmissionGateway};
//!
//! # struct DroppingGateway;
//! # #[async_trait::async_trait]
//! # impl SubmissionGateway for DroppingGateway {
//! #     async fn submit(
//! #         &self,
//! #         _target: &str,
//! #         _message: &ExchangeMessage,
//! #     ) -> Result<(), DeliveryError> {
//! #         Ok(())
//! #     }
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let context = RoutingContext {
//!     mode: SimulationMode::Dp,
//!     dc_endpoint: "http://localhost:8081/to-dc".to_string(),
//!     dp_endpoint: "http://localhost:8082/to-dp".to_string(),
//!     auto_respond: true,
//! };
//! let router = ExchangeRouter::new(
//!     context,
//!     Arc::new(XmlDocumentModel::new()),
//!     Arc::new(CannedResponder::new()),
//!     Arc::new(DroppingGateway),
//! );
//!
//! let message = ExchangeMessage {
//!     metadata: MessageMetadata {
//!         sender: Identifier::new("iso6523-actorid-upis", "9914:dc-freedonia"),
//!         receiver: Identifier::new("iso6523-actorid-upis", "9915:dp-elonia"),
//!         doc_type: Identifier::new("bdxr-docid-qns", "RegisteredOrganization::1.0"),
//!         process: Identifier::new("bdxr-procid-agreement", "urn:dx:process:dataquery"),
//!         transport_protocol: dx_simulator::TRANSPORT_PROFILE_AS4.to_string(),
//!     },
//!     payloads: vec![MessagePayload {
//!         content_id: "request-1@dc".to_string(),
//!         mime_type: dx_simulator::MIME_APPLICATION_XML.to_string(),
//!         data: b"<QueryRequest id=\"r-1\"/>".to_vec(),
//!     }],
//! };
//!
//! let outcome = router.route(message).await.unwrap();
//! assert_eq!(outcome, RouteOutcome::AutoResponded);
//! # });
//! ```
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits events and
//! does not initialize a global subscriber; binaries and tests own one-time
//! `tracing_subscriber` initialization at process boundaries.

mod codec;
mod identifier;
mod message;

pub use codec::{DocumentKind, DocumentModel, DomainFault, XmlDocumentModel};
pub use identifier::Identifier;
pub use message::{
    sniff_mime_type, ExchangeMessage, MessageMetadata, MessagePayload, MIME_APPLICATION_OCTET_STREAM,
    MIME_APPLICATION_PDF, MIME_APPLICATION_XML, TRANSPORT_PROFILE_AS4,
};

pub mod discovery;
pub mod routing;

#[doc(hidden)]
pub mod observability;

pub use discovery::{
    CapabilitySource, DatasetFilter, DiscoveryEngine, DiscoveryProvider, TracingErrorSink,
};
pub use routing::{
    CannedResponder, ExchangeRouter, HttpSubmissionGateway, RouteOutcome, RoutingContext,
    SimulationMode,
};
