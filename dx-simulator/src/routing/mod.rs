//! Message Router / Exchange Simulator: simulation-mode policy, addressing
//! inversion, auto-response, and HTTP forwarding to peer endpoints.

mod gateway;
mod responder;
mod router;
mod simulation;

pub use gateway::{
    DeliveryError, HttpSubmissionGateway, SubmissionGateway, SUBMIT_ERROR_PATH,
    SUBMIT_REQUEST_PATH, SUBMIT_RESPONSE_PATH,
};
pub use responder::{
    build_reply, AutoResponder, CannedResponder, ReplyMessage, ResponderAttachment, ResponderReply,
};
pub use router::{ExchangeRouter, RouteError, RouteOutcome};
pub use simulation::{RoutingContext, SimulationMode};
