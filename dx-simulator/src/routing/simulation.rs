//! Simulation-mode policy inputs shared by the router.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Working mode of the simulator process.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Simulate only the exchange infrastructure; both parties are external.
    Sole,
    /// The data-consuming party runs inside this process.
    Dc,
    /// The data-providing party runs inside this process.
    Dp,
}

impl Display for SimulationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationMode::Sole => write!(f, "sole"),
            SimulationMode::Dc => write!(f, "dc"),
            SimulationMode::Dp => write!(f, "dp"),
        }
    }
}

/// Read-only routing configuration for the life of the router: the simulation
/// mode, the two peer endpoints, and the auto-response switch.
#[derive(Clone, Debug)]
pub struct RoutingContext {
    pub mode: SimulationMode,
    /// Endpoint a response or error response is delivered to.
    pub dc_endpoint: String,
    /// Endpoint a request is delivered to when the DP is external.
    pub dp_endpoint: String,
    pub auto_respond: bool,
}
