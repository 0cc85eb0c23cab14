//! Extension bridge: message contract, request channel and stdio transport.

pub mod channel;
pub mod contract;
pub mod framing;
pub mod stdio;

pub use channel::{BridgeClient, BridgeServer, VerificationHandler, bridge_channel};
pub use contract::{BridgeCommand, BridgeRequest, BridgeResponse, SourceEntry, parse_request};
pub use framing::{Frame, Framing};
pub use stdio::{run_bridge, run_stdio_bridge};
