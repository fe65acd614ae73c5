//! Gateway: webhook sink + WebSocket fan-out on a single port.
//!
//! Inbound POSTs from the event distribution system are validated against
//! two shared-secret headers, classified, and relayed to the one connected
//! agent the event names.

mod protocol;
mod server;
mod validate;

pub use protocol::{PushFrame, PushPayload, ValidationResponse};
pub use server::{run_gateway, RelayState};
pub use validate::{
    validate_headers, Rejection, HEADER_DELIVERY_COUNT, HEADER_SECRET, HEADER_SUBSCRIPTION_NAME,
};
