//! Targeted delivery to connected agents.
//!
//! The registry tracks live channels by the login each client claims; the
//! dispatcher pushes one frame to the one agent an event names, dropping
//! silently when that agent is offline.

mod dispatcher;
mod registry;

pub use dispatcher::{Delivery, Dispatcher};
pub use registry::{ChannelId, ConnectionRegistry, PushSender};
