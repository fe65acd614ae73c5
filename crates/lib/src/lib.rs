//! callrelay core library — config, event model, dispatch, and the gateway
//! used by the CLI binary.

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod events;
pub mod gateway;
