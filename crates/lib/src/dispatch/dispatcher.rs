//! Targeted push of one event frame to one agent's channel.

use crate::dispatch::registry::ConnectionRegistry;
use crate::gateway::PushFrame;
use std::sync::Arc;

/// Outcome of a delivery attempt. Dropped is not an error: the agent is
/// simply not connected right now, and nothing is queued for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped,
}

/// Pushes frames to agents through the registry. Fan-out is 1:1 by agent
/// login, never broadcast.
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Push one frame to the agent's channel. Fire-and-forget: the send is
    /// non-blocking and the webhook response does not wait on the socket.
    pub async fn deliver(
        &self,
        agent_login: &str,
        event_name: &str,
        caller_number: &str,
        wait_duration: &str,
        caller_name: &str,
    ) -> Delivery {
        let Some((channel_id, sender)) = self.registry.lookup(agent_login).await else {
            log::debug!("agent {} not connected, dropping {}", agent_login, event_name);
            return Delivery::Dropped;
        };
        let frame = PushFrame::new(event_name, caller_number, wait_duration, caller_name);
        let text = match serde_json::to_string(&frame) {
            Ok(t) => t,
            Err(e) => {
                log::error!("failed to serialize push frame: {}", e);
                return Delivery::Dropped;
            }
        };
        if sender.send(text).is_err() {
            // Socket task already exited; its own unregister cleans the entry up.
            log::debug!(
                "channel {} closed mid-delivery, dropping {}",
                channel_id.as_str(),
                event_name
            );
            return Delivery::Dropped;
        }
        log::info!(
            "delivered {} to agent {} on channel {}",
            event_name,
            agent_login,
            channel_id.as_str()
        );
        Delivery::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::registry::ChannelId;
    use crate::events::EVENT_CALL_ANSWERED;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn delivers_one_frame_to_the_registered_channel() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .register(ChannelId::new(), "agent1".to_string(), tx)
            .await;
        let dispatcher = Dispatcher::new(registry);

        let outcome = dispatcher
            .deliver("agent1", EVENT_CALL_ANSWERED, "+15550100", "00:00:42", "Jane DOE")
            .await;
        assert_eq!(outcome, Delivery::Delivered);

        let text = rx.recv().await.expect("one frame pushed");
        let frame: serde_json::Value = serde_json::from_str(&text).expect("frame is JSON");
        assert_eq!(frame["type"], "event");
        assert_eq!(frame["event"], EVENT_CALL_ANSWERED);
        assert_eq!(frame["payload"]["callerNumber"], "+15550100");
        assert_eq!(frame["payload"]["waitDuration"], "00:00:42");
        assert_eq!(frame["payload"]["callerName"], "Jane DOE");
        assert!(rx.try_recv().is_err(), "exactly one push per delivery");
    }

    #[tokio::test]
    async fn drops_when_agent_is_not_connected() {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Dispatcher::new(registry);
        let outcome = dispatcher
            .deliver("agent2", EVENT_CALL_ANSWERED, "+15550100", "00:00:42", "Jane DOE")
            .await;
        assert_eq!(outcome, Delivery::Dropped);
    }

    #[tokio::test]
    async fn drops_after_unregister() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = ChannelId::new();
        registry.register(id.clone(), "agent1".to_string(), tx).await;
        registry.unregister(&id).await;
        let dispatcher = Dispatcher::new(registry);

        let outcome = dispatcher
            .deliver("agent1", EVENT_CALL_ANSWERED, "+15550100", "00:00:42", "Jane DOE")
            .await;
        assert_eq!(outcome, Delivery::Dropped);
    }
}
