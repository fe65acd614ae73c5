//! Connection registry: live agent channels by claimed login.

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

/// Frames are serialized before they enter the channel; the socket task only
/// forwards text.
pub type PushSender = UnboundedSender<String>;

/// Server-generated id for one live channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber {
    channel_id: ChannelId,
    agent_login: String,
    sender: PushSender,
}

/// Live channels in insertion order, guarded by one lock. The claimed login
/// is not authenticated; duplicates are allowed and lookups return the
/// earliest live registration.
pub struct ConnectionRegistry {
    inner: RwLock<Vec<Subscriber>>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    /// Called when a channel opens.
    pub async fn register(&self, channel_id: ChannelId, agent_login: String, sender: PushSender) {
        let mut g = self.inner.write().await;
        g.push(Subscriber {
            channel_id,
            agent_login,
            sender,
        });
    }

    /// Called when a channel closes. Unknown ids are ignored: the socket task
    /// unregisters exactly once, so a miss only happens on a close race.
    pub async fn unregister(&self, channel_id: &ChannelId) {
        let mut g = self.inner.write().await;
        match g.iter().position(|s| &s.channel_id == channel_id) {
            Some(i) => {
                g.remove(i);
            }
            None => log::debug!("unregister: channel {} not present", channel_id.as_str()),
        }
    }

    /// First live channel registered for the login, in insertion order. The
    /// sender is cloned out so no lock is held while pushing.
    pub async fn lookup(&self, agent_login: &str) -> Option<(ChannelId, PushSender)> {
        let g = self.inner.read().await;
        g.iter()
            .find(|s| s.agent_login == agent_login)
            .map(|s| (s.channel_id.clone(), s.sender.clone()))
    }

    /// Number of live channels (health and tests).
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
