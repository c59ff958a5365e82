//! Message routing.
//!
//! Turns one parsed [`AddressedMessage`] from a logged-in session into
//! registry deliveries:
//! - `<?>` control messages: quit and presence changes
//! - `<*>` broadcasts to everyone (but the sender, unless echo is on)
//! - `<name>` whispers, delivered to the recipient and echoed to the sender

pub mod notices;

use std::sync::Arc;

use relay_proto::{AddressedMessage, Presence, Recipient, ServerLine};
use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::state::{Registry, SessionId};

/// Control body that ends a session.
pub const QUIT: &str = "quit";

/// What the session loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Result of attempting to route a whisper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperResult {
    /// Queued for the recipient and echoed to the sender.
    Sent,
    /// Sender whispered to themselves; delivered once.
    SentToSelf,
    /// No member has that name.
    NoSuchUser,
}

/// Identity of the session a message came from.
#[derive(Debug, Clone, Copy)]
pub struct Sender<'a> {
    pub id: SessionId,
    pub name: &'a str,
}

pub struct Router {
    registry: Arc<Registry>,
    policy: PolicyConfig,
}

impl Router {
    pub fn new(registry: Arc<Registry>, policy: PolicyConfig) -> Self {
        Self { registry, policy }
    }

    pub fn dispatch(&self, sender: Sender<'_>, message: AddressedMessage) -> Flow {
        match message.recipient {
            Recipient::Server => self.dispatch_control(sender, &message.body),
            Recipient::Everyone => {
                self.dispatch_broadcast(sender, message.body);
                Flow::Continue
            }
            Recipient::User(target) => {
                self.dispatch_whisper(sender, &target, message.body);
                Flow::Continue
            }
        }
    }

    /// Handle `<?><body>`. Every control message ends with a user list push,
    /// including unrecognised ones.
    pub fn dispatch_control(&self, sender: Sender<'_>, body: &str) -> Flow {
        let flow = if body == QUIT {
            self.registry.unregister(sender.id);
            info!(id = %sender.id, name = %sender.name, "User quit");
            Flow::Quit
        } else {
            match body.parse::<Presence>() {
                Ok(presence) if presence.is_selectable() => {
                    self.registry.set_presence(sender.id, presence);
                    info!(id = %sender.id, name = %sender.name, %presence, "Presence changed");
                }
                _ => debug!(id = %sender.id, %body, "Ignoring unknown control message"),
            }
            Flow::Continue
        };

        self.registry.broadcast_user_list();
        flow
    }

    /// Handle `<*><body>`. Returns how many sessions the line was queued for.
    pub fn dispatch_broadcast(&self, sender: Sender<'_>, body: String) -> usize {
        let line = ServerLine::Broadcast {
            from: sender.name.to_string(),
            body,
        };
        let except = (!self.policy.echo_broadcasts).then_some(sender.id);
        self.registry.deliver_to_all(&line, except)
    }

    /// Handle `<target><body>`.
    pub fn dispatch_whisper(&self, sender: Sender<'_>, target: &str, body: String) -> WhisperResult {
        let line = ServerLine::Whisper {
            to: target.to_string(),
            from: sender.name.to_string(),
            body,
        };

        match self.registry.deliver_to_name(target, line.clone()) {
            Some(recipient) if recipient == sender.id => WhisperResult::SentToSelf,
            Some(_) => {
                self.registry.deliver(sender.id, line);
                WhisperResult::Sent
            }
            None => {
                debug!(id = %sender.id, %target, "Whisper to unknown user dropped");
                if self.policy.notify_unknown_recipient {
                    self.registry
                        .deliver(sender.id, ServerLine::Notice(notices::no_such_user(target)));
                }
                WhisperResult::NoSuchUser
            }
        }
    }

    pub fn announce_entrance(&self, name: &str) {
        self.registry
            .deliver_to_all(&ServerLine::Notice(notices::entered(name)), None);
    }

    pub fn announce_departure(&self, name: &str) {
        self.registry
            .deliver_to_all(&ServerLine::Notice(notices::left(name)), None);
    }
}
