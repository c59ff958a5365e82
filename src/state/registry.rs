//! The Registry - who is logged in, under which name, and how to reach them.
//!
//! All membership changes and all deliveries happen under a single lock.
//! Name resolution therefore cannot race with another login, and every
//! recipient sees lines in the order they were issued.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use relay_proto::{Presence, ServerLine, UserEntry, UserList};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::state::SessionId;

/// Queue feeding a session's socket writer.
pub type Outbox = mpsc::Sender<ServerLine>;

/// A logged-in session.
#[derive(Debug)]
pub struct Member {
    /// Resolved display name, unique among members.
    pub name: String,
    pub presence: Presence,
    pub joined_at: DateTime<Utc>,
    outbox: Outbox,
}

impl Member {
    /// Queue a line without waiting. Returns whether it was accepted.
    fn push(&self, id: SessionId, line: ServerLine) -> bool {
        match self.outbox.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(%id, name = %self.name, "Outbox full, dropping line");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%id, name = %self.name, "Outbox closed, dropping line");
                false
            }
        }
    }
}

/// Shared membership state, keyed by session id (acceptance order).
#[derive(Default)]
pub struct Registry {
    members: Mutex<BTreeMap<SessionId, Member>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a session in under `candidate`, or a numbered variant of it.
    ///
    /// If `n` members already use the candidate, the name becomes
    /// `candidate(n)`, counting upward until a free name is found. New
    /// members start [`Presence::Online`].
    pub fn register(
        &self,
        id: SessionId,
        candidate: &str,
        outbox: Outbox,
    ) -> Result<String, RegistryError> {
        let mut members = self.members.lock();
        if members.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentity(id));
        }

        let name = resolve_name(&members, candidate);
        members.insert(
            id,
            Member {
                name: name.clone(),
                presence: Presence::Online,
                joined_at: Utc::now(),
                outbox,
            },
        );
        debug!(%id, %name, members = members.len(), "Registered");
        Ok(name)
    }

    /// Remove a session. Returns the member if it was still registered.
    pub fn unregister(&self, id: SessionId) -> Option<Member> {
        let removed = self.members.lock().remove(&id);
        if let Some(member) = &removed {
            debug!(%id, name = %member.name, "Unregistered");
        }
        removed
    }

    /// Update a member's presence. Returns false if the session is gone.
    pub fn set_presence(&self, id: SessionId, presence: Presence) -> bool {
        match self.members.lock().get_mut(&id) {
            Some(member) => {
                member.presence = presence;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    #[cfg(test)]
    pub fn contains_name(&self, name: &str) -> bool {
        self.members.lock().values().any(|m| m.name == name)
    }

    /// Name and presence of every member, in acceptance order.
    #[cfg(test)]
    pub fn snapshot(&self, excluding: Option<SessionId>) -> UserList {
        snapshot_locked(&self.members.lock(), excluding)
    }

    /// Send each member the list of everyone else.
    pub fn broadcast_user_list(&self) {
        let members = self.members.lock();
        for (id, member) in members.iter() {
            let list = snapshot_locked(&members, Some(*id));
            member.push(*id, ServerLine::UserList(list));
        }
    }

    /// Queue a line for one session.
    pub fn deliver(&self, id: SessionId, line: ServerLine) -> bool {
        match self.members.lock().get(&id) {
            Some(member) => member.push(id, line),
            None => false,
        }
    }

    /// Queue a line for every member except `except`. Returns how many
    /// outboxes accepted it.
    pub fn deliver_to_all(&self, line: &ServerLine, except: Option<SessionId>) -> usize {
        let members = self.members.lock();
        members
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter(|(id, member)| member.push(**id, line.clone()))
            .count()
    }

    /// Queue a line for the member called `name`.
    ///
    /// Returns the recipient's id when such a member exists, whether or not
    /// its outbox had room.
    pub fn deliver_to_name(&self, name: &str, line: ServerLine) -> Option<SessionId> {
        let members = self.members.lock();
        let (id, member) = members.iter().find(|(_, m)| m.name == name)?;
        member.push(*id, line);
        Some(*id)
    }
}

fn resolve_name(members: &BTreeMap<SessionId, Member>, candidate: &str) -> String {
    let taken = |name: &str| members.values().any(|m| m.name == name);

    let mut n = members.values().filter(|m| m.name == candidate).count();
    if n == 0 {
        return candidate.to_string();
    }
    loop {
        let attempt = format!("{candidate}({n})");
        if !taken(&attempt) {
            return attempt;
        }
        n += 1;
    }
}

fn snapshot_locked(members: &BTreeMap<SessionId, Member>, excluding: Option<SessionId>) -> UserList {
    UserList::new(
        members
            .iter()
            .filter(|(id, _)| Some(**id) != excluding)
            .map(|(_, m)| UserEntry::new(m.name.clone(), m.presence))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionIdGenerator;
    use tokio::sync::mpsc::Receiver;

    fn join(
        registry: &Registry,
        ids: &SessionIdGenerator,
        name: &str,
    ) -> (SessionId, String, Receiver<ServerLine>) {
        let (tx, rx) = mpsc::channel(16);
        let id = ids.next();
        let resolved = registry.register(id, name, tx).unwrap();
        (id, resolved, rx)
    }

    #[test]
    fn test_duplicate_names_get_numbered() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();

        let (_, first, _rx1) = join(&registry, &ids, "Sam");
        let (_, second, _rx2) = join(&registry, &ids, "Sam");
        assert_eq!(first, "Sam");
        assert_eq!(second, "Sam(1)");
        assert!(registry.contains_name("Sam(1)"));
    }

    #[test]
    fn test_numbered_name_never_collides() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();

        let (_, _, _rx1) = join(&registry, &ids, "Sam");
        let (_, literal, _rx2) = join(&registry, &ids, "Sam(1)");
        let (_, third, _rx3) = join(&registry, &ids, "Sam");
        assert_eq!(literal, "Sam(1)");
        assert_eq!(third, "Sam(2)");
    }

    #[test]
    fn test_freed_name_is_reused() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();

        let (sam, _, _rx1) = join(&registry, &ids, "Sam");
        registry.unregister(sam);
        let (_, again, _rx2) = join(&registry, &ids, "Sam");
        assert_eq!(again, "Sam");
    }

    #[test]
    fn test_register_same_id_twice_fails() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();
        let (id, _, _rx) = join(&registry, &ids, "Sam");

        let (tx, _rx2) = mpsc::channel(1);
        assert!(matches!(
            registry.register(id, "Kim", tx),
            Err(RegistryError::DuplicateIdentity(dup)) if dup == id
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();
        let (id, _, _rx) = join(&registry, &ids, "Sam");

        assert!(registry.unregister(id).is_some());
        assert!(registry.unregister(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_user_list_excludes_recipient_and_keeps_order() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();
        let (a, _, mut rx_a) = join(&registry, &ids, "A");
        let (_, _, mut rx_b) = join(&registry, &ids, "B");
        let (_, _, mut rx_c) = join(&registry, &ids, "C");
        registry.set_presence(a, Presence::Idle);

        assert_eq!(registry.snapshot(None).to_string(), "A|Idle/B|Online/C|Online/");

        registry.broadcast_user_list();

        assert_eq!(rx_a.try_recv().unwrap().to_string(), "B|Online/C|Online/");
        assert_eq!(rx_b.try_recv().unwrap().to_string(), "A|Idle/C|Online/");
        assert_eq!(rx_c.try_recv().unwrap().to_string(), "A|Idle/B|Online/");
    }

    #[test]
    fn test_deliver_to_all_skips_excluded() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();
        let (a, _, mut rx_a) = join(&registry, &ids, "A");
        let (_, _, mut rx_b) = join(&registry, &ids, "B");

        let delivered = registry.deliver_to_all(&ServerLine::notice("hi"), Some(a));
        assert_eq!(delivered, 1);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), ServerLine::notice("hi"));
    }

    #[test]
    fn test_full_outbox_drops_line() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();
        let (tx, mut rx) = mpsc::channel(1);
        let id = ids.next();
        registry.register(id, "Slow", tx).unwrap();

        assert!(registry.deliver(id, ServerLine::notice("one")));
        assert!(!registry.deliver(id, ServerLine::notice("two")));
        assert_eq!(rx.try_recv().unwrap(), ServerLine::notice("one"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_deliver_to_name_reports_recipient() {
        let registry = Registry::new();
        let ids = SessionIdGenerator::new();
        let (b, _, mut rx_b) = join(&registry, &ids, "B");

        assert_eq!(registry.deliver_to_name("B", ServerLine::notice("x")), Some(b));
        assert_eq!(registry.deliver_to_name("Nobody", ServerLine::notice("x")), None);
        assert_eq!(rx_b.try_recv().unwrap(), ServerLine::notice("x"));
    }
}
