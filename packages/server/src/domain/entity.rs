//! Entities: the room session and everything it owns.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{
    error::UsernameError,
    identity::ConnectionIdentity,
    value_object::{ConnectionId, DocumentField, RoomId, Timestamp},
};

/// The shared three-field document of a room.
///
/// Every field holds the most recent value written to it. There is no merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl Document {
    pub fn get(&self, field: DocumentField) -> &str {
        match field {
            DocumentField::Html => &self.html,
            DocumentField::Css => &self.css,
            DocumentField::Js => &self.js,
        }
    }

    pub fn set(&mut self, field: DocumentField, content: String) {
        match field {
            DocumentField::Html => self.html = content,
            DocumentField::Css => self.css = content,
            DocumentField::Js => self.js = content,
        }
    }
}

/// A connection's participation record within one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    /// `None` until a guest claims a name. Verified members get theirs at join time.
    pub display_name: Option<String>,
    pub verified: bool,
    pub user_id: Option<String>,
}

impl Member {
    /// Build the member record for a connection joining with `identity`.
    pub fn from_identity(connection_id: ConnectionId, identity: &ConnectionIdentity) -> Self {
        match identity {
            ConnectionIdentity::Verified(verified) => Self {
                connection_id,
                display_name: Some(verified.display_name.clone()),
                verified: true,
                user_id: Some(verified.user_id.clone()),
            },
            ConnectionIdentity::Anonymous => Self::guest(connection_id),
        }
    }

    pub fn guest(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            display_name: None,
            verified: false,
            user_id: None,
        }
    }
}

/// A chat line. Relayed to the room, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub display_name: String,
    pub body: String,
    pub sent_at: Timestamp,
    pub connection_id: ConnectionId,
}

/// Per-room state: members, reserved display names and the shared document.
///
/// Reserved names are tracked with a holder count so that two verified
/// members sharing a name keep it reserved until both are gone. The key set
/// always equals the set of assigned member names.
#[derive(Debug, Clone)]
pub struct RoomSession {
    id: RoomId,
    generation: u64,
    created_at: Timestamp,
    members: HashMap<ConnectionId, Member>,
    reserved_names: HashMap<String, usize>,
    document: Document,
    edited_fields: HashSet<DocumentField>,
    evicted: bool,
}

impl RoomSession {
    /// Create an empty room with an empty document.
    ///
    /// `generation` distinguishes successive incarnations of the same room id.
    pub fn new(id: RoomId, generation: u64, created_at: Timestamp) -> Self {
        Self {
            id,
            generation,
            created_at,
            members: HashMap::new(),
            reserved_names: HashMap::new(),
            document: Document::default(),
            edited_fields: HashSet::new(),
            evicted: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members.get(connection_id)
    }

    /// Members sorted by connection id.
    pub fn members(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
        members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.keys().cloned().collect()
    }

    /// Every member except `exclude`.
    pub fn member_ids_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .keys()
            .filter(|id| *id != exclude)
            .cloned()
            .collect()
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains_key(name)
    }

    /// Reserved display names, sorted.
    pub fn reserved_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.reserved_names.keys().cloned().collect();
        names.sort();
        names
    }

    /// Insert a member, reserving its display name if it has one.
    ///
    /// A connection that is already a member is replaced, releasing the name it
    /// held. Verified names are reserved without a collision check.
    pub fn add_member(&mut self, member: Member) {
        self.remove_member(&member.connection_id);
        if let Some(name) = &member.display_name {
            self.reserve(name.clone());
        }
        self.members.insert(member.connection_id.clone(), member);
    }

    /// Remove a member and release its display name.
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let member = self.members.remove(connection_id)?;
        if let Some(name) = &member.display_name {
            self.release(name);
        }
        Some(member)
    }

    /// Give a guest member the display name `requested`.
    ///
    /// A guest that already holds a name gives it up for the new one.
    pub fn assign_name(
        &mut self,
        connection_id: &ConnectionId,
        requested: &str,
    ) -> Result<(), UsernameError> {
        let member = self
            .members
            .get(connection_id)
            .ok_or(UsernameError::MemberNotFound)?;
        if member.verified {
            return Err(UsernameError::VerifiedIdentity);
        }
        if requested.trim().is_empty() {
            return Err(UsernameError::Blank);
        }
        if self.is_reserved(requested) {
            return Err(UsernameError::Taken(requested.to_string()));
        }

        let previous = self
            .members
            .get_mut(connection_id)
            .and_then(|member| member.display_name.replace(requested.to_string()));
        if let Some(previous) = previous {
            self.release(&previous);
        }
        self.reserve(requested.to_string());
        Ok(())
    }

    /// Overwrite one document field (last write wins).
    pub fn apply_edit(&mut self, field: DocumentField, content: String) {
        self.edited_fields.insert(field);
        self.document.set(field, content);
    }

    /// Merge a document loaded from storage into this room.
    ///
    /// Fields edited since the room was created keep their in-memory value.
    /// Returns `true` when any field changed.
    pub fn apply_loaded_document(&mut self, mut loaded: Document) -> bool {
        let mut changed = false;
        for field in DocumentField::ALL {
            if self.edited_fields.contains(&field) {
                continue;
            }
            let content = match field {
                DocumentField::Html => std::mem::take(&mut loaded.html),
                DocumentField::Css => std::mem::take(&mut loaded.css),
                DocumentField::Js => std::mem::take(&mut loaded.js),
            };
            if self.document.get(field) != content {
                self.document.set(field, content);
                changed = true;
            }
        }
        changed
    }

    pub fn is_evicted(&self) -> bool {
        self.evicted
    }

    pub(crate) fn mark_evicted(&mut self) {
        self.evicted = true;
    }

    fn reserve(&mut self, name: String) {
        *self.reserved_names.entry(name).or_insert(0) += 1;
    }

    fn release(&mut self, name: &str) {
        if let Some(holders) = self.reserved_names.get_mut(name) {
            *holders -= 1;
            if *holders == 0 {
                self.reserved_names.remove(name);
            }
        }
    }
}
