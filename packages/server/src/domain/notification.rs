//! Events the hub sends to connections.

use super::{
    entity::{ChatMessage, Document},
    value_object::DocumentField,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Full document snapshot for a (re)joining member
    LoadCode(Document),
    AuthenticatedUser {
        display_name: String,
        user_id: String,
    },
    UsersInRoom(usize),
    UserJoinedChat {
        display_name: String,
    },
    UserLeftChat {
        display_name: String,
    },
    CodeUpdate {
        field: DocumentField,
        content: String,
    },
    ChatMessage(ChatMessage),
    UsernameAccepted,
    UsernameTaken,
    UsernameError {
        message: String,
    },
}
