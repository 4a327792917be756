//! Domain layer: rooms, members, the shared document and the interfaces the
//! hub needs from the outside world.

pub mod entity;
pub mod error;
pub mod identity;
pub mod message_pusher;
pub mod notification;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Document, Member, RoomSession};
pub use error::{IdentityError, MessagePushError, StoreError, UsernameError};
pub use identity::{ConnectionIdentity, IdentityResolver, UserDirectory, UserProfile, VerifiedIdentity};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::Notification;
pub use registry::{RegistryGuard, RoomRegistry};
pub use repository::DocumentStore;
pub use value_object::{ConnectionId, DocumentField, RoomId, Timestamp};
