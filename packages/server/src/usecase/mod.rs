//! UseCase layer: one use case per inbound event, plus the Connection Gate,
//! the Persistence Bridge and the read-only room queries.

mod disconnect;
mod edit_document;
mod get_rooms;
mod join_room;
mod leave_room;
mod persistence;
mod resolve_identity;
mod send_chat_message;
mod set_username;

#[cfg(test)]
pub(crate) mod test_support;

pub use disconnect::DisconnectUseCase;
pub use edit_document::EditDocumentUseCase;
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use persistence::PersistenceBridge;
pub use resolve_identity::ResolveIdentityUseCase;
pub use send_chat_message::SendChatMessageUseCase;
pub use set_username::SetUsernameUseCase;
