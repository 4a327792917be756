//! Shared application state.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tsudoi_shared::time::Clock;

use crate::{
    domain::{DocumentStore, IdentityResolver, MessagePusher, RoomRegistry},
    infrastructure::message_pusher::WebSocketMessagePusher,
    usecase::{
        DisconnectUseCase, EditDocumentUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, PersistenceBridge, ResolveIdentityUseCase,
        SendChatMessageUseCase, SetUsernameUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Connection Gate（接続時の認証）
    pub resolve_identity_usecase: Arc<ResolveIdentityUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub set_username_usecase: Arc<SetUsernameUseCase>,
    pub edit_document_usecase: Arc<EditDocumentUseCase>,
    pub send_chat_message_usecase: Arc<SendChatMessageUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// 終了時に保存キューを flush するために保持する
    pub persistence: Arc<PersistenceBridge>,
}

impl AppState {
    /// Wire the hub together.
    ///
    /// Dependencies are created in order: registry, message pusher,
    /// persistence bridge, use cases.
    pub fn assemble(
        store: Arc<dyn DocumentStore>,
        resolver: Option<Arc<dyn IdentityResolver>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let message_pusher: Arc<dyn MessagePusher> =
            Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new()))));
        let persistence = Arc::new(PersistenceBridge::new(store));

        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            persistence.clone(),
        ));

        Self {
            resolve_identity_usecase: Arc::new(ResolveIdentityUseCase::new(resolver)),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                persistence.clone(),
                clock.clone(),
            )),
            set_username_usecase: Arc::new(SetUsernameUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            edit_document_usecase: Arc::new(EditDocumentUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                persistence.clone(),
                clock.clone(),
            )),
            send_chat_message_usecase: Arc::new(SendChatMessageUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock,
            )),
            disconnect_usecase: Arc::new(DisconnectUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                leave_room_usecase.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(registry.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(registry)),
            leave_room_usecase,
            message_pusher,
            persistence,
        }
    }
}
