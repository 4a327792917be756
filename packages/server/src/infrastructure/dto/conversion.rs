//! Conversion between DTOs and domain models.

use tsudoi_shared::time::timestamp_to_rfc3339;

use crate::domain::{Document, Member, Notification, RoomSession};
use crate::infrastructure::dto::{
    http::{MemberDto, RoomDetailDto, RoomSummaryDto},
    websocket::{DocumentDto, ServerEvent},
};

// ========================================
// Domain → DTO
// ========================================

impl From<Document> for DocumentDto {
    fn from(document: Document) -> Self {
        Self {
            html: document.html,
            css: document.css,
            js: document.js,
        }
    }
}

impl From<Notification> for ServerEvent {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::LoadCode(document) => ServerEvent::LoadCode {
                document: document.into(),
            },
            Notification::AuthenticatedUser {
                display_name,
                user_id,
            } => ServerEvent::AuthenticatedUser {
                display_name,
                user_id,
            },
            Notification::UsersInRoom(count) => ServerEvent::UsersInRoom { count },
            Notification::UserJoinedChat { display_name } => {
                ServerEvent::UserJoinedChat { display_name }
            }
            Notification::UserLeftChat { display_name } => ServerEvent::UserLeftChat { display_name },
            Notification::CodeUpdate { field, content } => ServerEvent::CodeUpdate { field, content },
            Notification::ChatMessage(message) => ServerEvent::ChatMessage {
                display_name: message.display_name,
                body: message.body,
                sent_at: message.sent_at.value(),
                connection_id: message.connection_id.into_string(),
            },
            Notification::UsernameAccepted => ServerEvent::UsernameAccepted,
            Notification::UsernameTaken => ServerEvent::UsernameTaken,
            Notification::UsernameError { message } => ServerEvent::UsernameError { message },
        }
    }
}

impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            connection_id: member.connection_id.as_str().to_string(),
            display_name: member.display_name.clone(),
            verified: member.verified,
        }
    }
}

impl From<&RoomSession> for RoomSummaryDto {
    fn from(room: &RoomSession) -> Self {
        Self {
            id: room.id().as_str().to_string(),
            member_count: room.member_count(),
            display_names: room.reserved_names(),
            created_at: timestamp_to_rfc3339(room.created_at().value()),
        }
    }
}

impl From<&RoomSession> for RoomDetailDto {
    fn from(room: &RoomSession) -> Self {
        Self {
            id: room.id().as_str().to_string(),
            created_at: timestamp_to_rfc3339(room.created_at().value()),
            members: room.members().into_iter().map(MemberDto::from).collect(),
            document: room.document().clone().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChatMessage, ConnectionId, ConnectionIdentity, DocumentField, RoomId, Timestamp,
        VerifiedIdentity,
    };

    fn sample_room() -> RoomSession {
        let mut room = RoomSession::new(RoomId::new("R1"), 0, Timestamp::new(0));
        room.add_member(Member::guest(ConnectionId::new("c2")));
        room.add_member(Member::from_identity(
            ConnectionId::new("c1"),
            &ConnectionIdentity::Verified(VerifiedIdentity {
                user_id: "u-1".to_string(),
                display_name: "alice".to_string(),
            }),
        ));
        room.apply_edit(DocumentField::Js, "go()".to_string());
        room
    }

    #[test]
    fn test_chat_notification_to_event() {
        // テスト項目: ChatMessage の通知が chat-message イベントに変換される
        // given (前提条件):
        let notification = Notification::ChatMessage(ChatMessage {
            display_name: "bob".to_string(),
            body: "Hi!".to_string(),
            sent_at: Timestamp::new(2000),
            connection_id: ConnectionId::new("c2"),
        });

        // when (操作):
        let event: ServerEvent = notification.into();

        // then (期待する結果):
        assert_eq!(
            event,
            ServerEvent::ChatMessage {
                display_name: "bob".to_string(),
                body: "Hi!".to_string(),
                sent_at: 2000,
                connection_id: "c2".to_string(),
            }
        );
    }

    #[test]
    fn test_users_in_room_notification_to_event() {
        // テスト項目: 人数の通知が users-in-room イベントに変換される
        // when (操作):
        let event: ServerEvent = Notification::UsersInRoom(3).into();

        // then (期待する結果):
        assert_eq!(event, ServerEvent::UsersInRoom { count: 3 });
    }

    #[test]
    fn test_room_to_summary() {
        // テスト項目: RoomSession が一覧用の DTO に変換される
        // when (操作):
        let summary = RoomSummaryDto::from(&sample_room());

        // then (期待する結果):
        assert_eq!(summary.id, "R1");
        assert_eq!(summary.member_count, 2);
        assert_eq!(summary.display_names, vec!["alice".to_string()]);
        assert_eq!(summary.created_at, "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_room_to_detail() {
        // テスト項目: RoomSession が詳細用の DTO に変換され、メンバーは接続 ID 順に並ぶ
        // when (操作):
        let detail = RoomDetailDto::from(&sample_room());

        // then (期待する結果):
        assert_eq!(
            detail.members,
            vec![
                MemberDto {
                    connection_id: "c1".to_string(),
                    display_name: Some("alice".to_string()),
                    verified: true,
                },
                MemberDto {
                    connection_id: "c2".to_string(),
                    display_name: None,
                    verified: false,
                },
            ]
        );
        assert_eq!(detail.document.js, "go()");
    }
}
