//! WebSocket event DTOs.
//!
//! Every frame is a JSON object tagged by `"type"`:
//!
//! ```json
//! {"type":"code-change","roomId":"R1","field":"css","content":"h1{}"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::DocumentField;

/// Events sent by a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinRoom {
        room_id: String,
    },
    LeaveRoom {
        room_id: String,
    },
    SetUsername {
        room_id: String,
        username: String,
    },
    SendMessage {
        room_id: String,
        message: String,
    },
    CodeChange {
        room_id: String,
        field: DocumentField,
        content: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDto {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// Events sent to connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    LoadCode {
        document: DocumentDto,
    },
    AuthenticatedUser {
        display_name: String,
        user_id: String,
    },
    UsersInRoom {
        count: usize,
    },
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
    ChatMessage {
        display_name: String,
        body: String,
        /// Unix timestamp (ms)
        sent_at: i64,
        connection_id: String,
    },
    UsernameAccepted,
    UsernameTaken,
    UsernameError {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_code_change() {
        // テスト項目: code-change イベントが camelCase のフィールドでパースされる
        // given (前提条件):
        let text = r#"{"type":"code-change","roomId":"R1","field":"css","content":"h1{}"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::CodeChange {
                room_id: "R1".to_string(),
                field: DocumentField::Css,
                content: "h1{}".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unknown_field_name_fails() {
        // テスト項目: 未知のドキュメントフィールドはパースエラーになる
        // given (前提条件):
        let text = r#"{"type":"code-change","roomId":"R1","field":"svg","content":""}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(text);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        // テスト項目: 未知のイベント種別はパースエラーになる
        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"dance","roomId":"R1"}"#);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_chat_message() {
        // テスト項目: chat-message は type タグと camelCase のフィールドで出力される
        // given (前提条件):
        let event = ServerEvent::ChatMessage {
            display_name: "alice".to_string(),
            body: "hi".to_string(),
            sent_at: 1000,
            connection_id: "c1".to_string(),
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "type": "chat-message",
                "displayName": "alice",
                "body": "hi",
                "sentAt": 1000,
                "connectionId": "c1",
            })
        );
    }

    #[test]
    fn test_serialize_unit_events() {
        // テスト項目: ペイロードのないイベントは type のみを持つ
        // when (操作):
        let accepted = serde_json::to_value(ServerEvent::UsernameAccepted).unwrap();
        let taken = serde_json::to_value(ServerEvent::UsernameTaken).unwrap();

        // then (期待する結果):
        assert_eq!(accepted, json!({"type": "username-accepted"}));
        assert_eq!(taken, json!({"type": "username-taken"}));
    }
}
