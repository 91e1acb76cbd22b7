//! Conversation message record.

use serde::{Deserialize, Serialize};

use crate::keys::IndexField;

use super::Record;

const CONVERSATION: &[u8] = b"conversation";
const CREATED_AT: &[u8] = b"created_at";

/// A chat message, paged per conversation in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub created_at_millis: i64,
    pub body: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        conversation_id: impl Into<String>,
        created_at_millis: i64,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            created_at_millis,
            body: body.into(),
        }
    }

    /// Group fields selecting every message of one conversation
    pub fn conversation(conversation_id: &str) -> Vec<IndexField> {
        vec![IndexField::new(CONVERSATION, conversation_id)]
    }
}

impl Record for Message {
    const KIND: &'static [u8] = b"message";

    fn id(&self) -> &[u8] {
        self.id.as_bytes()
    }

    fn index_fields(&self) -> Vec<IndexField> {
        vec![
            IndexField::new(CONVERSATION, self.conversation_id.as_str()),
            IndexField::new(CREATED_AT, self.created_at_millis),
        ]
    }
}
