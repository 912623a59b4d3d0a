//! Prompt assembly for the downstream generator. The generation call itself
//! lives with the caller.

use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "你是一个专业的中文智能家居助手。";

/// Joins `docs` with newlines and wraps them and the question in the manual-QA instruction.
pub fn compose_prompt<S: AsRef<str>>(docs: &[S], query: &str) -> String {
    let context = docs.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
    format!("你是一个专业的中文智能家居助手，请结合以下说明书内容回答用户的问题：\n\n{context}\n\n用户提问：{query}")
}

/// One message of an OpenAI-style chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// System + user messages ready to forward to a chat-completion endpoint.
pub fn prompt_messages<S: AsRef<str>>(docs: &[S], query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage { role: "system".into(), content: SYSTEM_PROMPT.into() },
        ChatMessage { role: "user".into(), content: compose_prompt(docs, query) },
    ]
}
