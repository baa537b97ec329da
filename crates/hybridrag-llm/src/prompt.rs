use serde_json::{json, Value};

use hybridrag_core::types::{Document, Turn};

pub const ANSWER_SYSTEM: &str = "You are an assistant answering questions based on the provided context. \
Use the context to provide a concise and accurate answer to the question.";

pub const FOLLOW_UP_SYSTEM: &str = "You review answers produced from retrieved documents. \
If the answer fully addresses the question, reply with exactly NONE. \
Otherwise reply with one follow-up question that would retrieve the missing information, and nothing else.";

/// Numbered passages, blank-line separated.
pub fn render_context(context: &[Document]) -> String {
    context.iter().enumerate().map(|(i, d)| format!("[{}] {}", i + 1, d.text.trim())).collect::<Vec<_>>().join("\n\n")
}

pub fn answer_messages(question: &str, context: &[Document], history: Option<&[Turn]>) -> Vec<Value> {
    let mut messages = vec![json!({ "role": "system", "content": ANSWER_SYSTEM })];
    for turn in history.unwrap_or_default() {
        messages.push(json!({ "role": "user", "content": turn.question }));
        messages.push(json!({ "role": "assistant", "content": turn.answer }));
    }
    let user = format!("Context:\n{}\n\nQuestion:\n{}\n\nAnswer:", render_context(context), question);
    messages.push(json!({ "role": "user", "content": user }));
    messages
}

pub fn follow_up_messages(question: &str, answer: &str) -> Vec<Value> {
    vec![
        json!({ "role": "system", "content": FOLLOW_UP_SYSTEM }),
        json!({ "role": "user", "content": format!("Question:\n{question}\n\nAnswer:\n{answer}") }),
    ]
}
