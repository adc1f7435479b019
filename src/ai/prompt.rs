//! Prompt building for AI requests.
//!
//! The prompt is the desktop context snapshot followed by what the user
//! typed; no system prompt or earlier turns are sent.

/// Build the text sent to the AI for one user message.
pub fn build_prompt(context: &str, user_message: &str) -> String {
    let mut prompt = String::with_capacity(context.len() + user_message.len() + 16);
    prompt.push_str(context);
    prompt.push_str("\n\nUser said: ");
    prompt.push_str(user_message);
    prompt
}
