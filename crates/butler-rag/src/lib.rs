//! Retrieval side of the assistant: corpus -> embeddings -> flat index, and
//! query -> ranked document texts for the downstream generator.

pub mod engine;
pub mod handle;
pub mod prompt;

pub use engine::{RetrievalEngine, DEFAULT_TOP_K};
pub use handle::EngineHandle;
pub use prompt::{compose_prompt, prompt_messages, ChatMessage, SYSTEM_PROMPT};
