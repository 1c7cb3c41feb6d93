//! Generation backends for narrative insight synthesis.
//!
//! Each backend turns a prompt into raw text over one provider's API. The
//! pipeline works fully without any of them: a backend failure is absorbed
//! by the insight engine's deterministic fallback.

mod anthropic;
mod backend;
mod gemini;
mod mock;
mod openai;

pub use anthropic::AnthropicBackend;
pub use backend::{GenerationBackend, GenerationConfig};
pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
