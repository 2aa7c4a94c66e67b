//! Fixed prompt and transcript text.

/// System instruction sent with every request unless overridden in config.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert programmer and AI code assistant. Provide clear, concise, and correct code examples in Markdown format.";

/// First model message shown when a session starts.
pub const GREETING: &str = "Hello! I am your AI Code Assistant. How can I help you today?";

/// Replacement content for a model message whose request failed.
pub const FALLBACK_ERROR_TEXT: &str =
    "Sorry, something went wrong. Please check your API key and try again.";
