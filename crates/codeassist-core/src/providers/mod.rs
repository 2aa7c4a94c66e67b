//! LLM provider implementations.

pub mod gemini;
pub mod shared;

pub use shared::{
    GenerateRequest, ProviderError, ProviderErrorKind, ProviderResult, TextChunk, TextStream,
    resolve_api_key, resolve_base_url,
};
