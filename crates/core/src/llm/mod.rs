pub mod error;
pub mod gemini;
pub mod json;
pub mod prompt;
pub mod sources;

use crate::llm::sources::GroundingChunk;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Attach the provider's web search tool to the call.
    pub grounding: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
}

#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(&self, request: GenerateRequest) -> anyhow::Result<ModelReply>;
}
