mod openai;
mod provider;
mod vertexai;

pub use openai::OpenAIProvider;
pub use provider::EmbeddingProvider;
pub use vertexai::VertexAIProvider;
