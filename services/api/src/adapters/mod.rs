pub mod structured_llm;

pub use structured_llm::OpenAiStructuredAdapter;
