pub mod llm;
pub mod triage;

pub use llm::LlmClient;
pub use triage::TriageService;
