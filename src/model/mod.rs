pub mod config;
pub mod kb;
pub mod severity;
pub mod ticket;

pub use config::{Config, LlmConfig, StoreConfig};
pub use kb::{KnowledgeBase, KnowledgeBaseEntry};
pub use severity::Severity;
pub use ticket::{AnalysisSource, ClassificationResult, LlmExtraction};
