pub mod catalog;
pub mod config;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;

pub use catalog::PromptCatalog;
pub use config::{Config, GeminiConfig, PacingConfig};
pub use error::{NanoError, Result};
pub use gemini::{GeminiClient, ImageClient};
pub use generation::{BatchJob, BatchOrchestrator, ModelInvoker, Pacer, SeedAllocator};
pub use models::*;
