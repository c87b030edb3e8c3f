//! Pixel Art Genie: refine a free-form idea into a pixel-art prompt with a
//! text model, then render it with an image model.

#[cfg(feature = "bedrock")]
pub mod bedrock;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod ui;

#[cfg(feature = "bedrock")]
pub use bedrock::BedrockClient;
pub use config::{Backend, BedrockConfig, Config, GeminiConfig};
pub use error::{GenieError, Result};
pub use gemini::GeminiClient;
pub use models::EncodedImage;
pub use pipeline::{AppState, Orchestrator};
pub use services::{ImageGenerator, PromptRefiner};
