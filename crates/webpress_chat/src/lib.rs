//! # webpress_chat - Chat core for WebPress Architect
//!
//! This crate implements the task-classification-and-routing core of the
//! WebPress Architect assistant:
//! - Intent classification of free-form WordPress/Elementor tasks
//! - Deterministic model routing with a single completion fallback
//! - Artifact extraction with a static security scan per snippet
//! - Knowledge-base merging into accumulated project context
//!
//! The UI layer is an external collaborator: it feeds user messages and
//! attachments into [`pipeline::ChatPipeline`] and renders whatever the
//! session store holds afterwards.
//!
//! ## Architecture
//!
//! ```text
//! user message
//!      │
//!      ▼
//! ┌────────────┐    ┌──────────┐    ┌───────────────────┐
//! │ Classifier │───▶│  Router  │───▶│ Completion Client │
//! └────────────┘    └──────────┘    └─────────┬─────────┘
//!                                             │ (one fallback)
//!                                             ▼
//!                                   ┌────────────────────┐
//!                                   │ Response Processor │
//!                                   └─────────┬──────────┘
//!                                             ▼
//!                                   ┌────────────────────┐
//!                                   │   Session Store    │
//!                                   └────────────────────┘
//! ```

pub mod classifier;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod processor;
pub mod prompt;
pub mod router;
pub mod session;
pub mod settings;
pub mod types;

pub use classifier::*;
pub use error::*;
pub use llm::*;
pub use pipeline::*;
pub use processor::*;
pub use prompt::*;
pub use router::*;
pub use session::*;
pub use settings::*;
pub use types::*;
