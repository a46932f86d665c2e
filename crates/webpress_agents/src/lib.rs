//! # webpress_agents - Agent personas for WebPress Architect
//!
//! This crate defines the closed set of agent personas that drive prompt
//! framing and knowledge-base merge behavior in the chat core, plus the
//! static security heuristics applied to generated snippets:
//!
//! - **Personas**: Architect, Copywriter, Visionary, System, each with an
//!   explicit merge strategy for structured payloads it produces
//! - **Security scan**: shallow lexical checks for the most common
//!   WordPress pitfalls (CSRF, XSS, SQL injection)

pub mod persona;
pub mod security;

pub use persona::*;
pub use security::*;
