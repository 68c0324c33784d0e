// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod groq;

#[cfg(test)]
pub mod mock;

pub use provider::*;
