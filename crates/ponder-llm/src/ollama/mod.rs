mod client;

pub use client::{OllamaClient, OLLAMA_API_BASE};
