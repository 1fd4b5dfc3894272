//! Dummy LLM provider — echoes the prompt back prefixed with `[echo]`.
//! Lets the client and server be exercised end to end without an API key.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {prompt}"))
    }
}
