//! Scripted in-memory judge client for tests and offline dry runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmClient, LlmResponse};

/// Client that replays canned responses instead of calling a model.
///
/// Queued responses are consumed in order; once the queue drains, the
/// fixed response (if any) answers every remaining call. An exhausted
/// script with no fixed response fails the call, which the engine treats
/// like any other collaborator failure.
pub struct ScriptedClient {
    fixed: Option<String>,
    queue: Mutex<VecDeque<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            fixed: None,
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            fixed: Some(response.into()),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_queue<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fixed: None,
            queue: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn push(&self, response: impl Into<String>) {
        self.queue.lock().unwrap().push_back(response.into());
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> anyhow::Result<LlmResponse> {
        let queued = self.queue.lock().unwrap().pop_front();
        let text = match queued.or_else(|| self.fixed.clone()) {
            Some(text) => text,
            None => anyhow::bail!("scripted client: no more responses"),
        };
        Ok(LlmResponse {
            text,
            provider: "scripted".to_string(),
            model: "scripted".to_string(),
            meta: serde_json::Value::Null,
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
