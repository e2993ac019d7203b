//! Mock provider implementation for testing.

use super::{ChatProvider, ChatRequest, Completion, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted reply for the mock provider.
#[derive(Debug, Clone)]
pub enum MockReply {
    Completion(Completion),
    Failure(String),
}

/// Mock chat provider that always answers with the same scripted reply and
/// records every request it receives.
pub struct MockChatProvider {
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockChatProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(MockReply::Completion(Completion::Text(text.to_string())))
    }

    pub fn structured(name: &str, arguments: &str) -> Self {
        Self::new(MockReply::Completion(Completion::Structured {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(MockReply::Failure(message.to_string()))
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.reply {
            MockReply::Completion(completion) => Ok(completion.clone()),
            MockReply::Failure(message) => Err(ProviderError::NetworkError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
