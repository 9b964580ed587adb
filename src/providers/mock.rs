/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::echo()` - Returns the requested blocks untranslated
 * - `MockProvider::scripted(..)` - Replays canned responses in order
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Always returns an empty response
 *
 * Every mock counts its calls, which lets tests verify retry budgets.
 */

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::{GenerationOptions, Provider};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text
    Text(String),
    /// Fail with this message
    Error(String),
}

/// Behavior mode for the mock provider
#[derive(Debug)]
enum MockBehavior {
    /// Re-emit the request's block sections untouched (identity translation)
    Echo,
    /// Replay canned replies in order; fails once the script is exhausted
    Scripted(StdMutex<VecDeque<MockReply>>),
    /// Always fail with an error
    Failing,
    /// Always return an empty response
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of generate calls made so far
    call_count: AtomicUsize,
}

impl MockProvider {
    /// Create a mock that echoes the blocks it is asked to translate.
    ///
    /// The echo preserves line counts, tags and labels exactly, so every
    /// outcome validates. Useful for scheduler and workflow tests where the
    /// interesting part is ordering, not text.
    pub fn echo() -> Self {
        Self {
            behavior: MockBehavior::Echo,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that replays the given responses in order
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = responses.into_iter().map(|r| MockReply::Text(r.into())).collect();
        Self {
            behavior: MockBehavior::Scripted(StdMutex::new(replies)),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that replays a mixed script of texts and errors
    pub fn scripted_replies(replies: Vec<MockReply>) -> Self {
        Self {
            behavior: MockBehavior::Scripted(StdMutex::new(replies.into())),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior::Failing,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self {
            behavior: MockBehavior::Empty,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made against this mock
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Extract the block sections of a user prompt and re-emit them verbatim.
    fn echo_response(user: &str) -> String {
        // Everything after the "Translate these blocks:" marker is the block
        // list; retry prompts carry no marker and are echoed from the
        // "Original text:" section instead.
        if let Some(pos) = user.find("Translate these blocks:") {
            let body = &user[pos + "Translate these blocks:".len()..];
            let sections: Vec<&str> = body
                .split("---")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            return sections.join("\n---\n");
        }

        if let Some(pos) = user.find("Original text:\n") {
            let body = &user[pos + "Original text:\n".len()..];
            let original = body
                .split("\n\nYour previous translation:")
                .next()
                .unwrap_or(body);
            return original.trim().to_string();
        }

        user.to_string()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        _system: &str,
        user: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Echo => Ok(Self::echo_response(user)),
            MockBehavior::Scripted(replies) => {
                let reply = replies.lock().unwrap().pop_front();
                match reply {
                    Some(MockReply::Text(text)) => Ok(text),
                    Some(MockReply::Error(message)) => Err(ProviderError::RequestFailed(message)),
                    None => Err(ProviderError::RequestFailed(
                        "mock script exhausted".to_string(),
                    )),
                }
            }
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock provider always fails".to_string(),
            )),
            MockBehavior::Empty => Ok(String::new()),
        }
    }

    async fn test_connection(&self, _options: &GenerationOptions) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "mock provider always fails".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
