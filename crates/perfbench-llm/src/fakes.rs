//! In-memory generators (testing only).
//!
//! Provides `ScriptedGenerator` (replays a queue of replies and failures) and
//! `FnGenerator` (computes a reply from the prompt) so runners can be driven
//! without network access.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::{Result, TextGenerator};

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Step {
    Reply(String),
    Fail(String),
}

/// Generator that answers from a fixed script, in order.
///
/// Once the script is exhausted every call fails with
/// `LlmError::Scripted("script exhausted")`.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    steps: Mutex<VecDeque<Step>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script that returns each reply once, in order.
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::new();
        for reply in replies {
            generator.push_reply(reply);
        }
        generator
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.steps.lock().unwrap().push_back(Step::Reply(reply.into()));
    }

    /// Queue a failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.steps.lock().unwrap().push_back(Step::Fail(message.into()));
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(message)) => Err(LlmError::Scripted(message)),
            None => Err(LlmError::Scripted("script exhausted".to_string())),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// FnGenerator
// ---------------------------------------------------------------------------

/// Generator whose reply is a pure function of the prompt.
pub struct FnGenerator<F> {
    reply: F,
}

impl<F> FnGenerator<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    pub fn new(reply: F) -> Self {
        Self { reply }
    }
}

#[async_trait]
impl<F> TextGenerator for FnGenerator<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        (self.reply)(prompt)
    }

    fn model(&self) -> &str {
        "fn"
    }
}
