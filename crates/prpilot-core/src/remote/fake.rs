use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::RemoteService;
use crate::error::RemoteError;
use crate::kind::TargetSystemKind;
use crate::model::{GenerationInput, GenerationResult};

/// Remote service with canned outcomes.
///
/// Queued generate outcomes are popped in order; the last one repeats.
pub struct FakeRemoteService {
    reachable: bool,
    outcomes: Mutex<Vec<Result<GenerationResult, RemoteError>>>,
    delay: Option<Duration>,
    hello_calls: Mutex<usize>,
    generate_calls: Mutex<usize>,
}

impl FakeRemoteService {
    pub fn new(reachable: bool, outcomes: Vec<Result<GenerationResult, RemoteError>>) -> Self {
        Self {
            reachable,
            outcomes: Mutex::new(outcomes),
            delay: None,
            hello_calls: Mutex::new(0),
            generate_calls: Mutex::new(0),
        }
    }

    pub fn always_ok(result: GenerationResult) -> Self {
        Self::new(true, vec![Ok(result)])
    }

    pub fn always_error(error: RemoteError) -> Self {
        Self::new(true, vec![Err(error)])
    }

    pub fn unreachable() -> Self {
        Self::new(
            false,
            vec![Err(RemoteError::Unavailable("connection refused".to_string()))],
        )
    }

    /// Sleep this long before answering a generate call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn hello_calls(&self) -> usize {
        self.hello_calls.lock().map(|n| *n).unwrap_or(0)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.lock().map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl RemoteService for FakeRemoteService {
    async fn hello(&self) -> Result<(), RemoteError> {
        if let Ok(mut n) = self.hello_calls.lock() {
            *n += 1;
        }
        if self.reachable {
            Ok(())
        } else {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }
    }

    async fn generate(
        &self,
        _kind: TargetSystemKind,
        _input: &GenerationInput,
    ) -> Result<GenerationResult, RemoteError> {
        if let Ok(mut n) = self.generate_calls.lock() {
            *n += 1;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut outcomes = match self.outcomes.lock() {
            Ok(outcomes) => outcomes,
            Err(_) => return Err(RemoteError::Unavailable("fake poisoned".to_string())),
        };
        match outcomes.len() {
            0 => Err(RemoteError::Malformed("no canned outcome".to_string())),
            1 => outcomes[0].clone(),
            _ => outcomes.remove(0),
        }
    }
}
