//! Chooses between remote generation and the local templates.
//!
//! The remote attempt and the decision about it are kept apart: [`attempt`]
//! performs at most one bounded remote call, [`decide`] maps its outcome to a
//! [`Decision`], and [`Dispatcher::generate`] carries the decision out.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{GenerationFailure, RemoteError};
use crate::kind::TargetSystemKind;
use crate::model::{GenerationInput, GenerationResult};
use crate::remote::RemoteService;
use crate::templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerateOptions {
    pub prefer_remote: bool,
}

/// Which path produced a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    Remote,
    Local,
    /// The remote path failed and the local templates stood in.
    Fallback { reason: RemoteError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub result: GenerationResult,
    pub source: GenerationSource,
}

impl Generation {
    pub fn fell_back(&self) -> Option<&RemoteError> {
        match &self.source {
            GenerationSource::Fallback { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Outcome of the remote step. `Skipped` when remote was not preferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAttempt {
    Skipped,
    Succeeded(GenerationResult),
    Failed(RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    UseRemote(GenerationResult),
    GenerateLocally { reason: Option<RemoteError> },
}

pub fn decide(attempt: RemoteAttempt) -> Decision {
    match attempt {
        RemoteAttempt::Succeeded(result) => Decision::UseRemote(result),
        RemoteAttempt::Skipped => Decision::GenerateLocally { reason: None },
        RemoteAttempt::Failed(reason) => Decision::GenerateLocally {
            reason: Some(reason),
        },
    }
}

/// One remote call, bounded by `timeout`.
pub async fn attempt(
    service: &dyn RemoteService,
    kind: TargetSystemKind,
    input: &GenerationInput,
    timeout: Duration,
) -> RemoteAttempt {
    match tokio::time::timeout(timeout, service.generate(kind, input)).await {
        Ok(Ok(result)) => RemoteAttempt::Succeeded(result),
        Ok(Err(e)) => RemoteAttempt::Failed(e),
        Err(_) => RemoteAttempt::Failed(RemoteError::Timeout(timeout)),
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    remote: Arc<dyn RemoteService>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(remote: Arc<dyn RemoteService>, timeout: Duration) -> Self {
        Self { remote, timeout }
    }

    /// Produce exactly one result for `input`, or fail if `kind` does not
    /// match the input's variant. Remote failures never surface as errors.
    pub async fn generate(
        &self,
        kind: TargetSystemKind,
        input: &GenerationInput,
        options: GenerateOptions,
    ) -> Result<Generation, GenerationFailure> {
        if input.kind() != kind {
            return Err(GenerationFailure::KindMismatch {
                requested: kind,
                input: input.kind(),
            });
        }

        let remote_attempt = if options.prefer_remote {
            attempt(self.remote.as_ref(), kind, input, self.timeout).await
        } else {
            RemoteAttempt::Skipped
        };

        let generation = match decide(remote_attempt) {
            Decision::UseRemote(result) => {
                if serde_yaml::from_str::<serde_yaml::Value>(&result.content).is_err() {
                    tracing::warn!(%kind, "remote generation returned content that is not valid YAML");
                }
                Generation {
                    result,
                    source: GenerationSource::Remote,
                }
            }
            Decision::GenerateLocally { reason: None } => Generation {
                result: templates::generate(input),
                source: GenerationSource::Local,
            },
            Decision::GenerateLocally {
                reason: Some(reason),
            } => {
                tracing::warn!(%kind, error = %reason, "remote generation failed, using local templates");
                Generation {
                    result: templates::generate(input),
                    source: GenerationSource::Fallback { reason },
                }
            }
        };

        tracing::info!(%kind, title = %generation.result.title, "generated PR");
        Ok(generation)
    }
}
