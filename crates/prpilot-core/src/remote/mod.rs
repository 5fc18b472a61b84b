//! The remote generation service seam.
//!
//! [`RemoteService`] is what the dispatcher and the prober talk to.
//! [`HttpRemoteService`] is the real HTTP client; [`FakeRemoteService`]
//! returns canned outcomes and counts calls, for tests.

pub mod fake;
pub mod http;

pub use fake::FakeRemoteService;
pub use http::HttpRemoteService;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::kind::TargetSystemKind;
use crate::model::{GenerationInput, GenerationResult};

#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Inexpensive reachability call.
    async fn hello(&self) -> Result<(), RemoteError>;

    /// Generate a configuration change remotely.
    async fn generate(
        &self,
        kind: TargetSystemKind,
        input: &GenerationInput,
    ) -> Result<GenerationResult, RemoteError>;
}
