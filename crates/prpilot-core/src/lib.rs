pub mod config;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod kind;
pub mod model;
pub mod orchestrator;
pub mod prober;
pub mod remote;
pub mod state;
pub mod templates;
pub mod validate;

// Re-export main types for convenience
pub use config::Config;
pub use dispatcher::{Dispatcher, GenerateOptions, Generation, GenerationSource};
pub use error::{GenerationFailure, RemoteError, ValidationError};
pub use kind::TargetSystemKind;
pub use model::{
    Environment, GenerationInput, GenerationResult, HttpMethod, RawGatewayRoute, RawInput,
    RawPolicyRoute, RawTopic,
};
pub use orchestrator::{Orchestrator, PendingGeneration, PendingReply};
pub use prober::Prober;
pub use remote::{FakeRemoteService, HttpRemoteService, RemoteService};
pub use state::{ChatRole, ConversationMessage, Reachability, SessionState};
pub use validate::validate;
