//! Local template generators, one per target system.
//!
//! Each generator is a pure function of its input: no clock, no randomness,
//! no external state.

pub mod doc;
pub mod gatekeeper;
pub mod kafka;
pub mod kong;

use crate::model::{GenerationInput, GenerationResult};

pub fn generate(input: &GenerationInput) -> GenerationResult {
    match input {
        GenerationInput::Topic(topic) => kafka::generate(topic),
        GenerationInput::GatewayRoute(route) => kong::generate(route),
        GenerationInput::PolicyRoute(route) => gatekeeper::generate(route),
    }
}
