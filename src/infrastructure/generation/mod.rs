//! Generation backend implementations

mod factory;
mod live;
mod mock;

pub use factory::{GenerationBackendFactory, GenerationBackendType, GenerationConfig};
pub use live::LiveGenerationBackend;
pub use mock::MockGenerationBackend;
