//! Idempotent provisioning of entity kinds: ensure the table exists, seed it
//! when empty, read a sample back.

mod engine;
mod error;

pub use engine::{ProvisionReport, ProvisioningEngine, DEFAULT_VERIFY_SAMPLE_SIZE};
pub use error::ProvisioningError;
