//! Read-endpoint artifacts generated for provisioned kinds.
//!
//! Generation is pure ([`generate`]); writing goes through an
//! [`ArtifactSink`].

mod sink;
mod template;

pub use sink::{ArtifactSink, FsArtifactSink, MemoryArtifactSink};
pub use template::{generate, route_for, Artifact, ENDPOINT_ROW_LIMIT};
