pub mod artifact;

pub use artifact::{forge_id, MavenArtifact, FORGE_MAVEN};
