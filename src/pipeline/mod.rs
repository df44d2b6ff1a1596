mod request;
mod run;

pub use request::{RequestScope, ARTIFACT_NAME};
pub use run::{validate_upload_name, Artifact, Pipeline};
