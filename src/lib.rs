//! A conversion core for containerized application definitions.
//!
//! Applications are parsed from a platform's native format into a canonical
//! [`Application`] model, manipulated there, and serialized back out to the
//! same or another platform. Four formats are supported: Docker Compose
//! files, Kubernetes manifests, Nomad-style job specs and Helm-style chart
//! directories.
//!
//! The [`Converter`] facade bundles platform detection with loading, saving,
//! conversion and merging:
//!
//! ```no_run
//! use std::path::Path;
//!
//! use replatform::{Converter, Platform};
//!
//! # fn main() -> Result<(), replatform::ConvertError> {
//! let converter = Converter::default();
//!
//! let app = converter.load_file(Path::new("docker-compose.yml"))?;
//! let app = converter.convert(app, Platform::DockerCompose, Platform::Kubernetes);
//!
//! converter.save_file(&app, Path::new("k8s-manifests.yaml"))?;
//! # Ok(())
//! # }
//! ```
//!
//! The adapters are also usable directly ([`compose`], [`kubernetes`],
//! [`nomad`], [`helm`]) when the dispatching layer is not wanted.

pub mod compose;
pub mod convert;
mod converter;
mod errors;
pub mod helm;
pub mod kubernetes;
pub mod merge;
pub mod model;
pub mod nomad;
mod serde_utils;

pub use converter::{Converter, ConverterConfig};
pub use errors::ConvertError;
pub use model::{
  Application, Config, HealthCheck, MountKind, Network, Platform, PortMapping, Secret, Service,
  Volume, VolumeMount,
};
