use std::{io, path::PathBuf};

use thiserror::Error;

use crate::Platform;

/// The kinds of errors that can occur during parsing, conversion and merging.
#[derive(Debug, Error)]
pub enum ConvertError {
  // I/O errors
  #[error("Could not read the contents of `{path}`: {source}")]
  ReadError { path: PathBuf, source: io::Error },

  #[error("Failed to create or write to the file `{path}`: {source}")]
  WriteError { path: PathBuf, source: io::Error },

  #[error("Could not create the dir `{path}`: {source}")]
  DirCreation { path: PathBuf, source: io::Error },

  // Parse errors
  #[error("Failed to parse {platform} content: {error}")]
  InvalidDocument { platform: Platform, error: String },

  #[error("Invalid port mapping `{0}`")]
  InvalidPortMapping(String),

  #[error("Invalid volume specification `{0}`")]
  InvalidVolumeSpec(String),

  #[error("{kind} resource is missing a name")]
  MissingResourceName { kind: String },

  #[error("Deployment `{0}` has no containers")]
  EmptyDeployment(String),

  #[error("Error while serializing {platform} content: {error}")]
  SerializationError { platform: Platform, error: String },

  // Validation errors
  #[error("An application must have at least one service")]
  NoServices,

  #[error("Service `{0}` must have an image")]
  MissingImage(String),

  // Merge errors
  #[error("Service `{0}` is defined in more than one application")]
  MergeConflict(String),

  #[error("No applications to merge")]
  NothingToMerge,

  #[error("Round trip through {0} changed the service count")]
  RoundTripMismatch(Platform),

  // Dispatch errors
  #[error("{0} applications must be loaded from a directory, not a content string")]
  DirectoryPlatform(Platform),

  #[error("`{path}` is not a chart directory (no Chart.yaml found)")]
  NotAChartDir { path: PathBuf },
}
