//! The facade tying the adapters and engines together: platform detection
//! from file paths, load/save dispatch, conversion, merging and validation.

use std::{
  ffi::OsStr,
  fs::{read_to_string, write},
  path::Path,
};

use crate::{
  compose, convert, helm, kubernetes, merge,
  model::{Application, Platform},
  nomad, ConvertError,
};

/// Facade configuration.
#[derive(Clone, Copy, Debug)]
pub struct ConverterConfig {
  /// Platform assumed for files whose path gives no hint.
  pub default_platform: Platform,

  /// When false, extension bags are stripped from conversion results.
  pub preserve_extensions: bool,
}

impl Default for ConverterConfig {
  fn default() -> Self {
    Self {
      default_platform: Platform::DockerCompose,
      preserve_extensions: true,
    }
  }
}

/// One cohesive entry point over the format adapters and the conversion and
/// merge engines.
#[derive(Clone, Debug, Default)]
pub struct Converter {
  config: ConverterConfig,
}

impl Converter {
  pub fn new(config: ConverterConfig) -> Self {
    Self { config }
  }

  /// Resolves a platform from a path: a directory holding a `Chart.yaml` is
  /// a chart; otherwise the extension decides, with `.yml`/`.yaml` split
  /// between Kubernetes and Docker Compose by a `k8s`/`kubernetes` hint in
  /// the path itself.
  pub fn detect_platform(&self, path: &Path) -> Platform {
    if path.is_dir() && path.join("Chart.yaml").is_file() {
      return Platform::Helm;
    }

    let extension = path
      .extension()
      .and_then(OsStr::to_str)
      .map(str::to_lowercase);

    match extension.as_deref() {
      Some("yml" | "yaml") => {
        let hint = path.to_string_lossy().to_lowercase();
        if hint.contains("k8s") || hint.contains("kubernetes") {
          Platform::Kubernetes
        } else {
          Platform::DockerCompose
        }
      }
      Some("hcl" | "nomad") => Platform::Nomad,
      _ => self.config.default_platform,
    }
  }

  /// Loads an application from a file or chart directory.
  pub fn load_file(&self, path: &Path) -> Result<Application, ConvertError> {
    if path.is_dir() && path.join("Chart.yaml").is_file() {
      return helm::parse_chart(path);
    }

    let content = read_to_string(path).map_err(|e| ConvertError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    self.load_content(&content, self.detect_platform(path))
  }

  /// Parses content in the given platform's format. Charts live in
  /// directories and cannot be parsed from a string.
  pub fn load_content(
    &self,
    content: &str,
    platform: Platform,
  ) -> Result<Application, ConvertError> {
    match platform {
      Platform::DockerCompose => compose::parse(content),
      Platform::Kubernetes => kubernetes::parse(content),
      Platform::Nomad => nomad::parse(content),
      Platform::Helm => Err(ConvertError::DirectoryPlatform(Platform::Helm)),
    }
  }

  /// Serializes an application to the destination resolved from the path
  /// and writes it there. An existing chart directory is refreshed in
  /// place; use [`Converter::save_chart`] to create a new one.
  pub fn save_file(&self, app: &Application, path: &Path) -> Result<(), ConvertError> {
    let platform = self.detect_platform(path);

    if platform == Platform::Helm {
      return helm::write_chart(app, path);
    }

    let content = self.save_content(app, platform)?;

    write(path, content).map_err(|e| ConvertError::WriteError {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// Serializes an application to the given platform's text format.
  pub fn save_content(
    &self,
    app: &Application,
    platform: Platform,
  ) -> Result<String, ConvertError> {
    match platform {
      Platform::DockerCompose => compose::serialize(app),
      Platform::Kubernetes => kubernetes::serialize(app),
      Platform::Nomad => nomad::serialize(app),
      Platform::Helm => Err(ConvertError::DirectoryPlatform(Platform::Helm)),
    }
  }

  /// Writes an application out as a chart directory.
  pub fn save_chart(&self, app: &Application, chart_dir: &Path) -> Result<(), ConvertError> {
    helm::write_chart(app, chart_dir)
  }

  /// Converts an application between platform dialects, honoring the
  /// `preserve_extensions` setting.
  pub fn convert(&self, app: Application, from: Platform, to: Platform) -> Application {
    let mut converted = convert::convert(app, from, to);

    if !self.config.preserve_extensions && from != to {
      converted.extensions.clear();
      for service in converted.services.values_mut() {
        service.extensions.clear();
      }
    }

    converted
  }

  pub fn validate(&self, app: &mut Application) -> Result<(), ConvertError> {
    app.validate()
  }

  pub fn merge(&self, apps: Vec<Application>) -> Result<Application, ConvertError> {
    merge::merge(apps)
  }

  /// Converts the application to each of the given platforms and back,
  /// validating the result after every leg and checking that no service
  /// went missing.
  pub fn round_trip(
    &self,
    app: &Application,
    platforms: &[Platform],
  ) -> Result<(), ConvertError> {
    let original = app.platform;

    for &target in platforms {
      let there = self.convert(app.clone(), original, target);
      let mut back = self.convert(there, target, original);

      back.validate()?;

      if back.services.len() != app.services.len() {
        return Err(ConvertError::RoundTripMismatch(target));
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::model::Service;

  #[test]
  fn detects_platform_from_paths() {
    let converter = Converter::default();

    assert_eq!(
      converter.detect_platform(Path::new("docker-compose.yml")),
      Platform::DockerCompose
    );
    assert_eq!(
      converter.detect_platform(Path::new("deploy/k8s-manifests.yaml")),
      Platform::Kubernetes
    );
    assert_eq!(
      converter.detect_platform(Path::new("jobs/web.nomad")),
      Platform::Nomad
    );
    assert_eq!(
      converter.detect_platform(Path::new("jobs/web.hcl")),
      Platform::Nomad
    );
    // No hint: the configured default wins
    assert_eq!(
      converter.detect_platform(Path::new("Procfile")),
      Platform::DockerCompose
    );
  }

  #[test]
  fn helm_content_loading_is_rejected() {
    let converter = Converter::default();

    assert!(matches!(
      converter.load_content("services: {}", Platform::Helm),
      Err(ConvertError::DirectoryPlatform(Platform::Helm))
    ));
  }

  #[test]
  fn stripping_extensions_on_conversion() {
    let converter = Converter::new(ConverterConfig {
      preserve_extensions: false,
      ..Default::default()
    });

    let mut app = Application::new(Platform::DockerCompose);
    let mut service = Service::new("web", "nginx:latest", Platform::DockerCompose);
    service
      .extensions
      .insert("x-rollout".to_string(), serde_json::json!("canary"));
    app.add_service(service);

    let converted = converter.convert(app, Platform::DockerCompose, Platform::Kubernetes);

    assert!(converted.services["web"].extensions.is_empty());
  }

  #[test]
  fn round_trip_over_all_text_platforms() {
    let converter = Converter::default();

    let mut app = Application::new(Platform::DockerCompose);
    let mut web = Service::new("web", "nginx:latest", Platform::DockerCompose);
    web.restart = "always".to_string();
    app.add_service(web);

    converter
      .round_trip(&app, &[Platform::Kubernetes, Platform::Nomad])
      .unwrap();
  }
}
