use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConvertError;

/// The deployment platform an [`Application`] or [`Service`] was read from, or
/// is being written for.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
  #[default]
  DockerCompose,
  Kubernetes,
  Nomad,
  Helm,
}

impl Platform {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::DockerCompose => "docker-compose",
      Self::Kubernetes => "kubernetes",
      Self::Nomad => "nomad",
      Self::Helm => "helm",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Platform {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "docker-compose" | "compose" => Ok(Self::DockerCompose),
      "kubernetes" | "k8s" => Ok(Self::Kubernetes),
      "nomad" => Ok(Self::Nomad),
      "helm" => Ok(Self::Helm),
      other => Err(format!("unknown platform `{other}`")),
    }
  }
}

pub(crate) fn is_false(value: &bool) -> bool {
  !*value
}

pub(crate) fn is_zero(value: &i64) -> bool {
  *value == 0
}

/// A complete application: the platform-neutral aggregate that every adapter
/// parses into and serializes from.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Application {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub version: String,

  pub services: IndexMap<String, Service>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub networks: IndexMap<String, Network>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub volumes: IndexMap<String, Volume>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub configs: IndexMap<String, Config>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub secrets: IndexMap<String, Secret>,

  /// Paths of other application files referenced by this one, in order.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub includes: Vec<String>,

  /// Top-level fields with no canonical equivalent, preserved verbatim.
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub extensions: IndexMap<String, Value>,

  /// The platform this application was parsed from or converted to.
  pub platform: Platform,
}

impl Application {
  pub fn new(platform: Platform) -> Self {
    Self {
      platform,
      ..Default::default()
    }
  }

  /// Checks that the application has at least one service and that every
  /// service declares an image.
  ///
  /// As a side effect, a service whose `name` field was left blank gets it
  /// back-filled from its key in the services map. This is the only mutation
  /// validation performs.
  pub fn validate(&mut self) -> Result<(), ConvertError> {
    if self.services.is_empty() {
      return Err(ConvertError::NoServices);
    }

    for (name, service) in &mut self.services {
      if service.name.is_empty() {
        service.name = name.clone();
      }
      if service.image.is_empty() {
        return Err(ConvertError::MissingImage(name.clone()));
      }
    }

    Ok(())
  }

  /// Inserts a service under its own name, replacing any previous entry.
  pub fn add_service(&mut self, service: Service) {
    self.services.insert(service.name.clone(), service);
  }

  /// Removes a service by name, returning it if it existed.
  pub fn remove_service(&mut self, name: &str) -> Option<Service> {
    self.services.shift_remove(name)
  }

  pub fn service(&self, name: &str) -> Option<&Service> {
    self.services.get(name)
  }

  pub fn service_names(&self) -> Vec<&str> {
    self.services.keys().map(String::as_str).collect()
  }
}

impl fmt::Display for Application {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Application ({}):", self.platform)?;
    writeln!(f, "  Services: {}", self.services.len())?;
    writeln!(f, "  Networks: {}", self.networks.len())?;
    writeln!(f, "  Volumes: {}", self.volumes.len())?;
    writeln!(f, "  Configs: {}", self.configs.len())?;
    writeln!(f, "  Secrets: {}", self.secrets.len())
  }
}

/// One deployable unit of an [`Application`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Service {
  pub name: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub image: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub container_name: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub hostname: String,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub ports: Vec<PortMapping>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub networks: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub expose: Vec<String>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub environment: IndexMap<String, String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub env_file: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub command: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub entrypoint: Vec<String>,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub working_dir: String,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub volumes: Vec<VolumeMount>,

  /// Startup-ordering hint. Not a scheduling guarantee.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub links: Vec<String>,

  /// Restart policy, in the vocabulary of [`Service::platform`]. The
  /// conversion engine remaps this field when the platform changes.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub restart: String,

  #[serde(default, skip_serializing_if = "is_false")]
  pub privileged: bool,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub user: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub group: String,

  #[serde(default, skip_serializing_if = "is_zero")]
  pub cpu_shares: i64,

  #[serde(default, skip_serializing_if = "is_zero")]
  pub cpu_quota: i64,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub memory_limit: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub memory_swap: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub healthcheck: Option<HealthCheck>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub labels: IndexMap<String, String>,

  /// Platform-specific fields with no canonical equivalent, preserved
  /// verbatim and never inspected by the conversion engine.
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub extensions: IndexMap<String, Value>,

  pub platform: Platform,
}

impl Service {
  pub fn new(name: impl Into<String>, image: impl Into<String>, platform: Platform) -> Self {
    Self {
      name: name.into(),
      image: image.into(),
      platform,
      ..Default::default()
    }
  }
}

/// A port published from a container, with optional host-side binding.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortMapping {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub host_ip: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub host_port: String,

  pub container_port: String,

  /// `tcp` or `udp`. Defaults to `tcp`.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub protocol: String,
}

/// How a [`VolumeMount`] source is interpreted.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
  Bind,
  #[default]
  Volume,
  Tmpfs,
}

/// A bind path or named volume mounted into a service container.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeMount {
  pub source: String,
  pub target: String,

  #[serde(default)]
  pub kind: MountKind,

  #[serde(default, skip_serializing_if = "is_false")]
  pub read_only: bool,

  /// Opaque mount mode passthrough (SELinux relabeling, propagation).
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub mode: String,
}

/// A container liveness probe.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthCheck {
  pub test: Vec<String>,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub interval: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub timeout: String,

  #[serde(default, skip_serializing_if = "is_zero")]
  pub retries: i64,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub start_period: String,
}

/// A named network services can attach to.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Network {
  pub name: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub driver: String,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub driver_opts: IndexMap<String, String>,

  #[serde(default, skip_serializing_if = "is_false")]
  pub attachable: bool,

  #[serde(default, skip_serializing_if = "is_false")]
  pub external: bool,

  #[serde(default, skip_serializing_if = "is_false")]
  pub internal: bool,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ipam: Option<Ipam>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub labels: IndexMap<String, String>,
}

/// IP address management settings nested under a [`Network`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Ipam {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub driver: String,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub config: Vec<IpamSubnet>,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub options: IndexMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpamSubnet {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub subnet: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub gateway: String,
}

/// A named volume definition.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Volume {
  pub name: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub driver: String,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub driver_opts: IndexMap<String, String>,

  #[serde(default, skip_serializing_if = "is_false")]
  pub external: bool,

  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub labels: IndexMap<String, String>,
}

/// A named configuration blob.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
  pub name: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub content: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub file: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub template: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub mode: String,
}

/// A named secret. Values are never stored in the canonical model, only
/// references to where they live.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret {
  pub name: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub file: String,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub environment: String,

  #[serde(default, skip_serializing_if = "is_false")]
  pub external: bool,
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn validate_rejects_empty_application() {
    let mut app = Application::new(Platform::DockerCompose);

    assert!(matches!(app.validate(), Err(ConvertError::NoServices)));
  }

  #[test]
  fn validate_rejects_service_without_image() {
    let mut app = Application::new(Platform::DockerCompose);
    app.services.insert(
      "web".to_string(),
      Service::new("web", "", Platform::DockerCompose),
    );

    match app.validate() {
      Err(ConvertError::MissingImage(name)) => assert_eq!(name, "web"),
      other => panic!("expected MissingImage, got {other:?}"),
    }
  }

  #[test]
  fn validate_backfills_service_name_from_key() {
    let mut app = Application::new(Platform::DockerCompose);
    app.services.insert(
      "web".to_string(),
      Service::new("", "nginx:latest", Platform::DockerCompose),
    );

    app.validate().unwrap();

    assert_eq!(app.services["web"].name, "web");
  }

  #[test]
  fn add_and_remove_service() {
    let mut app = Application::new(Platform::DockerCompose);
    app.add_service(Service::new("db", "postgres:16", Platform::DockerCompose));

    assert_eq!(app.service_names(), vec!["db"]);
    assert!(app.service("db").is_some());

    let removed = app.remove_service("db").unwrap();
    assert_eq!(removed.image, "postgres:16");
    assert!(app.services.is_empty());
  }
}
