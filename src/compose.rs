//! Docker Compose adapter.
//!
//! Parses Compose YAML into the canonical [`Application`] and back. Unknown
//! top-level and per-service keys are preserved verbatim in the respective
//! extension bags.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  model::{
    Application, Config, HealthCheck, Ipam, IpamSubnet, MountKind, Network, Platform, PortMapping,
    Secret, Service, Volume, VolumeMount,
  },
  serde_utils::{ListOrMap, SingleValue, StringOrList, StringOrNum},
  ConvertError,
};

/// Environment lookup used while expanding `${VAR}` placeholders in port
/// strings. Supplied by the caller so parsing stays deterministic in tests.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parses Docker Compose YAML, expanding `${VAR}` placeholders from the
/// process environment.
pub fn parse(content: &str) -> Result<Application, ConvertError> {
  parse_with_env(content, &|name| std::env::var(name).ok())
}

/// Parses Docker Compose YAML with an explicit environment lookup.
pub fn parse_with_env(content: &str, env: EnvLookup) -> Result<Application, ConvertError> {
  let file: ComposeFile =
    serde_yaml_ng::from_str(content).map_err(|e| ConvertError::InvalidDocument {
      platform: Platform::DockerCompose,
      error: e.to_string(),
    })?;

  let mut app = Application::new(Platform::DockerCompose);

  if let Some(version) = file.version {
    app.version = version;
  }

  if let Some(includes) = file.include {
    app.includes = includes
      .into_iter()
      .filter_map(|entry| entry.as_str().map(str::to_string))
      .collect();
  }

  for (name, spec) in file.services.unwrap_or_default() {
    let service = service_from_compose(&name, spec.unwrap_or_default(), env)?;
    app.services.insert(name, service);
  }

  for (name, spec) in file.networks.unwrap_or_default() {
    let network = network_from_compose(&name, spec.unwrap_or_default());
    app.networks.insert(name, network);
  }

  for (name, spec) in file.volumes.unwrap_or_default() {
    let volume = volume_from_compose(&name, spec.unwrap_or_default());
    app.volumes.insert(name, volume);
  }

  for (name, spec) in file.configs.unwrap_or_default() {
    let config = config_from_compose(&name, spec.unwrap_or_default());
    app.configs.insert(name, config);
  }

  for (name, spec) in file.secrets.unwrap_or_default() {
    let secret = secret_from_compose(&name, spec.unwrap_or_default());
    app.secrets.insert(name, secret);
  }

  app.extensions = file.extensions;

  Ok(app)
}

/// Serializes an [`Application`] to Docker Compose YAML, re-merging both
/// extension bags and omitting empty fields.
pub fn serialize(app: &Application) -> Result<String, ConvertError> {
  let mut file = ComposeFile::default();

  if !app.version.is_empty() {
    file.version = Some(app.version.clone());
  }

  if !app.includes.is_empty() {
    file.include = Some(
      app
        .includes
        .iter()
        .map(|path| Value::String(path.clone()))
        .collect(),
    );
  }

  if !app.services.is_empty() {
    let services = app
      .services
      .iter()
      .map(|(name, service)| (name.clone(), Some(compose_from_service(service))))
      .collect();
    file.services = Some(services);
  }

  if !app.networks.is_empty() {
    let networks = app
      .networks
      .values()
      .map(|network| (network.name.clone(), Some(compose_from_network(network))))
      .collect();
    file.networks = Some(networks);
  }

  if !app.volumes.is_empty() {
    let volumes = app
      .volumes
      .values()
      .map(|volume| (volume.name.clone(), Some(compose_from_volume(volume))))
      .collect();
    file.volumes = Some(volumes);
  }

  if !app.configs.is_empty() {
    let configs = app
      .configs
      .values()
      .map(|config| (config.name.clone(), Some(compose_from_config(config))))
      .collect();
    file.configs = Some(configs);
  }

  if !app.secrets.is_empty() {
    let secrets = app
      .secrets
      .values()
      .map(|secret| (secret.name.clone(), Some(compose_from_secret(secret))))
      .collect();
    file.secrets = Some(secrets);
  }

  file.extensions = app.extensions.clone();

  serde_yaml_ng::to_string(&file).map_err(|e| ConvertError::SerializationError {
    platform: Platform::DockerCompose,
    error: e.to_string(),
  })
}

/// The top-level shape of a Compose file. Values under the resource maps may
/// be null (`volumes:\n  data:` declares an empty named volume).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeFile {
  #[serde(skip_serializing_if = "Option::is_none")]
  version: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  include: Option<Vec<Value>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  services: Option<IndexMap<String, Option<ComposeService>>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  networks: Option<IndexMap<String, Option<ComposeNetwork>>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  volumes: Option<IndexMap<String, Option<ComposeVolume>>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  configs: Option<IndexMap<String, Option<ComposeConfig>>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  secrets: Option<IndexMap<String, Option<ComposeSecret>>>,

  #[serde(flatten, default, skip_serializing_if = "IndexMap::is_empty")]
  extensions: IndexMap<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeService {
  #[serde(skip_serializing_if = "Option::is_none")]
  image: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  container_name: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  hostname: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  ports: Option<Vec<StringOrNum>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  expose: Option<Vec<StringOrNum>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  networks: Option<Vec<String>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  environment: Option<ListOrMap>,

  #[serde(skip_serializing_if = "Option::is_none")]
  env_file: Option<StringOrList>,

  #[serde(skip_serializing_if = "Option::is_none")]
  command: Option<StringOrList>,

  #[serde(skip_serializing_if = "Option::is_none")]
  entrypoint: Option<StringOrList>,

  #[serde(skip_serializing_if = "Option::is_none")]
  working_dir: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  volumes: Option<Vec<String>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  depends_on: Option<DependsOn>,

  #[serde(skip_serializing_if = "Option::is_none")]
  links: Option<Vec<String>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  restart: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  privileged: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  user: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  group: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  cpu_shares: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  cpu_quota: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  mem_limit: Option<StringOrNum>,

  #[serde(skip_serializing_if = "Option::is_none")]
  memswap_limit: Option<StringOrNum>,

  #[serde(skip_serializing_if = "Option::is_none")]
  healthcheck: Option<ComposeHealthcheck>,

  #[serde(skip_serializing_if = "Option::is_none")]
  labels: Option<ListOrMap>,

  #[serde(flatten, default, skip_serializing_if = "IndexMap::is_empty")]
  extensions: IndexMap<String, Value>,
}

/// `depends_on` in either short (sequence) or long (mapping) form. The long
/// form carries per-dependency conditions, which the canonical model does not
/// represent; only the service names survive.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
enum DependsOn {
  List(Vec<String>),
  Map(IndexMap<String, Value>),
}

impl DependsOn {
  fn into_names(self) -> Vec<String> {
    match self {
      Self::List(names) => names,
      Self::Map(map) => map.into_keys().collect(),
    }
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeHealthcheck {
  #[serde(skip_serializing_if = "Option::is_none")]
  test: Option<StringOrList>,

  #[serde(skip_serializing_if = "Option::is_none")]
  interval: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  timeout: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  retries: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  start_period: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeNetwork {
  #[serde(skip_serializing_if = "Option::is_none")]
  driver: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  driver_opts: Option<IndexMap<String, SingleValue>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  attachable: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  external: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  internal: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  ipam: Option<ComposeIpam>,

  #[serde(skip_serializing_if = "Option::is_none")]
  labels: Option<ListOrMap>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeIpam {
  #[serde(skip_serializing_if = "Option::is_none")]
  driver: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  config: Option<Vec<ComposeIpamSubnet>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  options: Option<IndexMap<String, SingleValue>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeIpamSubnet {
  #[serde(skip_serializing_if = "Option::is_none")]
  subnet: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  gateway: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeVolume {
  #[serde(skip_serializing_if = "Option::is_none")]
  driver: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  driver_opts: Option<IndexMap<String, SingleValue>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  external: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  labels: Option<ListOrMap>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  content: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  file: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  template: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  mode: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ComposeSecret {
  #[serde(skip_serializing_if = "Option::is_none")]
  file: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  environment: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  external: Option<bool>,
}

fn service_from_compose(
  name: &str,
  spec: ComposeService,
  env: EnvLookup,
) -> Result<Service, ConvertError> {
  let mut service = Service {
    name: name.to_string(),
    platform: Platform::DockerCompose,
    ..Default::default()
  };

  service.image = spec.image.unwrap_or_default();
  service.container_name = spec.container_name.unwrap_or_default();
  service.hostname = spec.hostname.unwrap_or_default();
  service.working_dir = spec.working_dir.unwrap_or_default();
  service.restart = spec.restart.unwrap_or_default();
  service.privileged = spec.privileged.unwrap_or_default();
  service.user = spec.user.unwrap_or_default();
  service.group = spec.group.unwrap_or_default();
  service.cpu_shares = spec.cpu_shares.unwrap_or_default();
  service.cpu_quota = spec.cpu_quota.unwrap_or_default();
  service.memory_limit = spec.mem_limit.map(|v| v.to_string()).unwrap_or_default();
  service.memory_swap = spec
    .memswap_limit
    .map(|v| v.to_string())
    .unwrap_or_default();

  for port in spec.ports.unwrap_or_default() {
    service.ports.push(parse_port_mapping(&port.to_string(), env)?);
  }

  service.expose = spec
    .expose
    .unwrap_or_default()
    .into_iter()
    .map(|port| port.to_string())
    .collect();

  service.networks = spec.networks.unwrap_or_default();
  service.environment = spec
    .environment
    .map(ListOrMap::into_string_map)
    .unwrap_or_default();
  service.env_file = spec.env_file.map(StringOrList::into_vec).unwrap_or_default();
  service.command = spec.command.map(StringOrList::into_vec).unwrap_or_default();
  service.entrypoint = spec
    .entrypoint
    .map(StringOrList::into_vec)
    .unwrap_or_default();

  for mount in spec.volumes.unwrap_or_default() {
    service.volumes.push(parse_volume_mount(&mount)?);
  }

  service.depends_on = spec.depends_on.map(DependsOn::into_names).unwrap_or_default();
  service.links = spec.links.unwrap_or_default();
  service.labels = spec.labels.map(ListOrMap::into_string_map).unwrap_or_default();

  if let Some(hc) = spec.healthcheck {
    service.healthcheck = Some(HealthCheck {
      test: hc.test.map(StringOrList::into_vec).unwrap_or_default(),
      interval: hc.interval.unwrap_or_default(),
      timeout: hc.timeout.unwrap_or_default(),
      retries: hc.retries.unwrap_or_default(),
      start_period: hc.start_period.unwrap_or_default(),
    });
  }

  service.extensions = spec.extensions;

  Ok(service)
}

fn compose_from_service(service: &Service) -> ComposeService {
  let mut spec = ComposeService::default();

  if !service.image.is_empty() {
    spec.image = Some(service.image.clone());
  }
  if !service.container_name.is_empty() {
    spec.container_name = Some(service.container_name.clone());
  }
  if !service.hostname.is_empty() {
    spec.hostname = Some(service.hostname.clone());
  }
  if !service.ports.is_empty() {
    spec.ports = Some(
      service
        .ports
        .iter()
        .map(|port| StringOrNum::String(format_port(port)))
        .collect(),
    );
  }
  if !service.expose.is_empty() {
    spec.expose = Some(
      service
        .expose
        .iter()
        .map(|port| StringOrNum::String(port.clone()))
        .collect(),
    );
  }
  if !service.networks.is_empty() {
    spec.networks = Some(service.networks.clone());
  }
  if !service.environment.is_empty() {
    spec.environment = Some(ListOrMap::from(service.environment.clone()));
  }
  if !service.env_file.is_empty() {
    spec.env_file = Some(service.env_file.clone().into());
  }
  if !service.command.is_empty() {
    spec.command = Some(service.command.clone().into());
  }
  if !service.entrypoint.is_empty() {
    spec.entrypoint = Some(service.entrypoint.clone().into());
  }
  if !service.working_dir.is_empty() {
    spec.working_dir = Some(service.working_dir.clone());
  }
  if !service.volumes.is_empty() {
    spec.volumes = Some(service.volumes.iter().map(format_volume).collect());
  }
  if !service.depends_on.is_empty() {
    spec.depends_on = Some(DependsOn::List(service.depends_on.clone()));
  }
  if !service.links.is_empty() {
    spec.links = Some(service.links.clone());
  }
  if !service.restart.is_empty() {
    spec.restart = Some(service.restart.clone());
  }
  if service.privileged {
    spec.privileged = Some(true);
  }
  if !service.user.is_empty() {
    spec.user = Some(service.user.clone());
  }
  if !service.group.is_empty() {
    spec.group = Some(service.group.clone());
  }
  if service.cpu_shares > 0 {
    spec.cpu_shares = Some(service.cpu_shares);
  }
  if service.cpu_quota > 0 {
    spec.cpu_quota = Some(service.cpu_quota);
  }
  if !service.memory_limit.is_empty() {
    spec.mem_limit = Some(StringOrNum::String(service.memory_limit.clone()));
  }
  if !service.memory_swap.is_empty() {
    spec.memswap_limit = Some(StringOrNum::String(service.memory_swap.clone()));
  }
  if let Some(hc) = &service.healthcheck {
    let mut wire = ComposeHealthcheck::default();
    if !hc.test.is_empty() {
      wire.test = Some(hc.test.clone().into());
    }
    if !hc.interval.is_empty() {
      wire.interval = Some(hc.interval.clone());
    }
    if !hc.timeout.is_empty() {
      wire.timeout = Some(hc.timeout.clone());
    }
    if hc.retries > 0 {
      wire.retries = Some(hc.retries);
    }
    if !hc.start_period.is_empty() {
      wire.start_period = Some(hc.start_period.clone());
    }
    spec.healthcheck = Some(wire);
  }
  if !service.labels.is_empty() {
    spec.labels = Some(ListOrMap::from(service.labels.clone()));
  }

  spec.extensions = service.extensions.clone();

  spec
}

fn network_from_compose(name: &str, spec: ComposeNetwork) -> Network {
  Network {
    name: name.to_string(),
    driver: spec.driver.unwrap_or_default(),
    driver_opts: stringify_opts(spec.driver_opts),
    attachable: spec.attachable.unwrap_or_default(),
    external: spec.external.unwrap_or_default(),
    internal: spec.internal.unwrap_or_default(),
    ipam: spec.ipam.map(|ipam| Ipam {
      driver: ipam.driver.unwrap_or_default(),
      config: ipam
        .config
        .unwrap_or_default()
        .into_iter()
        .map(|subnet| IpamSubnet {
          subnet: subnet.subnet.unwrap_or_default(),
          gateway: subnet.gateway.unwrap_or_default(),
        })
        .collect(),
      options: stringify_opts(ipam.options),
    }),
    labels: spec.labels.map(ListOrMap::into_string_map).unwrap_or_default(),
  }
}

fn compose_from_network(network: &Network) -> ComposeNetwork {
  let mut spec = ComposeNetwork::default();

  if !network.driver.is_empty() {
    spec.driver = Some(network.driver.clone());
  }
  if !network.driver_opts.is_empty() {
    spec.driver_opts = Some(wrap_opts(&network.driver_opts));
  }
  if network.attachable {
    spec.attachable = Some(true);
  }
  if network.external {
    spec.external = Some(true);
  }
  if network.internal {
    spec.internal = Some(true);
  }
  if let Some(ipam) = &network.ipam {
    let mut wire = ComposeIpam::default();
    if !ipam.driver.is_empty() {
      wire.driver = Some(ipam.driver.clone());
    }
    if !ipam.config.is_empty() {
      wire.config = Some(
        ipam
          .config
          .iter()
          .map(|subnet| ComposeIpamSubnet {
            subnet: (!subnet.subnet.is_empty()).then(|| subnet.subnet.clone()),
            gateway: (!subnet.gateway.is_empty()).then(|| subnet.gateway.clone()),
          })
          .collect(),
      );
    }
    if !ipam.options.is_empty() {
      wire.options = Some(wrap_opts(&ipam.options));
    }
    spec.ipam = Some(wire);
  }
  if !network.labels.is_empty() {
    spec.labels = Some(ListOrMap::from(network.labels.clone()));
  }

  spec
}

fn volume_from_compose(name: &str, spec: ComposeVolume) -> Volume {
  Volume {
    name: name.to_string(),
    driver: spec.driver.unwrap_or_default(),
    driver_opts: stringify_opts(spec.driver_opts),
    external: spec.external.unwrap_or_default(),
    labels: spec.labels.map(ListOrMap::into_string_map).unwrap_or_default(),
  }
}

fn compose_from_volume(volume: &Volume) -> ComposeVolume {
  let mut spec = ComposeVolume::default();

  if !volume.driver.is_empty() {
    spec.driver = Some(volume.driver.clone());
  }
  if !volume.driver_opts.is_empty() {
    spec.driver_opts = Some(wrap_opts(&volume.driver_opts));
  }
  if volume.external {
    spec.external = Some(true);
  }
  if !volume.labels.is_empty() {
    spec.labels = Some(ListOrMap::from(volume.labels.clone()));
  }

  spec
}

fn config_from_compose(name: &str, spec: ComposeConfig) -> Config {
  Config {
    name: name.to_string(),
    content: spec.content.unwrap_or_default(),
    file: spec.file.unwrap_or_default(),
    template: spec.template.unwrap_or_default(),
    mode: spec.mode.unwrap_or_default(),
  }
}

fn compose_from_config(config: &Config) -> ComposeConfig {
  ComposeConfig {
    content: (!config.content.is_empty()).then(|| config.content.clone()),
    file: (!config.file.is_empty()).then(|| config.file.clone()),
    template: (!config.template.is_empty()).then(|| config.template.clone()),
    mode: (!config.mode.is_empty()).then(|| config.mode.clone()),
  }
}

fn secret_from_compose(name: &str, spec: ComposeSecret) -> Secret {
  Secret {
    name: name.to_string(),
    file: spec.file.unwrap_or_default(),
    environment: spec.environment.unwrap_or_default(),
    external: spec.external.unwrap_or_default(),
  }
}

fn compose_from_secret(secret: &Secret) -> ComposeSecret {
  ComposeSecret {
    file: (!secret.file.is_empty()).then(|| secret.file.clone()),
    environment: (!secret.environment.is_empty()).then(|| secret.environment.clone()),
    external: secret.external.then_some(true),
  }
}

fn stringify_opts(opts: Option<IndexMap<String, SingleValue>>) -> IndexMap<String, String> {
  opts
    .unwrap_or_default()
    .into_iter()
    .map(|(key, value)| (key, value.to_string()))
    .collect()
}

fn wrap_opts(opts: &IndexMap<String, String>) -> IndexMap<String, SingleValue> {
  opts
    .iter()
    .map(|(key, value)| (key.clone(), SingleValue::String(value.clone())))
    .collect()
}

/// Expands `${VAR}` and `${VAR:-default}` placeholders. A set, non-empty
/// variable wins over the literal default; an unset variable without a
/// default expands to the empty string.
pub(crate) fn expand_env_vars(input: &str, env: EnvLookup) -> String {
  let mut result = String::with_capacity(input.len());
  let mut rest = input;

  while let Some(start) = rest.find("${") {
    result.push_str(&rest[..start]);
    let after = &rest[start + 2..];

    let Some(end) = after.find('}') else {
      // Unterminated placeholder, keep it verbatim
      result.push_str(&rest[start..]);
      return result;
    };

    let expr = &after[..end];
    let value = match expr.split_once(":-") {
      Some((name, default)) => env(name)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string()),
      None => env(expr).unwrap_or_default(),
    };

    result.push_str(&value);
    rest = &after[end + 1..];
  }

  result.push_str(rest);
  result
}

/// Parses a Compose port string: `80`, `8080:80`, `127.0.0.1:8080:80`, each
/// with an optional `/tcp` or `/udp` suffix, after placeholder expansion.
pub(crate) fn parse_port_mapping(spec: &str, env: EnvLookup) -> Result<PortMapping, ConvertError> {
  let expanded = expand_env_vars(spec, env);

  let (address, protocol) = match expanded.split_once('/') {
    Some((address, protocol)) => (address, protocol.to_string()),
    None => (expanded.as_str(), "tcp".to_string()),
  };

  let segments: Vec<&str> = address.split(':').collect();

  let mapping = match segments.as_slice() {
    [container] if !container.is_empty() => PortMapping {
      container_port: (*container).to_string(),
      protocol,
      ..Default::default()
    },
    [host, container] => PortMapping {
      host_port: (*host).to_string(),
      container_port: (*container).to_string(),
      protocol,
      ..Default::default()
    },
    [host_ip, host, container] => PortMapping {
      host_ip: (*host_ip).to_string(),
      host_port: (*host).to_string(),
      container_port: (*container).to_string(),
      protocol,
    },
    _ => return Err(ConvertError::InvalidPortMapping(spec.to_string())),
  };

  Ok(mapping)
}

fn format_port(port: &PortMapping) -> String {
  let mut spec = if port.host_port.is_empty() {
    port.container_port.clone()
  } else if port.host_ip.is_empty() {
    format!("{}:{}", port.host_port, port.container_port)
  } else {
    format!("{}:{}:{}", port.host_ip, port.host_port, port.container_port)
  };

  if !port.protocol.is_empty() && port.protocol != "tcp" {
    spec = format!("{spec}/{}", port.protocol);
  }

  spec
}

/// Parses a Compose volume string: `source:target` with an optional
/// comma-separated options segment (`ro`, `rw`, SELinux and propagation
/// modes). A source with a path separator or a leading `.`/`~` is a bind
/// mount, anything else a named volume.
pub(crate) fn parse_volume_mount(spec: &str) -> Result<VolumeMount, ConvertError> {
  let segments: Vec<&str> = spec.split(':').collect();

  if segments.len() < 2 {
    return Err(ConvertError::InvalidVolumeSpec(spec.to_string()));
  }

  let mut mount = VolumeMount {
    source: segments[0].to_string(),
    target: segments[1].to_string(),
    ..Default::default()
  };

  if segments.len() > 2 {
    for option in segments[2].split(',') {
      match option {
        "ro" | "readonly" => mount.read_only = true,
        "rw" => mount.read_only = false,
        "Z" | "z" | "shared" | "private" | "slave" => mount.mode = option.to_string(),
        _ => {}
      }
    }
  }

  mount.kind = if mount.source.contains('/')
    || mount.source.starts_with('.')
    || mount.source.starts_with('~')
  {
    MountKind::Bind
  } else {
    MountKind::Volume
  };

  Ok(mount)
}

fn format_volume(mount: &VolumeMount) -> String {
  let mut options = Vec::new();

  if mount.read_only {
    options.push("ro");
  }
  if !mount.mode.is_empty() {
    options.push(&mount.mode);
  }

  if options.is_empty() {
    format!("{}:{}", mount.source, mount.target)
  } else {
    format!("{}:{}:{}", mount.source, mount.target, options.join(","))
  }
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;

  fn no_env(_: &str) -> Option<String> {
    None
  }

  const NO_ENV: EnvLookup<'static> = &no_env;

  const FIXTURE: &str = indoc! {r#"
    version: "3.8"
    services:
      web:
        image: nginx:latest
        container_name: front
        ports:
          - "8080:80"
        environment:
          NGINX_HOST: example.com
          NGINX_PORT: 80
        depends_on:
          db:
            condition: service_healthy
        volumes:
          - ./conf:/etc/nginx:ro,Z
          - data:/var/lib/nginx
        restart: unless-stopped
        x-rollout: canary
      db:
        image: postgres:16
        environment:
          - POSTGRES_PASSWORD=secret
          - POSTGRES_DB=app
        healthcheck:
          test: ["CMD", "pg_isready"]
          interval: 10s
          retries: 5
    networks:
      backend:
        driver: bridge
    volumes:
      data:
    x-owner: platform-team
  "#};

  #[test]
  fn parses_fixture() {
    let app = parse_with_env(FIXTURE, NO_ENV).unwrap();

    assert_eq!(app.platform, Platform::DockerCompose);
    assert_eq!(app.version, "3.8");
    assert_eq!(app.services.len(), 2);

    let web = &app.services["web"];
    assert_eq!(web.image, "nginx:latest");
    assert_eq!(web.container_name, "front");
    assert_eq!(web.ports.len(), 1);
    assert_eq!(web.environment.len(), 2);
    assert_eq!(web.environment["NGINX_PORT"], "80");
    assert_eq!(web.depends_on, vec!["db".to_string()]);
    assert_eq!(web.restart, "unless-stopped");
    assert_eq!(web.extensions["x-rollout"], "canary");

    let db = &app.services["db"];
    assert_eq!(db.environment["POSTGRES_PASSWORD"], "secret");
    let hc = db.healthcheck.as_ref().unwrap();
    assert_eq!(hc.test, vec!["CMD".to_string(), "pg_isready".to_string()]);
    assert_eq!(hc.retries, 5);

    assert_eq!(app.networks["backend"].driver, "bridge");
    assert!(app.volumes.contains_key("data"));
    assert_eq!(app.extensions["x-owner"], "platform-team");
  }

  #[test]
  fn classifies_volume_mounts() {
    let app = parse_with_env(FIXTURE, NO_ENV).unwrap();
    let web = &app.services["web"];

    let bind = &web.volumes[0];
    assert_eq!(bind.kind, MountKind::Bind);
    assert!(bind.read_only);
    assert_eq!(bind.mode, "Z");

    let named = &web.volumes[1];
    assert_eq!(named.kind, MountKind::Volume);
    assert_eq!(named.source, "data");
    assert!(!named.read_only);
  }

  #[test]
  fn port_without_host_ip() {
    let port = parse_port_mapping("8080:80", NO_ENV).unwrap();

    assert_eq!(
      port,
      PortMapping {
        host_ip: String::new(),
        host_port: "8080".to_string(),
        container_port: "80".to_string(),
        protocol: "tcp".to_string(),
      }
    );
  }

  #[test]
  fn port_with_host_ip_and_protocol() {
    let port = parse_port_mapping("127.0.0.1:8080:80/udp", NO_ENV).unwrap();

    assert_eq!(
      port,
      PortMapping {
        host_ip: "127.0.0.1".to_string(),
        host_port: "8080".to_string(),
        container_port: "80".to_string(),
        protocol: "udp".to_string(),
      }
    );
  }

  #[test]
  fn bare_container_port() {
    let port = parse_port_mapping("80", NO_ENV).unwrap();

    assert_eq!(port.container_port, "80");
    assert!(port.host_port.is_empty());
  }

  #[test]
  fn rejects_invalid_port() {
    assert!(matches!(
      parse_port_mapping("1:2:3:4", NO_ENV),
      Err(ConvertError::InvalidPortMapping(_))
    ));
  }

  #[test]
  fn expands_placeholders_through_the_lookup() {
    let env: EnvLookup<'_> = &|name| (name == "HOST_PORT").then(|| "9090".to_string());

    assert_eq!(expand_env_vars("${HOST_PORT:-8080}:80", env), "9090:80");
    assert_eq!(expand_env_vars("${OTHER_PORT:-8080}:80", env), "8080:80");
    assert_eq!(expand_env_vars("${UNSET}:80", env), ":80");
    assert_eq!(expand_env_vars("plain:80", env), "plain:80");
  }

  #[test]
  fn expanded_port_parses() {
    let env: EnvLookup<'_> = &|_| None;
    let port = parse_port_mapping("${WEB_PORT:-8080}:80/tcp", env).unwrap();

    assert_eq!(port.host_port, "8080");
    assert_eq!(port.container_port, "80");
  }

  #[test]
  fn rejects_volume_without_target() {
    assert!(matches!(
      parse_volume_mount("justonepart"),
      Err(ConvertError::InvalidVolumeSpec(_))
    ));
  }

  #[test]
  fn round_trip_preserves_structure() {
    let app = parse_with_env(FIXTURE, NO_ENV).unwrap();
    let yaml = serialize(&app).unwrap();
    let reparsed = parse_with_env(&yaml, NO_ENV).unwrap();

    assert_eq!(reparsed.services.len(), app.services.len());
    for (name, service) in &app.services {
      let other = &reparsed.services[name];
      assert_eq!(other.image, service.image);
      assert_eq!(other.environment.len(), service.environment.len());
    }
    assert_eq!(reparsed.networks.len(), app.networks.len());
    assert_eq!(reparsed.volumes.len(), app.volumes.len());
    assert_eq!(reparsed.extensions, app.extensions);
  }

  #[test]
  fn mount_options_survive_round_trip() {
    let mount = VolumeMount {
      source: "./conf".to_string(),
      target: "/etc/nginx".to_string(),
      kind: MountKind::Bind,
      read_only: true,
      mode: "Z".to_string(),
    };

    let reparsed = parse_volume_mount(&format_volume(&mount)).unwrap();

    assert_eq!(reparsed, mount);
  }
}
