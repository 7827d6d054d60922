//! Kubernetes adapter.
//!
//! Parses multi-document manifests into the canonical [`Application`] and
//! back. Recognized kinds: Deployment, Service, ConfigMap, Secret,
//! PersistentVolumeClaim and Ingress. Documents of any other kind are
//! silently ignored; this leniency is deliberate, since real manifest
//! bundles routinely carry RBAC and CRD resources the canonical model has no
//! equivalent for.

use indexmap::{indexmap, IndexMap};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  model::{
    Application, Config, MountKind, Platform, PortMapping, Secret, Service, Volume, VolumeMount,
  },
  serde_utils::{SingleValue, StringOrNum},
  ConvertError,
};

/// Splits manifest content on lines containing exactly `---`.
pub(crate) fn split_documents(content: &str) -> Vec<String> {
  let mut documents = Vec::new();
  let mut current = String::new();

  for line in content.lines() {
    if line.trim() == "---" {
      documents.push(std::mem::take(&mut current));
    } else {
      current.push_str(line);
      current.push('\n');
    }
  }
  documents.push(current);

  documents
}

/// Parses Kubernetes YAML manifests.
pub fn parse(content: &str) -> Result<Application, ConvertError> {
  let mut app = Application::new(Platform::Kubernetes);

  for doc in split_documents(content) {
    if doc.trim().is_empty() {
      continue;
    }

    let value: serde_yaml_ng::Value =
      serde_yaml_ng::from_str(&doc).map_err(|e| ConvertError::InvalidDocument {
        platform: Platform::Kubernetes,
        error: e.to_string(),
      })?;

    let Some(kind) = value.get("kind").and_then(|k| k.as_str()).map(str::to_string) else {
      continue;
    };

    match kind.as_str() {
      "Deployment" => parse_deployment(&mut app, value)?,
      "Service" => parse_service(&mut app, value)?,
      "ConfigMap" => parse_config_map(&mut app, value)?,
      "Secret" => parse_secret(&mut app, value)?,
      "PersistentVolumeClaim" => parse_pvc(&mut app, value)?,
      "Ingress" => parse_ingress(&mut app, value)?,
      _ => {}
    }
  }

  Ok(app)
}

/// Serializes an [`Application`] to multi-document Kubernetes YAML: one
/// ConfigMap/Secret/PersistentVolumeClaim per named resource, then per
/// service a Deployment plus — only when the service publishes ports — a
/// Service document.
pub fn serialize(app: &Application) -> Result<String, ConvertError> {
  let mut documents = Vec::new();

  for config in app.configs.values() {
    documents.push(to_yaml(&config_map_manifest(config))?);
  }

  for secret in app.secrets.values() {
    documents.push(to_yaml(&secret_manifest(secret))?);
  }

  for volume in app.volumes.values() {
    documents.push(to_yaml(&pvc_manifest(volume))?);
  }

  for (name, service) in &app.services {
    documents.push(to_yaml(&deployment_manifest(name, service))?);

    if !service.ports.is_empty() {
      documents.push(to_yaml(&service_manifest(name, service))?);
    }
  }

  Ok(documents.join("---\n"))
}

fn to_yaml<T: Serialize>(manifest: &T) -> Result<String, ConvertError> {
  serde_yaml_ng::to_string(manifest).map_err(|e| ConvertError::SerializationError {
    platform: Platform::Kubernetes,
    error: e.to_string(),
  })
}

fn from_value<T: serde::de::DeserializeOwned>(
  value: serde_yaml_ng::Value,
) -> Result<T, ConvertError> {
  serde_yaml_ng::from_value(value).map_err(|e| ConvertError::InvalidDocument {
    platform: Platform::Kubernetes,
    error: e.to_string(),
  })
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Metadata {
  #[serde(skip_serializing_if = "String::is_empty")]
  name: String,

  #[serde(skip_serializing_if = "IndexMap::is_empty")]
  labels: IndexMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Deployment {
  api_version: String,
  kind: String,
  metadata: Metadata,
  spec: DeploymentSpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DeploymentSpec {
  #[serde(skip_serializing_if = "Option::is_none")]
  replicas: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  selector: Option<Selector>,

  template: PodTemplate,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Selector {
  match_labels: IndexMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PodTemplate {
  metadata: Metadata,
  spec: PodSpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PodSpec {
  containers: Vec<Container>,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  volumes: Vec<PodVolume>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Container {
  #[serde(skip_serializing_if = "String::is_empty")]
  name: String,

  #[serde(skip_serializing_if = "String::is_empty")]
  image: String,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  command: Vec<String>,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  args: Vec<String>,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  env: Vec<EnvVar>,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  ports: Vec<ContainerPortSpec>,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  volume_mounts: Vec<ContainerVolumeMount>,
}

/// An environment variable entry. `valueFrom` references have no literal
/// value and are skipped on parse.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct EnvVar {
  name: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  value: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ContainerPortSpec {
  #[serde(skip_serializing_if = "Option::is_none")]
  container_port: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  protocol: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ContainerVolumeMount {
  name: String,
  mount_path: String,

  #[serde(skip_serializing_if = "std::ops::Not::not")]
  read_only: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PodVolume {
  name: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  config_map: Option<NamedRef>,

  #[serde(skip_serializing_if = "Option::is_none")]
  secret: Option<SecretRef>,

  #[serde(skip_serializing_if = "Option::is_none")]
  host_path: Option<HostPathRef>,

  #[serde(skip_serializing_if = "Option::is_none")]
  empty_dir: Option<IndexMap<String, String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct NamedRef {
  name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SecretRef {
  secret_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct HostPathRef {
  path: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ServiceManifest {
  api_version: String,
  kind: String,
  metadata: Metadata,
  spec: ServiceSpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ServiceSpec {
  #[serde(skip_serializing_if = "IndexMap::is_empty")]
  selector: IndexMap<String, String>,

  ports: Vec<ServicePort>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ServicePort {
  #[serde(skip_serializing_if = "Option::is_none")]
  port: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  target_port: Option<StringOrNum>,

  #[serde(skip_serializing_if = "Option::is_none")]
  protocol: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigMapManifest {
  api_version: String,
  kind: String,
  metadata: Metadata,

  #[serde(skip_serializing_if = "IndexMap::is_empty")]
  data: IndexMap<String, SingleValue>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SecretManifest {
  api_version: String,
  kind: String,
  metadata: Metadata,

  #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
  secret_type: String,

  #[serde(skip_serializing_if = "IndexMap::is_empty")]
  data: IndexMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PvcManifest {
  api_version: String,
  kind: String,
  metadata: Metadata,
  spec: PvcSpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PvcSpec {
  #[serde(skip_serializing_if = "Vec::is_empty")]
  access_modes: Vec<String>,

  resources: PvcResources,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PvcResources {
  requests: IndexMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct IngressManifest {
  spec: IngressSpec,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct IngressSpec {
  rules: Vec<IngressRule>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct IngressRule {
  host: String,
}

fn parse_deployment(
  app: &mut Application,
  value: serde_yaml_ng::Value,
) -> Result<(), ConvertError> {
  let manifest: Deployment = from_value(value)?;

  let name = manifest.metadata.name;
  if name.is_empty() {
    return Err(ConvertError::MissingResourceName {
      kind: "Deployment".to_string(),
    });
  }

  let pod = manifest.spec.template.spec;
  let Some(container) = pod.containers.into_iter().next() else {
    return Err(ConvertError::EmptyDeployment(name));
  };

  let mut service = Service {
    name: name.clone(),
    image: container.image,
    platform: Platform::Kubernetes,
    ..Default::default()
  };

  service.command = container.command;
  service.command.extend(container.args);

  for var in container.env {
    if let Some(value) = var.value {
      service.environment.insert(var.name, value);
    }
  }

  for port in container.ports {
    if let Some(container_port) = port.container_port {
      service.ports.push(PortMapping {
        container_port: container_port.to_string(),
        protocol: port.protocol.map(|p| p.to_lowercase()).unwrap_or_default(),
        ..Default::default()
      });
    }
  }

  for mount in container.volume_mounts {
    service.volumes.push(VolumeMount {
      source: mount.name,
      target: mount.mount_path,
      kind: MountKind::Volume,
      read_only: mount.read_only,
      mode: String::new(),
    });
  }

  for pod_volume in pod.volumes {
    let mut volume = Volume {
      name: pod_volume.name.clone(),
      ..Default::default()
    };

    if let Some(config_map) = pod_volume.config_map {
      volume.driver = "configMap".to_string();
      volume.driver_opts = indexmap! { "configMap".to_string() => config_map.name };
    } else if let Some(secret) = pod_volume.secret {
      volume.driver = "secret".to_string();
      volume.driver_opts = indexmap! { "secretName".to_string() => secret.secret_name };
    } else if let Some(host_path) = pod_volume.host_path {
      volume.driver = "hostPath".to_string();
      volume.driver_opts = indexmap! { "path".to_string() => host_path.path };
    }

    app.volumes.insert(pod_volume.name, volume);
  }

  app.services.insert(name, service);
  Ok(())
}

fn parse_service(app: &mut Application, value: serde_yaml_ng::Value) -> Result<(), ConvertError> {
  let manifest: ServiceManifest = from_value(value)?;

  let name = manifest.metadata.name;
  if name.is_empty() {
    return Err(ConvertError::MissingResourceName {
      kind: "Service".to_string(),
    });
  }

  // A Service document only enriches an already-parsed Deployment of the
  // same name; a standalone one carries no container to build an entity from.
  let Some(service) = app.services.get_mut(&name) else {
    return Ok(());
  };

  for port in manifest.spec.ports {
    let (Some(host_port), Some(target)) = (port.port, port.target_port) else {
      continue;
    };

    let target = target.to_string();
    if let Some(mapping) = service
      .ports
      .iter_mut()
      .find(|mapping| mapping.container_port == target)
    {
      mapping.host_port = host_port.to_string();
    }
  }

  Ok(())
}

fn parse_config_map(
  app: &mut Application,
  value: serde_yaml_ng::Value,
) -> Result<(), ConvertError> {
  let manifest: ConfigMapManifest = from_value(value)?;

  let name = manifest.metadata.name;
  if name.is_empty() {
    return Err(ConvertError::MissingResourceName {
      kind: "ConfigMap".to_string(),
    });
  }

  let content = manifest
    .data
    .iter()
    .map(|(key, value)| format!("{key}: {value}\n"))
    .collect::<String>();

  app.configs.insert(
    name.clone(),
    Config {
      name,
      content,
      ..Default::default()
    },
  );

  Ok(())
}

fn parse_secret(app: &mut Application, value: serde_yaml_ng::Value) -> Result<(), ConvertError> {
  let manifest: SecretManifest = from_value(value)?;

  let name = manifest.metadata.name;
  if name.is_empty() {
    return Err(ConvertError::MissingResourceName {
      kind: "Secret".to_string(),
    });
  }

  // Only the key names are recorded, never the (base64) values.
  let keys: Vec<&str> = manifest.data.keys().map(String::as_str).collect();

  app.secrets.insert(
    name.clone(),
    Secret {
      name,
      environment: keys.join(","),
      ..Default::default()
    },
  );

  Ok(())
}

fn parse_pvc(app: &mut Application, value: serde_yaml_ng::Value) -> Result<(), ConvertError> {
  let manifest: PvcManifest = from_value(value)?;

  let name = manifest.metadata.name;
  if name.is_empty() {
    return Err(ConvertError::MissingResourceName {
      kind: "PersistentVolumeClaim".to_string(),
    });
  }

  let mut volume = Volume {
    name: name.clone(),
    driver: "persistentVolumeClaim".to_string(),
    ..Default::default()
  };

  if let Some(storage) = manifest.spec.resources.requests.get("storage") {
    volume.driver_opts = indexmap! { "storage".to_string() => storage.clone() };
  }

  app.volumes.insert(name, volume);
  Ok(())
}

fn parse_ingress(app: &mut Application, value: serde_yaml_ng::Value) -> Result<(), ConvertError> {
  let manifest: IngressManifest = from_value(value)?;

  for rule in manifest.spec.rules {
    if rule.host.is_empty() {
      continue;
    }

    let hosts = app
      .extensions
      .entry("ingress".to_string())
      .or_insert_with(|| json!([]));

    if let Some(list) = hosts.as_array_mut() {
      list.push(json!(rule.host));
    }
  }

  Ok(())
}

fn deployment_manifest(name: &str, service: &Service) -> Deployment {
  let app_labels = indexmap! { "app".to_string() => name.to_string() };

  let mut container = Container {
    name: name.to_string(),
    image: service.image.clone(),
    command: service.command.clone(),
    ..Default::default()
  };

  for (key, value) in &service.environment {
    container.env.push(EnvVar {
      name: key.clone(),
      value: Some(value.clone()),
    });
  }

  for port in &service.ports {
    container.ports.push(ContainerPortSpec {
      container_port: Some(parse_port_number(&port.container_port)),
      protocol: upper_protocol(&port.protocol),
    });
  }

  let mut pod_volumes = Vec::new();
  for mount in &service.volumes {
    container.volume_mounts.push(ContainerVolumeMount {
      name: mount.source.clone(),
      mount_path: mount.target.clone(),
      read_only: mount.read_only,
    });

    pod_volumes.push(PodVolume {
      name: mount.source.clone(),
      empty_dir: Some(IndexMap::new()),
      ..Default::default()
    });
  }

  Deployment {
    api_version: "apps/v1".to_string(),
    kind: "Deployment".to_string(),
    metadata: Metadata {
      name: name.to_string(),
      labels: IndexMap::new(),
    },
    spec: DeploymentSpec {
      replicas: Some(1),
      selector: Some(Selector {
        match_labels: app_labels.clone(),
      }),
      template: PodTemplate {
        metadata: Metadata {
          name: String::new(),
          labels: app_labels,
        },
        spec: PodSpec {
          containers: vec![container],
          volumes: pod_volumes,
        },
      },
    },
  }
}

fn service_manifest(name: &str, service: &Service) -> ServiceManifest {
  let ports = service
    .ports
    .iter()
    .map(|port| ServicePort {
      port: Some(parse_port_number(&port.host_port)),
      target_port: Some(StringOrNum::Num(parse_port_number(&port.container_port))),
      protocol: upper_protocol(&port.protocol),
    })
    .collect();

  ServiceManifest {
    api_version: "v1".to_string(),
    kind: "Service".to_string(),
    metadata: Metadata {
      name: name.to_string(),
      labels: IndexMap::new(),
    },
    spec: ServiceSpec {
      selector: indexmap! { "app".to_string() => name.to_string() },
      ports,
    },
  }
}

fn config_map_manifest(config: &Config) -> ConfigMapManifest {
  ConfigMapManifest {
    api_version: "v1".to_string(),
    kind: "ConfigMap".to_string(),
    metadata: Metadata {
      name: config.name.clone(),
      labels: IndexMap::new(),
    },
    data: indexmap! {
      format!("{}.yaml", config.name) => SingleValue::String(config.content.clone()),
    },
  }
}

fn secret_manifest(secret: &Secret) -> SecretManifest {
  let mut data = IndexMap::new();
  for key in secret.environment.split(',').filter(|key| !key.is_empty()) {
    // Placeholder value; real secret material never travels through the
    // canonical model.
    data.insert(key.to_string(), String::new());
  }

  SecretManifest {
    api_version: "v1".to_string(),
    kind: "Secret".to_string(),
    metadata: Metadata {
      name: secret.name.clone(),
      labels: IndexMap::new(),
    },
    secret_type: "Opaque".to_string(),
    data,
  }
}

fn pvc_manifest(volume: &Volume) -> PvcManifest {
  let storage = volume
    .driver_opts
    .get("storage")
    .cloned()
    .unwrap_or_else(|| "1Gi".to_string());

  PvcManifest {
    api_version: "v1".to_string(),
    kind: "PersistentVolumeClaim".to_string(),
    metadata: Metadata {
      name: volume.name.clone(),
      labels: IndexMap::new(),
    },
    spec: PvcSpec {
      access_modes: vec!["ReadWriteOnce".to_string()],
      resources: PvcResources {
        requests: indexmap! { "storage".to_string() => storage },
      },
    },
  }
}

/// Best-effort numeric conversion of a canonical string port; 0 when the
/// string does not hold a number.
fn parse_port_number(port: &str) -> i64 {
  port.parse().unwrap_or(0)
}

fn upper_protocol(protocol: &str) -> Option<String> {
  (!protocol.is_empty() && protocol != "tcp").then(|| protocol.to_uppercase())
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;

  const MANIFESTS: &str = indoc! {r#"
    apiVersion: apps/v1
    kind: Deployment
    metadata:
      name: web
    spec:
      replicas: 1
      template:
        spec:
          containers:
            - name: web
              image: nginx:latest
              command: ["nginx"]
              args: ["-g", "daemon off;"]
              env:
                - name: NGINX_HOST
                  value: example.com
              ports:
                - containerPort: 80
              volumeMounts:
                - name: conf
                  mountPath: /etc/nginx
                  readOnly: true
          volumes:
            - name: conf
              configMap:
                name: web-conf
    ---
    apiVersion: v1
    kind: Service
    metadata:
      name: web
    spec:
      ports:
        - port: 80
          targetPort: 80
    ---
    apiVersion: v1
    kind: ConfigMap
    metadata:
      name: web-conf
    data:
      worker_processes: auto
    ---
    apiVersion: v1
    kind: Secret
    metadata:
      name: web-secrets
    data:
      API_KEY: c2VjcmV0
      DB_PASSWORD: aHVudGVyMg==
    ---
    apiVersion: v1
    kind: PersistentVolumeClaim
    metadata:
      name: web-data
    spec:
      resources:
        requests:
          storage: 5Gi
    ---
    apiVersion: networking.k8s.io/v1
    kind: Ingress
    metadata:
      name: web-ingress
    spec:
      rules:
        - host: example.com
    ---
    apiVersion: rbac.authorization.k8s.io/v1
    kind: ClusterRole
    metadata:
      name: ignored
  "#};

  #[test]
  fn deployment_and_service_pair_up() {
    let app = parse(MANIFESTS).unwrap();

    assert_eq!(app.services.len(), 1);
    let web = &app.services["web"];
    assert_eq!(web.image, "nginx:latest");
    assert_eq!(
      web.command,
      vec!["nginx".to_string(), "-g".to_string(), "daemon off;".to_string()]
    );
    assert_eq!(web.environment["NGINX_HOST"], "example.com");

    assert_eq!(web.ports.len(), 1);
    assert_eq!(web.ports[0].container_port, "80");
    assert_eq!(web.ports[0].host_port, "80");
  }

  #[test]
  fn pod_volumes_classify_by_driver() {
    let app = parse(MANIFESTS).unwrap();

    let conf = &app.volumes["conf"];
    assert_eq!(conf.driver, "configMap");
    assert_eq!(conf.driver_opts["configMap"], "web-conf");

    let web = &app.services["web"];
    assert_eq!(web.volumes.len(), 1);
    assert_eq!(web.volumes[0].source, "conf");
    assert_eq!(web.volumes[0].target, "/etc/nginx");
    assert!(web.volumes[0].read_only);
  }

  #[test]
  fn config_map_flattens_to_content() {
    let app = parse(MANIFESTS).unwrap();

    assert_eq!(app.configs["web-conf"].content, "worker_processes: auto\n");
  }

  #[test]
  fn secret_records_only_key_names() {
    let app = parse(MANIFESTS).unwrap();

    let secret = &app.secrets["web-secrets"];
    assert_eq!(secret.environment, "API_KEY,DB_PASSWORD");
    assert!(!secret.environment.contains("c2VjcmV0"));
  }

  #[test]
  fn pvc_becomes_volume_with_storage() {
    let app = parse(MANIFESTS).unwrap();

    let data = &app.volumes["web-data"];
    assert_eq!(data.driver, "persistentVolumeClaim");
    assert_eq!(data.driver_opts["storage"], "5Gi");
  }

  #[test]
  fn ingress_hosts_land_in_extensions() {
    let app = parse(MANIFESTS).unwrap();

    assert_eq!(app.extensions["ingress"], json!(["example.com"]));
  }

  #[test]
  fn unknown_kinds_are_ignored() {
    let app = parse(MANIFESTS).unwrap();

    // The ClusterRole document must not surface anywhere
    assert_eq!(app.services.len(), 1);
    assert!(!app.extensions.contains_key("ClusterRole"));
  }

  #[test]
  fn invalid_yaml_is_an_error() {
    let result = parse("kind: Deployment\n  bad indent: [");

    assert!(matches!(result, Err(ConvertError::InvalidDocument { .. })));
  }

  #[test]
  fn deployment_without_name_is_an_error() {
    let result = parse(indoc! {"
      kind: Deployment
      spec:
        template:
          spec:
            containers:
              - image: nginx
    "});

    assert!(matches!(
      result,
      Err(ConvertError::MissingResourceName { .. })
    ));
  }

  #[test]
  fn deployment_without_containers_is_an_error() {
    let result = parse(indoc! {"
      kind: Deployment
      metadata:
        name: empty
    "});

    match result {
      Err(ConvertError::EmptyDeployment(name)) => assert_eq!(name, "empty"),
      other => panic!("expected EmptyDeployment, got {other:?}"),
    }
  }

  #[test]
  fn service_document_only_for_ported_services() {
    let mut app = Application::new(Platform::Kubernetes);
    app.add_service(Service::new("worker", "worker:1", Platform::Kubernetes));

    let yaml = serialize(&app).unwrap();

    assert!(yaml.contains("kind: Deployment"));
    assert!(!yaml.contains("kind: Service"));
  }

  #[test]
  fn round_trip_preserves_services() {
    let app = parse(MANIFESTS).unwrap();
    let yaml = serialize(&app).unwrap();
    let reparsed = parse(&yaml).unwrap();

    assert_eq!(reparsed.services.len(), app.services.len());
    for (name, service) in &app.services {
      assert_eq!(reparsed.services[name].image, service.image);
      assert_eq!(
        reparsed.services[name].environment.len(),
        service.environment.len()
      );
    }
  }
}
