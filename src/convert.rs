//! Cross-platform conversion.
//!
//! Conversion clones the application graph, re-tags every entity with the
//! target platform and remaps the attributes whose vocabulary differs
//! between platforms. Today that is only the restart policy; everything
//! else passes through untouched, so a conversion is lossless up to what the
//! target adapter can express at serialization time.

use serde_json::json;

use crate::model::{Application, Platform, Service};

/// Converts an application from one platform's dialect to another's.
///
/// When `from == to` the input is returned unchanged, without copying.
/// Otherwise a fresh application is produced; the caller keeps exclusive
/// ownership of both graphs.
pub fn convert(app: Application, from: Platform, to: Platform) -> Application {
  if from == to {
    return app;
  }

  let mut converted = Application {
    version: app.version.clone(),
    platform: to,
    includes: app.includes.clone(),
    extensions: app.extensions.clone(),
    ..Default::default()
  };

  for (name, service) in &app.services {
    let mut service = service.clone();
    service.platform = to;
    remap_service(&mut service, from, to);
    converted.services.insert(name.clone(), service);
  }

  converted.networks = app.networks.clone();
  converted.volumes = app.volumes.clone();
  converted.configs = app.configs.clone();
  converted.secrets = app.secrets.clone();

  converted
}

fn remap_service(service: &mut Service, from: Platform, to: Platform) {
  match (from, to) {
    (Platform::DockerCompose, Platform::Nomad) => {
      compose_restart_to_nomad(service);
      labels_to_extensions(service);
    }
    (Platform::DockerCompose, Platform::Kubernetes) => {
      service.restart = compose_restart_to_kubernetes(&service.restart).to_string();
    }
    // Job specs carry no per-service restart vocabulary; conversions out of
    // them normalize to the unless-stopped default. One-way lossy.
    (Platform::Nomad, Platform::DockerCompose) => {
      service.restart = "unless-stopped".to_string();
    }
    (Platform::Nomad, Platform::Kubernetes) => {
      service.restart = compose_restart_to_kubernetes("unless-stopped").to_string();
    }
    (Platform::Kubernetes, Platform::DockerCompose | Platform::Nomad) => {
      service.restart = kubernetes_restart_to_compose(&service.restart).to_string();
    }
    _ => {}
  }
}

fn compose_restart_to_kubernetes(restart: &str) -> &str {
  match restart {
    "always" => "Always",
    "no" => "Never",
    "unless-stopped" => "OnFailure",
    other => other,
  }
}

fn kubernetes_restart_to_compose(restart: &str) -> &str {
  match restart {
    "Always" => "always",
    "Never" => "no",
    "OnFailure" => "unless-stopped",
    other => other,
  }
}

fn compose_restart_to_nomad(service: &mut Service) {
  // The job scheduler restarts tasks by default; both `always` and
  // `unless-stopped` collapse into that default.
  match service.restart.as_str() {
    "always" | "unless-stopped" => service.restart.clear(),
    _ => {}
  }
}

fn labels_to_extensions(service: &mut Service) {
  if service.labels.is_empty() {
    return;
  }

  service
    .extensions
    .insert("labels".to_string(), json!(service.labels));
}

#[cfg(test)]
mod tests {
  use indexmap::indexmap;
  use pretty_assertions::assert_eq;

  use super::*;

  fn compose_app(restart: &str) -> Application {
    let mut app = Application::new(Platform::DockerCompose);
    let mut service = Service::new("web", "nginx:latest", Platform::DockerCompose);
    service.restart = restart.to_string();
    app.add_service(service);
    app
  }

  #[test]
  fn same_platform_is_identity() {
    let app = compose_app("always");
    let converted = convert(app.clone(), Platform::DockerCompose, Platform::DockerCompose);

    assert_eq!(converted, app);
  }

  #[test]
  fn restart_maps_to_kubernetes_vocabulary() {
    for (compose, kubernetes) in [
      ("always", "Always"),
      ("no", "Never"),
      ("unless-stopped", "OnFailure"),
    ] {
      let converted = convert(
        compose_app(compose),
        Platform::DockerCompose,
        Platform::Kubernetes,
      );

      assert_eq!(converted.services["web"].restart, kubernetes);
      assert_eq!(converted.services["web"].platform, Platform::Kubernetes);
    }
  }

  #[test]
  fn restart_round_trips_through_kubernetes() {
    let original = compose_app("unless-stopped");
    let there = convert(
      original.clone(),
      Platform::DockerCompose,
      Platform::Kubernetes,
    );
    let back = convert(there, Platform::Kubernetes, Platform::DockerCompose);

    assert_eq!(back.services.len(), original.services.len());
    assert_eq!(back.services["web"].image, original.services["web"].image);
    assert_eq!(back.services["web"].restart, "unless-stopped");
  }

  #[test]
  fn unknown_restart_values_pass_through() {
    let converted = convert(
      compose_app("on-failure:3"),
      Platform::DockerCompose,
      Platform::Kubernetes,
    );

    assert_eq!(converted.services["web"].restart, "on-failure:3");
  }

  #[test]
  fn nomad_conversion_normalizes_restart() {
    let mut app = Application::new(Platform::Nomad);
    app.add_service(Service::new("web", "nginx:latest", Platform::Nomad));

    let to_compose = convert(app.clone(), Platform::Nomad, Platform::DockerCompose);
    assert_eq!(to_compose.services["web"].restart, "unless-stopped");

    let to_kubernetes = convert(app, Platform::Nomad, Platform::Kubernetes);
    assert_eq!(to_kubernetes.services["web"].restart, "OnFailure");
  }

  #[test]
  fn labels_move_to_extensions_for_nomad() {
    let mut app = compose_app("always");
    app.services["web"].labels = indexmap! {
      "team".to_string() => "platform".to_string(),
    };

    let converted = convert(app, Platform::DockerCompose, Platform::Nomad);

    let web = &converted.services["web"];
    assert!(web.restart.is_empty());
    assert_eq!(web.extensions["labels"]["team"], "platform");
  }

  #[test]
  fn resources_are_carried_over() {
    let mut app = compose_app("always");
    app.networks.insert(
      "backend".to_string(),
      crate::model::Network {
        name: "backend".to_string(),
        driver: "bridge".to_string(),
        ..Default::default()
      },
    );

    let converted = convert(app, Platform::DockerCompose, Platform::Kubernetes);

    assert_eq!(converted.networks["backend"].driver, "bridge");
    assert_eq!(converted.platform, Platform::Kubernetes);
  }
}
