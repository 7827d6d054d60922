//! Job-spec (Nomad-style HCL) adapter.
//!
//! This parser is deliberately partial: a line-oriented scanner that only
//! recognizes `task "<name>" {` headers and `image = "<ref>"` assignments
//! inside them. Full HCL parsing (interpolation, templates, constraints,
//! service stanzas) is out of scope; widening the recognized grammar would
//! also change what the conversion engine may assume about restart policies.

use std::fmt::Write;

use crate::{
  model::{Application, Platform, Service},
  ConvertError,
};

/// Extracts services from job-spec text. Only task names and their docker
/// images are recognized.
pub fn parse(content: &str) -> Result<Application, ConvertError> {
  let mut app = Application::new(Platform::Nomad);
  let mut current_task = String::new();

  for line in content.lines() {
    let line = line.trim();

    if line.starts_with("task ") && line.contains('{') {
      if let Some(name) = line.split_whitespace().nth(1) {
        current_task = name.trim_matches('"').to_string();
      }
    } else if line.contains("image = ") && !current_task.is_empty() {
      if let Some((_, value)) = line.split_once('=') {
        let image = value.trim().trim_matches('"');
        app.add_service(Service::new(
          current_task.clone(),
          image,
          Platform::Nomad,
        ));
      }
    }
  }

  Ok(app)
}

/// Emits a fixed job/group/task skeleton with the docker driver, one group
/// and task per service, and only the image populated in the driver config.
pub fn serialize(app: &Application) -> Result<String, ConvertError> {
  let mut hcl = String::new();

  hcl.push_str("job \"app\" {\n");
  hcl.push_str("  datacenters = [\"dc1\"]\n");
  hcl.push_str("  type = \"service\"\n\n");

  for (name, service) in &app.services {
    let _ = writeln!(hcl, "  group \"{name}\" {{");
    hcl.push_str("    count = 1\n\n");
    let _ = writeln!(hcl, "    task \"{name}\" {{");
    hcl.push_str("      driver = \"docker\"\n\n");
    hcl.push_str("      config {\n");
    if !service.image.is_empty() {
      let _ = writeln!(hcl, "        image = \"{}\"", service.image);
    }
    hcl.push_str("      }\n");
    hcl.push_str("    }\n");
    hcl.push_str("  }\n\n");
  }

  hcl.push_str("}\n");

  Ok(hcl)
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;

  const JOB: &str = indoc! {r#"
    job "stack" {
      datacenters = ["dc1"]

      group "frontend" {
        task "web" {
          driver = "docker"

          config {
            image = "nginx:latest"
          }
        }
      }

      group "storage" {
        task "db" {
          driver = "docker"

          config {
            image = "postgres:16"
          }
        }
      }
    }
  "#};

  #[test]
  fn extracts_tasks_and_images() {
    let app = parse(JOB).unwrap();

    assert_eq!(app.platform, Platform::Nomad);
    assert_eq!(app.services.len(), 2);
    assert_eq!(app.services["web"].image, "nginx:latest");
    assert_eq!(app.services["db"].image, "postgres:16");
  }

  #[test]
  fn image_outside_a_task_is_ignored() {
    let app = parse("image = \"stray:1\"\n").unwrap();

    assert!(app.services.is_empty());
  }

  #[test]
  fn skeleton_round_trips_images() {
    let app = parse(JOB).unwrap();
    let hcl = serialize(&app).unwrap();

    assert!(hcl.contains("group \"web\""));
    assert!(hcl.contains("driver = \"docker\""));

    let reparsed = parse(&hcl).unwrap();
    assert_eq!(reparsed.services.len(), app.services.len());
    assert_eq!(reparsed.services["web"].image, "nginx:latest");
  }
}
