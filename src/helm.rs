//! Chart (Helm-style) adapter.
//!
//! Unlike the other adapters this one works on a directory: chart metadata
//! at the root and Kubernetes-style manifests under `templates/`. Template
//! files are treated as static manifests; templating directives are not
//! evaluated, so files that rely on them fail the Kubernetes parse and are
//! skipped.

use std::{
  ffi::OsStr,
  fs::{create_dir_all, read_to_string, write},
  path::Path,
};

use indexmap::{indexmap, IndexMap};
use serde_json::{json, Value};
use walkdir::WalkDir;

use crate::{
  kubernetes,
  model::{Application, Platform},
  ConvertError,
};

/// Parses a chart directory into an [`Application`].
///
/// Requires a `Chart.yaml` at the directory root; its content lands in the
/// application extension bag under the `chart` key.
pub fn parse_chart(chart_dir: &Path) -> Result<Application, ConvertError> {
  let chart_file = chart_dir.join("Chart.yaml");
  if !chart_file.is_file() {
    return Err(ConvertError::NotAChartDir {
      path: chart_dir.to_path_buf(),
    });
  }

  let chart_content = read_to_string(&chart_file).map_err(|e| ConvertError::ReadError {
    path: chart_file.clone(),
    source: e,
  })?;

  let chart_meta: Value =
    serde_yaml_ng::from_str(&chart_content).map_err(|e| ConvertError::InvalidDocument {
      platform: Platform::Helm,
      error: e.to_string(),
    })?;

  let mut app = Application::new(Platform::Helm);

  let templates_dir = chart_dir.join("templates");
  if templates_dir.is_dir() {
    for entry in WalkDir::new(&templates_dir) {
      let entry = entry.map_err(|e| ConvertError::ReadError {
        path: templates_dir.clone(),
        source: e.into(),
      })?;

      if !entry.file_type().is_file() {
        continue;
      }
      if !matches!(
        entry.path().extension().and_then(OsStr::to_str),
        Some("yaml" | "yml")
      ) {
        continue;
      }

      let content = read_to_string(entry.path()).map_err(|e| ConvertError::ReadError {
        path: entry.path().to_path_buf(),
        source: e,
      })?;

      // Files that are not static Kubernetes manifests (unevaluated
      // templating, values files) are skipped, not an error.
      let Ok(parsed) = kubernetes::parse(&content) else {
        continue;
      };

      app.services.extend(parsed.services);
      app.networks.extend(parsed.networks);
      app.volumes.extend(parsed.volumes);
      app.configs.extend(parsed.configs);
      app.secrets.extend(parsed.secrets);
      app.extensions.extend(parsed.extensions);
    }
  }

  app.extensions.insert("chart".to_string(), chart_meta);

  Ok(app)
}

/// Writes an [`Application`] out as a chart directory: `Chart.yaml` at the
/// root (captured metadata merged over generated defaults) and one manifest
/// file per Kubernetes document under `templates/`.
pub fn write_chart(app: &Application, chart_dir: &Path) -> Result<(), ConvertError> {
  create_dir_all(chart_dir).map_err(|e| ConvertError::DirCreation {
    path: chart_dir.to_path_buf(),
    source: e,
  })?;

  let chart_name = chart_dir
    .file_name()
    .and_then(OsStr::to_str)
    .unwrap_or("chart");

  let mut chart_meta: IndexMap<String, Value> = indexmap! {
    "apiVersion".to_string() => json!("v2"),
    "name".to_string() => json!(chart_name),
    "description".to_string() => json!(format!("Generated chart for a {} application", app.platform)),
    "type".to_string() => json!("application"),
    "version".to_string() => json!("0.1.0"),
    "appVersion".to_string() => json!("1.0.0"),
  };

  if let Some(captured) = app.extensions.get("chart").and_then(Value::as_object) {
    for (key, value) in captured {
      chart_meta.insert(key.clone(), value.clone());
    }
  }

  let chart_yaml =
    serde_yaml_ng::to_string(&chart_meta).map_err(|e| ConvertError::SerializationError {
      platform: Platform::Helm,
      error: e.to_string(),
    })?;

  let chart_file = chart_dir.join("Chart.yaml");
  write(&chart_file, chart_yaml).map_err(|e| ConvertError::WriteError {
    path: chart_file,
    source: e,
  })?;

  let templates_dir = chart_dir.join("templates");
  create_dir_all(&templates_dir).map_err(|e| ConvertError::DirCreation {
    path: templates_dir.clone(),
    source: e,
  })?;

  let manifests = kubernetes::serialize(app)?;

  for (index, doc) in kubernetes::split_documents(&manifests).iter().enumerate() {
    let doc = doc.trim();
    if doc.is_empty() {
      continue;
    }

    let path = templates_dir.join(template_file_name(doc, index));
    write(&path, format!("{doc}\n")).map_err(|e| ConvertError::WriteError { path, source: e })?;
  }

  Ok(())
}

/// Derives `<kind>-<name>.yaml` from a serialized document, falling back to
/// `resource` and the document's position when either field is absent.
fn template_file_name(doc: &str, index: usize) -> String {
  let mut kind = None;
  let mut name = None;

  for line in doc.lines() {
    if let Some(value) = line.strip_prefix("kind: ") {
      kind.get_or_insert_with(|| value.trim().to_lowercase());
    } else if let Some(value) = line.strip_prefix("  name: ") {
      name.get_or_insert_with(|| value.trim().to_string());
    }
  }

  format!(
    "{}-{}.yaml",
    kind.unwrap_or_else(|| "resource".to_string()),
    name.unwrap_or_else(|| index.to_string()),
  )
}
