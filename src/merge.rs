//! Application merging.

use crate::{model::Application, ConvertError};

/// Unions several applications into one.
///
/// Service names must be disjoint across inputs; a duplicate is a hard
/// conflict naming the first clashing service. Networks, volumes, configs
/// and secrets are unioned first-seen-wins, and the result takes its
/// platform tag from the first input.
pub fn merge(apps: Vec<Application>) -> Result<Application, ConvertError> {
  let Some(first_platform) = apps.first().map(|app| app.platform) else {
    return Err(ConvertError::NothingToMerge);
  };

  let mut merged = Application::new(first_platform);

  for app in apps {
    for (name, service) in app.services {
      if merged.services.contains_key(&name) {
        return Err(ConvertError::MergeConflict(name));
      }
      merged.services.insert(name, service);
    }

    for (name, network) in app.networks {
      merged.networks.entry(name).or_insert(network);
    }

    for (name, volume) in app.volumes {
      merged.volumes.entry(name).or_insert(volume);
    }

    for (name, config) in app.configs {
      merged.configs.entry(name).or_insert(config);
    }

    for (name, secret) in app.secrets {
      merged.secrets.entry(name).or_insert(secret);
    }
  }

  Ok(merged)
}
