use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locate a service's `config/` directory.
///
/// Works both when run from the workspace root and from the service's own
/// directory.
pub fn configuration_directory(service_dir: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(service_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(service_dir).join("config"))
    }
}

/// Load layered settings for a service.
///
/// Sources, lowest precedence first:
/// 1. `<config_dir>/base.yaml` (required)
/// 2. `APP_` prefixed environment variables, `__` separating nested keys
///    (e.g. `APP_SERVER__PORT=8080`)
///
/// `.env` is loaded into the environment beforehand when present.
pub fn load_settings<T: DeserializeOwned>(config_dir: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        server: SampleServer,
    }

    #[derive(Debug, Deserialize)]
    struct SampleServer {
        host: String,
        port: u16,
    }

    #[test]
    fn test_load_settings_from_yaml() {
        let dir = std::env::temp_dir().join(format!("service-core-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("base.yaml"),
            "server:\n  host: 127.0.0.1\n  port: 9000\n",
        )
        .unwrap();

        let sample: Sample = load_settings(&dir).unwrap();
        assert_eq!(sample.server.host, "127.0.0.1");
        assert_eq!(sample.server.port, 9000);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_base_file_is_config_error() {
        let dir = std::env::temp_dir().join(format!("service-core-missing-{}", uuid::Uuid::new_v4()));
        let result: Result<Sample, AppError> = load_settings(&dir);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
