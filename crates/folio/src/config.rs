//! Configuration file (folio.toml).

use std::fs;
use std::path::Path;

use anyhow::Result;
use folio_highlight::Mode;
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_articles_dir")]
    pub dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            dir: default_articles_dir(),
            output: default_output(),
            title: default_title(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
    /// `development` or `production`; falls back to FOLIO_ENV
    pub mode: Option<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
            mode: None,
        }
    }
}

fn default_articles_dir() -> String {
    "content".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_title() -> String {
    "Blog".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_minify() -> bool {
    true
}

impl ConfigFile {
    /// Resolve the build mode: `--dev` wins, then the config file, then FOLIO_ENV.
    pub fn mode(&self, dev_flag: bool) -> Result<Mode> {
        if dev_flag {
            return Ok(Mode::Development);
        }
        match &self.build.mode {
            Some(mode) => mode
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid build.mode in config: {}", e)),
            None => Ok(Mode::from_env()),
        }
    }
}

/// Load configuration if the file exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load(&temp.path().join("folio.toml")).unwrap();

        assert_eq!(config.site.dir, "content");
        assert_eq!(config.site.output, "dist");
        assert!(config.build.minify);
    }

    #[test]
    fn reads_partial_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("folio.toml");
        fs::write(
            &path,
            "[site]\ntitle = \"Notes\"\n\n[build]\nminify = false\nmode = \"development\"\n",
        )
        .unwrap();

        let config = load(&path).unwrap();

        assert_eq!(config.site.title, "Notes");
        assert_eq!(config.site.base_url, "/");
        assert!(!config.build.minify);
        assert_eq!(config.mode(false).unwrap(), Mode::Development);
    }

    #[test]
    fn dev_flag_overrides_config() {
        let config = ConfigFile {
            build: BuildSettings {
                minify: true,
                mode: Some("production".to_string()),
            },
            ..Default::default()
        };

        assert_eq!(config.mode(true).unwrap(), Mode::Development);
        assert_eq!(config.mode(false).unwrap(), Mode::Production);
    }

    #[test]
    fn rejects_unknown_mode() {
        let config = ConfigFile {
            build: BuildSettings {
                minify: true,
                mode: Some("staging".to_string()),
            },
            ..Default::default()
        };

        assert!(config.mode(false).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("folio.toml");
        fs::write(&path, "[site\n").unwrap();

        assert!(load(&path).is_err());
    }
}
