use crate::error::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const DEFAULT_SOURCE_URL: &str = "https://archlinux.org/mirrorlist/all/";
/// Suffix pacman expands for every `Server =` line.
pub const SERVER_TEMPLATE: &str = "$repo/os/$arch";

/// 运行参数
/// 优先级: 命令行 > 配置文件 > 内置默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_url: String,
    /// Appended to each endpoint to build the probe target.
    pub probe_path: String,
    pub output_path: PathBuf,
    pub backup_path: PathBuf,
    pub top_n: usize,
    /// 单个镜像测速的超时时间 (秒)
    pub timeout_secs: u64,
    pub concurrency: usize,
    /// Reserved. Probes and the directory fetch are single attempt.
    pub retries: u32,
    pub fetch_timeout_secs: u64,
    /// Command run after a successful write, e.g. ["pacman", "-Syy"].
    pub sync_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            probe_path: "core/os/x86_64/core.db".to_string(),
            output_path: PathBuf::from("/etc/pacman.d/mirrorlist"),
            backup_path: PathBuf::from("/etc/pacman.d/mirrorlist.backup"),
            top_n: 10,
            timeout_secs: 3,
            concurrency: 16,
            retries: 1,
            fetch_timeout_secs: 15,
            sync_command: vec!["pacman".to_string(), "-Syy".to_string()],
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the user config dir
    /// (~/.config/mirrorrank/config.toml) when no path is given.
    /// A missing default file is not an error.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if fs::try_exists(&p).await.unwrap_or(false) => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path).await?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mirrorrank").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() -> Result<()> {
        let settings = Settings::from_toml(
            r#"
top_n = 5
timeout_secs = 7
output_path = "/tmp/mirrorlist"
"#,
        )?;
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.timeout(), Duration::from_secs(7));
        assert_eq!(settings.output_path, PathBuf::from("/tmp/mirrorlist"));
        assert_eq!(settings.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(settings.concurrency, 16);
        assert_eq!(settings.retries, 1);
        Ok(())
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Settings::from_toml("top_n = \"ten\"").is_err());
    }

    #[tokio::test]
    async fn load_explicit_path() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "concurrency = 4\nsync_command = [\"true\"]\n").await?;

        let settings = Settings::load(Some(&path)).await?;
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.sync_command, vec!["true".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn load_missing_explicit_path_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(Settings::load(Some(&path)).await.is_err());
    }
}
