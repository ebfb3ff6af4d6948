use crate::error::{MirrorError, Result};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Append `suffix` to a mirror base URL, adding the separating slash if missing.
pub fn join_url(base: &str, suffix: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, suffix.trim_start_matches('/'))
    } else {
        format!("{}/{}", base, suffix.trim_start_matches('/'))
    }
}

/// 速度格式化: 0 -> "Failed", 其余按 B/s, KB/s, MB/s 显示
pub fn format_throughput(bytes_per_sec: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    match bytes_per_sec {
        0 => "Failed".to_string(),
        n if n < KB => format!("{} B/s", n),
        n if n < MB => format!("{:.2} KB/s", n as f64 / KB as f64),
        n => format!("{:.2} MB/s", n as f64 / MB as f64),
    }
}

/// 备份文件 (如果存在), 覆盖旧备份
/// Returns whether a backup was made.
pub async fn backup_file(path: &Path, backup_path: &Path) -> Result<bool> {
    let exists = fs::try_exists(path)
        .await
        .map_err(|source| MirrorError::Backup {
            path: path.to_path_buf(),
            source,
        })?;
    if !exists {
        return Ok(false);
    }

    fs::copy(path, backup_path)
        .await
        .map_err(|source| MirrorError::Backup {
            path: backup_path.to_path_buf(),
            source,
        })?;
    tracing::info!("Backup created at: {:?}", backup_path);
    Ok(true)
}

/// 从备份恢复
pub async fn restore_backup(path: &Path, backup_path: &Path) -> Result<()> {
    if !fs::try_exists(backup_path).await.unwrap_or(false) {
        return Err(MirrorError::Custom(format!(
            "No backup found at {:?}",
            backup_path
        )));
    }

    tracing::info!("Restoring from backup: {:?}", backup_path);
    fs::copy(backup_path, path)
        .await
        .map_err(|source| MirrorError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(())
}

/// 检查是否有权限写入目标文件
/// 文件存在时尝试以追加方式打开, 否则在所在目录创建并删除一个临时文件
pub async fn check_write_access(path: &Path) -> Result<()> {
    let denied = |e: std::io::Error| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            MirrorError::PermissionDenied(path.to_path_buf())
        } else {
            e.into()
        }
    };

    if fs::try_exists(path).await? {
        fs::OpenOptions::new()
            .append(true)
            .open(path)
            .await
            .map_err(denied)?;
        return Ok(());
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let scratch = parent.join(format!(".mirrorrank-{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&scratch)
        .await
        .map_err(denied)?;
    fs::remove_file(&scratch).await?;
    Ok(())
}

/// 执行同步命令 (例如 pacman -Syy), 失败只记录日志
pub async fn run_sync_command(command: &[String]) {
    let Some((program, args)) = command.split_first() else {
        return;
    };

    tracing::info!("Running {}", command.join(" "));
    match Command::new(program).args(args).status().await {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!("'{}' exited with {}", command.join(" "), status),
        Err(e) => tracing::warn!("Failed to run '{}': {}", command.join(" "), e),
    }
}
