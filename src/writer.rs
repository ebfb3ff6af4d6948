use crate::config::SERVER_TEMPLATE;
use crate::error::{MirrorError, Result};
use crate::types::ProbeResult;
use crate::utils::{self, format_throughput, join_url};
use chrono::{DateTime, Local};
use std::path::Path;
use tokio::fs;

pub struct Metadata {
    pub generated_at: DateTime<Local>,
    pub top_n: usize,
}

/// 生成 mirrorlist 文本
pub fn render(selection: &[ProbeResult], meta: &Metadata) -> String {
    let mut out = String::new();
    out.push_str("##\n");
    out.push_str(&format!(
        "## Arch Linux mirrorlist generated by {} {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str(&format!(
        "## Generated on {}\n",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S %z")
    ));
    out.push_str(&format!(
        "## {} of {} requested mirrors, fastest first\n",
        selection.len(),
        meta.top_n
    ));
    out.push_str("##\n");

    for (i, r) in selection.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "## {}. {} | {}/{} | {}\n",
            i + 1,
            r.region,
            r.transport,
            r.family,
            format_throughput(r.throughput)
        ));
        out.push_str(&format!("Server = {}\n", join_url(&r.endpoint, SERVER_TEMPLATE)));
    }
    out
}

/// 写入新的 mirrorlist
/// 1. 若目标文件已存在, 先备份 (备份失败则不写入)
/// 2. 写入新内容
pub async fn write(
    selection: &[ProbeResult],
    target: &Path,
    backup: &Path,
    meta: &Metadata,
) -> Result<()> {
    utils::backup_file(target, backup).await?;

    let content = render(selection, meta);
    fs::write(target, content)
        .await
        .map_err(|source| MirrorError::Write {
            path: target.to_path_buf(),
            source,
        })?;
    tracing::info!("Wrote {} mirrors to {:?}", selection.len(), target);
    Ok(())
}
