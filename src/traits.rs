use crate::error::Result;
use crate::types::ProbeResult;
use async_trait::async_trait;

/// MirrorListFetcher: 获取镜像目录原文
#[async_trait]
pub trait DirectoryFetcher: Sync + Send {
    /// 单次请求, 不重试
    /// 传输失败或返回空内容时返回 MirrorError::Fetch
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// SpeedProbe: 对单个镜像进行一次限时下载测速
#[async_trait]
pub trait SpeedProbe: Sync + Send {
    /// 永不返回错误, 所有失败都归为 throughput = 0
    async fn probe(&self, endpoint: &str, region: &str) -> ProbeResult;
}

/// Yes/no confirmation before the live mirrorlist is overwritten.
pub trait Prompter: Sync + Send {
    fn confirm(&self, prompt: &str) -> bool;
}
