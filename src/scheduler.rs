use crate::traits::SpeedProbe;
use crate::types::{Endpoint, ProbeResult, Region};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// 并发测速调度器
///
/// 逻辑:
/// 1. 每个镜像生成一个 tokio 任务, 通过 Semaphore 限制同时运行的数量
/// 2. 每个任务有独立的超时, 超时视为失败 (throughput = 0)
/// 3. 按提交顺序 join 所有任务, 结果与输入一一对应
pub struct ProbeScheduler {
    probe: Arc<dyn SpeedProbe>,
    progress: ProgressBar,
}

impl ProbeScheduler {
    pub fn new(probe: Arc<dyn SpeedProbe>) -> Self {
        Self {
            probe,
            progress: ProgressBar::hidden(),
        }
    }

    /// Show an indicatif bar while probing.
    pub fn with_progress(mut self) -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("|| "),
        );
        self.progress = pb;
        self
    }

    pub async fn run(
        &self,
        endpoints: Vec<(Endpoint, Region)>,
        concurrency_limit: usize,
        timeout: Duration,
    ) -> Vec<ProbeResult> {
        let permits = concurrency_limit.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));

        self.progress.set_length(endpoints.len() as u64);
        self.progress.set_message("Probing...");

        let handles: Vec<_> = endpoints
            .iter()
            .cloned()
            .map(|(endpoint, region)| {
                let probe = Arc::clone(&self.probe);
                let semaphore = Arc::clone(&semaphore);
                let pb = self.progress.clone();

                tokio::spawn(async move {
                    // 信号量不会被关闭, acquire 失败时直接按失败处理
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => {
                            match tokio::time::timeout(timeout, probe.probe(&endpoint, &region))
                                .await
                            {
                                Ok(result) => result,
                                Err(_) => {
                                    tracing::debug!("Probe of {} timed out", endpoint);
                                    ProbeResult::failed(&endpoint, &region)
                                }
                            }
                        }
                        Err(_) => ProbeResult::failed(&endpoint, &region),
                    };
                    pb.inc(1);
                    result
                })
            })
            .collect();

        let joined = join_all(handles).await;
        self.progress.finish_with_message("Probing completed.");

        // 任务 panic 时也要保证每个输入都有一个结果
        joined
            .into_iter()
            .zip(endpoints)
            .map(|(res, (endpoint, region))| match res {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("Probe task for {} failed: {}", endpoint, e);
                    ProbeResult::failed(&endpoint, &region)
                }
            })
            .collect()
    }
}
