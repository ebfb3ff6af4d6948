use crate::config::Settings;
use crate::error::{MirrorError, Result};
use crate::parser;
use crate::ranker::{self, Ranking};
use crate::scheduler::ProbeScheduler;
use crate::traits::{DirectoryFetcher, Prompter};
use crate::types::ProbeResult;
use crate::utils;
use crate::writer::{self, Metadata};
use chrono::Local;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Written { count: usize },
    Declined,
}

/// Fetcher -> Parser -> ProbeScheduler -> Ranker -> 确认 -> Writer -> 同步
pub struct Pipeline<'a> {
    pub settings: &'a Settings,
    pub fetcher: &'a dyn DirectoryFetcher,
    pub scheduler: &'a ProbeScheduler,
    pub prompter: &'a dyn Prompter,
}

impl Pipeline<'_> {
    /// 下载目录, 测速并排序, 不写入任何文件
    pub async fn survey(&self) -> Result<(Vec<ProbeResult>, Ranking)> {
        let s = self.settings;
        tracing::info!("Fetching mirror directory from {}", s.source_url);
        let document = self.fetcher.fetch(&s.source_url).await?;

        let directory = parser::parse(&document)?;
        tracing::info!(
            "Found {} mirrors in {} regions",
            directory.len(),
            directory.region_count()
        );
        for (endpoint, region) in directory.entries() {
            tracing::debug!("  {:<20} {}", region, endpoint);
        }

        tracing::debug!(
            "Probing with concurrency {}, timeout {}s, retries {}",
            s.concurrency,
            s.timeout_secs,
            s.retries
        );
        let results = self
            .scheduler
            .run(directory.into_entries(), s.concurrency, s.timeout())
            .await;

        let ranking = ranker::rank(results.clone(), s.top_n);
        if let Some(shortfall) = ranking.shortfall {
            tracing::warn!("Insufficient mirrors: {}", shortfall);
        }
        Ok((results, ranking))
    }

    /// 完整流程: 测速, 确认, 备份并写入, 然后同步软件包数据库
    pub async fn run(&self, sync: bool) -> Result<Outcome> {
        let (_, ranking) = self.survey().await?;
        if ranking.selection.is_empty() {
            return Err(MirrorError::NoUsableMirrors);
        }

        for (i, r) in ranking.selection.iter().enumerate() {
            tracing::info!(
                "{:>2}. {:<12} {:<20} {}",
                i + 1,
                utils::format_throughput(r.throughput),
                r.region,
                r.endpoint
            );
        }

        let s = self.settings;
        let prompt = format!(
            "Write {} mirrors to {}?",
            ranking.selection.len(),
            s.output_path.display()
        );
        if !self.prompter.confirm(&prompt) {
            tracing::info!("Aborted, {:?} left unchanged", s.output_path);
            return Ok(Outcome::Declined);
        }

        let meta = Metadata {
            generated_at: Local::now(),
            top_n: s.top_n,
        };
        writer::write(&ranking.selection, &s.output_path, &s.backup_path, &meta).await?;

        if sync {
            utils::run_sync_command(&s.sync_command).await;
        }

        Ok(Outcome::Written {
            count: ranking.selection.len(),
        })
    }
}
