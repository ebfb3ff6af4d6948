use crate::types::ProbeResult;
use std::fmt;

/// Fewer usable mirrors than requested. Not fatal; the selection is shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientMirrors {
    pub wanted: usize,
    pub found: usize,
}

impl fmt::Display for InsufficientMirrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "only {} of the requested {} mirrors responded",
            self.found, self.wanted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    /// 按速度从高到低, 全部 throughput > 0
    pub selection: Vec<ProbeResult>,
    pub shortfall: Option<InsufficientMirrors>,
}

/// 排序并选出前 top_n 个镜像
///
/// 稳定排序: 速度相同时保留发现顺序
/// 遇到第一个 throughput = 0 的结果即停止
pub fn rank(results: Vec<ProbeResult>, top_n: usize) -> Ranking {
    let mut sorted = results;
    sorted.sort_by(|a, b| b.throughput.cmp(&a.throughput));

    let selection: Vec<ProbeResult> = sorted
        .into_iter()
        .take_while(|r| r.throughput > 0)
        .take(top_n)
        .collect();

    let shortfall = (selection.len() < top_n).then_some(InsufficientMirrors {
        wanted: top_n,
        found: selection.len(),
    });

    Ranking {
        selection,
        shortfall,
    }
}
