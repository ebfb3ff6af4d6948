use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Region label used for servers declared before any `## <region>` header.
pub const UNKNOWN_REGION: &str = "Unknown";

/// 镜像站点的根地址, 例如 "https://mirror.example.org/archlinux/"
pub type Endpoint = String;

/// 地区标签, 例如 "Sweden"
pub type Region = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    Http,
    Https,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    IPv4,
    IPv6,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportKind::Http => "HTTP",
            TransportKind::Https => "HTTPS",
            TransportKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AddressFamily::IPv4 => "IPv4",
            AddressFamily::IPv6 => "IPv6",
        };
        f.write_str(s)
    }
}

/// 测速结果, 每个镜像只生成一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub region: Region,
    /// 字节/秒, 0 表示失败或超时
    pub throughput: u64,
    pub transport: TransportKind,
    pub family: AddressFamily,
}

impl ProbeResult {
    pub fn failed(endpoint: &str, region: &str) -> Self {
        let (transport, family) = crate::probe::classify(endpoint);
        Self {
            endpoint: endpoint.to_string(),
            region: region.to_string(),
            throughput: 0,
            transport,
            family,
        }
    }
}

/// Endpoints in discovery order, each with its region.
///
/// A server listed twice keeps its first position but takes the region of
/// the last declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorDirectory {
    entries: Vec<(Endpoint, Region)>,
    index: HashMap<Endpoint, usize>,
}

impl MirrorDirectory {
    pub fn insert(&mut self, endpoint: Endpoint, region: Region) {
        match self.index.get(&endpoint) {
            Some(&i) => self.entries[i].1 = region,
            None => {
                self.index.insert(endpoint.clone(), self.entries.len());
                self.entries.push((endpoint, region));
            }
        }
    }

    #[cfg(test)]
    pub fn region_of(&self, endpoint: &str) -> Option<&str> {
        self.index
            .get(endpoint)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn entries(&self) -> &[(Endpoint, Region)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(Endpoint, Region)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn region_count(&self) -> usize {
        let mut regions: Vec<&str> = self.entries.iter().map(|(_, r)| r.as_str()).collect();
        regions.sort_unstable();
        regions.dedup();
        regions.len()
    }
}
