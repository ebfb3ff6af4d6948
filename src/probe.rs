use crate::error::{MirrorError, Result};
use crate::traits::SpeedProbe;
use crate::types::{AddressFamily, ProbeResult, TransportKind};
use crate::utils::join_url;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// 根据 URL 判断协议与地址族
/// IPv6 仅识别方括号字面量, 例如 http://[2001:db8::1]/
pub fn classify(endpoint: &str) -> (TransportKind, AddressFamily) {
    let (scheme, rest) = endpoint.split_once("://").unwrap_or(("", endpoint));

    let transport = match scheme.to_ascii_lowercase().as_str() {
        "https" => TransportKind::Https,
        "http" => TransportKind::Http,
        _ => TransportKind::Unknown,
    };

    let host = rest.split('/').next().unwrap_or_default();
    let is_v6 = host
        .strip_prefix('[')
        .and_then(|h| h.split_once(']'))
        .is_some_and(|(literal, _)| literal.contains(':'));
    let family = if is_v6 {
        AddressFamily::IPv6
    } else {
        AddressFamily::IPv4
    };

    (transport, family)
}

/// bytes/second, fractional part discarded
pub fn throughput(bytes: u64, elapsed: Duration) -> u64 {
    if bytes == 0 {
        return 0;
    }
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    (bytes as f64 / secs) as u64
}

/// 通过 HTTP 下载一个小文件 (默认 core.db) 测量下载速度
pub struct HttpSpeedProbe {
    client: Client,
    probe_path: String,
}

impl HttpSpeedProbe {
    pub fn new(probe_path: &str, timeout: Duration) -> Result<Self> {
        // 强制设置超时, 防止慢源阻塞整个流程
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MirrorError::Custom(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            probe_path: probe_path.to_string(),
        })
    }

    async fn measure(&self, url: &str) -> std::result::Result<u64, reqwest::Error> {
        let start = Instant::now();
        let mut resp = self.client.get(url).send().await?.error_for_status()?;

        // 只统计字节数, 内容直接丢弃
        let mut bytes = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            bytes += chunk.len() as u64;
        }

        Ok(throughput(bytes, start.elapsed()))
    }
}

#[async_trait]
impl SpeedProbe for HttpSpeedProbe {
    async fn probe(&self, endpoint: &str, region: &str) -> ProbeResult {
        let target = join_url(endpoint, &self.probe_path);
        let mut result = ProbeResult::failed(endpoint, region);

        match self.measure(&target).await {
            Ok(rate) => result.throughput = rate,
            Err(e) => tracing::debug!("Probe of {} failed: {}", target, e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn classifies_transport_and_family() {
        assert_eq!(
            classify("https://mirror.example.org/arch/"),
            (TransportKind::Https, AddressFamily::IPv4)
        );
        assert_eq!(
            classify("http://10.0.0.1/arch/"),
            (TransportKind::Http, AddressFamily::IPv4)
        );
        assert_eq!(
            classify("http://[2001:db8::1]/arch/"),
            (TransportKind::Http, AddressFamily::IPv6)
        );
        assert_eq!(
            classify("HTTPS://[::1]:8080/"),
            (TransportKind::Https, AddressFamily::IPv6)
        );
        assert_eq!(
            classify("rsync://mirror.example.org/arch/"),
            (TransportKind::Unknown, AddressFamily::IPv4)
        );
        assert_eq!(
            classify("mirror.example.org/arch/"),
            (TransportKind::Unknown, AddressFamily::IPv4)
        );
    }

    #[test]
    fn throughput_truncates() {
        assert_eq!(throughput(1500, Duration::from_secs(1)), 1500);
        assert_eq!(throughput(10, Duration::from_secs(4)), 2);
        // 0.33 B/s is reported as a failure
        assert_eq!(throughput(1, Duration::from_secs(3)), 0);
        assert_eq!(throughput(0, Duration::from_millis(5)), 0);
    }

    #[tokio::test]
    async fn measures_successful_download() {
        let base = test_support::serve("200 OK", vec![7u8; 64 * 1024]).await;
        let probe = HttpSpeedProbe::new("core/os/x86_64/core.db", Duration::from_secs(3)).unwrap();

        let result = probe.probe(&base, "Local").await;
        assert!(result.throughput > 0);
        assert_eq!(result.endpoint, base);
        assert_eq!(result.region, "Local");
        assert_eq!(result.transport, TransportKind::Http);
        assert_eq!(result.family, AddressFamily::IPv4);
    }

    #[tokio::test]
    async fn http_error_status_is_zero() {
        let base = test_support::serve("404 Not Found", b"missing".to_vec()).await;
        let probe = HttpSpeedProbe::new("core.db", Duration::from_secs(3)).unwrap();
        assert_eq!(probe.probe(&base, "Local").await.throughput, 0);
    }

    #[tokio::test]
    async fn refused_connection_is_zero() {
        let base = test_support::refused().await;
        let probe = HttpSpeedProbe::new("core.db", Duration::from_secs(3)).unwrap();
        assert_eq!(probe.probe(&base, "Local").await.throughput, 0);
    }

    #[tokio::test]
    async fn hung_server_times_out() {
        let base = test_support::serve_hung().await;
        let probe = HttpSpeedProbe::new("core.db", Duration::from_millis(300)).unwrap();

        let start = Instant::now();
        let result = probe.probe(&base, "Local").await;
        assert_eq!(result.throughput, 0);
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
