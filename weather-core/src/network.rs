use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tokio::net::TcpStream;

/// Answers "is there a network path to the weather service right now?".
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Opens (and drops) a TCP connection to the weather host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self { host: host.into(), port, timeout }
    }

    /// Probe the host and port of `url` (port from the scheme when absent).
    pub fn for_url(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let parsed = Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL '{url}' has no host"))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| anyhow::anyhow!("URL '{url}' has no port"))?;

        Ok(Self::new(host, port, timeout))
    }
}

#[async_trait]
impl Connectivity for TcpProbe {
    async fn is_online(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %self.host, port = self.port, error = %e, "connectivity probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(host = %self.host, port = self.port, "connectivity probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_from_scheme() {
        let probe = TcpProbe::for_url("https://api.openweathermap.org/data/2.5", Duration::from_secs(1))
            .expect("valid url");
        assert_eq!(probe.host, "api.openweathermap.org");
        assert_eq!(probe.port, 443);

        let probe = TcpProbe::for_url("http://127.0.0.1:8080", Duration::from_secs(1))
            .expect("valid url");
        assert_eq!(probe.port, 8080);

        assert!(TcpProbe::for_url("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn online_when_listener_accepts() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(probe.is_online().await);
    }

    #[tokio::test]
    async fn offline_when_nothing_listens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(!probe.is_online().await);
    }
}
