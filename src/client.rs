use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;
use crate::models::{Metric, Snapshot};

pub static DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php?action=query&format=json&meta=siteinfo&siprop=statistics&origin=*";

static USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (terminal statistics dashboard)"
);

#[derive(Deserialize)]
struct SiteInfo {
    query: Query,
}

#[derive(Deserialize)]
struct Query {
    statistics: Statistics,
}

#[derive(Deserialize)]
struct Statistics {
    articles: Option<i64>,
    edits: Option<i64>,
    images: Option<i64>,
    users: Option<i64>,
    activeusers: Option<i64>,
    admins: Option<i64>,
}

impl From<Statistics> for Snapshot {
    fn from(stats: Statistics) -> Self {
        [
            (Metric::Articles, stats.articles),
            (Metric::Edits, stats.edits),
            (Metric::Images, stats.images),
            (Metric::Users, stats.users),
            (Metric::ActiveUsers, stats.activeusers),
            (Metric::Admins, stats.admins),
        ]
        .into_iter()
        .filter_map(|(metric, value)| Some((metric, value?)))
        .collect()
    }
}

pub fn parse_snapshot(body: &[u8]) -> Result<Snapshot> {
    let info = serde_json::from_slice::<SiteInfo>(body)?;

    Ok(info.query.statistics.into())
}

#[derive(Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl StatsClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub async fn fetch(&self) -> Result<Snapshot> {
        let body = self
            .http
            .get(self.endpoint.as_str())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        parse_snapshot(body.as_ref())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub static STATS_BODY: &str =
        r#"{"query":{"statistics":{"articles":6812345,"edits":1234567890,"admins":845}}}"#;

    /// Answers every connection with the given status line and JSON body.
    /// Returns the endpoint URL.
    pub async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/w/api.php", addr)
    }

    fn client(endpoint: String) -> StatsClient {
        StatsClient::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_reads_snapshot_from_server() {
        let endpoint = serve("200 OK", STATS_BODY).await;
        let snapshot = client(endpoint).fetch().await.unwrap();

        assert_eq!(snapshot.get(Metric::Articles), Some(6812345));
        assert_eq!(snapshot.get(Metric::Admins), Some(845));
        assert_eq!(snapshot.get(Metric::Users), None);
    }

    #[tokio::test]
    async fn server_error_is_a_fetch_failure() {
        let endpoint = serve("500 Internal Server Error", STATS_BODY).await;
        let result = client(endpoint).fetch().await;

        assert!(matches!(result, Err(crate::error::Error::Http(_))));
    }

    #[tokio::test]
    async fn non_json_body_is_a_fetch_failure() {
        let endpoint = serve("200 OK", "<html>maintenance</html>").await;
        let result = client(endpoint).fetch().await;

        assert!(matches!(result, Err(crate::error::Error::Json(_))));
    }

    #[test]
    fn parses_statistics_and_ignores_extra_fields() {
        let body = br#"{
            "batchcomplete": "",
            "query": {
                "statistics": {
                    "pages": 61234567,
                    "articles": 6812345,
                    "edits": 1234567890,
                    "images": 912345,
                    "users": 48123456,
                    "activeusers": 121234,
                    "admins": 845,
                    "jobs": 0
                }
            }
        }"#;

        let snapshot = parse_snapshot(body).unwrap();

        assert_eq!(snapshot.get(Metric::Articles), Some(6812345));
        assert_eq!(snapshot.get(Metric::Edits), Some(1234567890));
        assert_eq!(snapshot.get(Metric::Images), Some(912345));
        assert_eq!(snapshot.get(Metric::Users), Some(48123456));
        assert_eq!(snapshot.get(Metric::ActiveUsers), Some(121234));
        assert_eq!(snapshot.get(Metric::Admins), Some(845));
    }

    #[test]
    fn missing_field_is_absent() {
        let body = br#"{"query":{"statistics":{"articles":10,"edits":20}}}"#;
        let snapshot = parse_snapshot(body).unwrap();

        assert_eq!(snapshot.get(Metric::Articles), Some(10));
        assert_eq!(snapshot.get(Metric::Admins), None);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_snapshot(b"<html>rate limited</html>").is_err());
        assert!(parse_snapshot(br#"{"error":{"code":"internal"}}"#).is_err());
    }
}
