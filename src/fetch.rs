//! Downloading transcript payloads.

use anyhow::Context;
use sha256::digest;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

/// Asks the transcript endpoint for the JSON rendition of `url`.
pub fn json_download_url(url: &str) -> String {
    if url.contains('?') {
        format!("{url}&format=json")
    } else {
        format!("{url}?format=json")
    }
}

/// Serves `url` from `cache_dir` when a previous download is there, and
/// otherwise runs `on_miss` and stores what it returns.
///
/// Entries are named after the sha256 of the URL.
pub async fn with_cache<F, FF>(cache_dir: &Path, url: &str, on_miss: F) -> anyhow::Result<String>
where
    F: FnOnce() -> FF,
    FF: Future<Output = anyhow::Result<String>>,
{
    let mut url_file = digest(url);
    url_file.push_str(".json");
    let url_file = cache_dir.join(url_file);

    if tokio::fs::try_exists(&url_file).await.unwrap_or(false) {
        info!("satisfied with cache hit at {}", url_file.display());
        return tokio::fs::read_to_string(&url_file)
            .await
            .with_context(|| format!("read cached payload from '{}'", url_file.display()));
    }

    debug!("cache miss for {}", url_file.display());
    let payload = on_miss().await.context("issue request on miss")?;
    tokio::fs::create_dir_all(cache_dir)
        .await
        .with_context(|| format!("create cache directory '{}'", cache_dir.display()))?;
    tokio::fs::write(&url_file, &payload)
        .await
        .with_context(|| format!("write payload cache to '{}'", url_file.display()))?;
    Ok(payload)
}

/// Downloads the payload behind a transcript URL.
///
/// The URL is expected to already carry whatever grants access to it (the
/// temporary download links handed out by the meeting service do).
pub async fn fetch_payload(
    client: &reqwest::Client,
    url: &str,
    cache_dir: Option<&Path>,
) -> anyhow::Result<String> {
    let url = json_download_url(url);
    let download = || async {
        info!("fetching transcript from {url}");
        let res = client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("issue transcript request")?;

        let status = res.status();
        anyhow::ensure!(
            status.is_success(),
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("<unknown status>")
        );

        res.text().await.context("read transcript body")
    };

    match cache_dir {
        Some(dir) => with_cache(dir, &url, download).await,
        None => download().await,
    }
}
