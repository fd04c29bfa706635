//! Fetching remote tiles and verifying checksums
//!
//! Sources are URL templates with a `{year}` placeholder. `http`/`https`
//! sources go through a blocking client with bounded retries; anything else
//! is treated as a local filesystem template and copied, which is how test
//! fixtures and air-gapped mirrors feed the datasets.

use crate::error::{DatasetError, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

/// Fetch `source` into `dest`, creating parent directories as needed.
pub fn fetch(source: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_http(source, dest)
    } else {
        debug!(source, dest = %dest.display(), "copying local tile");
        fs::copy(source, dest)?;
        Ok(())
    }
}

fn fetch_http(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    info!(url, dest = %dest.display(), "downloading tile");
    let resp = get_with_retry(&client, url)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DatasetError::DownloadFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes()?;
    fs::write(dest, &bytes)?;
    Ok(())
}

/// GET with exponential backoff on timeout/connect errors.
fn get_with_retry(
    client: &reqwest::blocking::Client,
    url: &str,
) -> std::result::Result<reqwest::blocking::Response, reqwest::Error> {
    let mut last_err = None;

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            let backoff_ms = 100u64 * 2u64.pow(attempt - 1);
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }

        match client.get(url).send() {
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = Some(e);
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    // The loop body ran at least once, so an error was recorded.
    Err(last_err.expect("retry loop exited without recording an error"))
}

/// SHA-256 digest of a file, as a lowercase hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Verify a file against an expected SHA-256 hex digest.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if actual != expected.to_ascii_lowercase() {
        return Err(DatasetError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
