use std::{
    io::{
        BufWriter,
        Write,
    },
    path::Path,
    time::Duration,
};

use reqwest::{
    blocking::{
        Client,
        RequestBuilder,
        Response,
    },
    StatusCode,
};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::core::WaniAnkiError;

const MAX_ATTEMPTS: usize = 3;

pub fn http_client() -> Result<Client, WaniAnkiError> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .user_agent(concat!("wanianki/", env!("CARGO_PKG_VERSION"), " (+reqwest)"))
        .build()
        .map_err(|e| WaniAnkiError::Custom(format!("HTTP client build failed: {e}")))
}

/// Sends the request built by `build`, retrying transport failures with a
/// linear backoff. HTTP error statuses are returned to the caller untouched.
pub fn send_with_retry<F>(build: F) -> Result<Response, WaniAnkiError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempts: usize = 0;
    loop {
        attempts += 1;
        match build().send() {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                if attempts < MAX_ATTEMPTS {
                    warn!("Request failed (attempt {attempts} of {MAX_ATTEMPTS}): {e}");
                    std::thread::sleep(backoff(attempts));
                    continue;
                }
                return Err(e.into());
            }
        }
    }
}

/// Streams `url` into `path`. The body lands in a temp file next to `path`
/// first so an interrupted download never leaves a truncated file behind.
pub fn download_to_file(client: &Client, url: &str, path: &Path) -> Result<(), WaniAnkiError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut attempts: usize = 0;
    loop {
        attempts += 1;

        let mut resp = send_with_retry(|| client.get(url))?;
        ensure_success(&resp)?;

        let tmp = NamedTempFile::new_in(parent)?;
        let mut writer = BufWriter::new(tmp);

        match resp.copy_to(&mut writer) {
            Ok(n) if n > 0 => {
                writer.flush()?;
                let tmp = writer.into_inner().map_err(|e| e.into_error())?;
                tmp.persist(path)?;
                return Ok(());
            }
            Ok(_) | Err(_) => {
                if attempts < MAX_ATTEMPTS {
                    std::thread::sleep(backoff(attempts));
                    continue;
                }
                return Err(WaniAnkiError::Custom(format!(
                    "Failed to copy response body from {url} to {}",
                    path.display()
                )));
            }
        }
    }
}

pub fn ensure_success(resp: &Response) -> Result<(), WaniAnkiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }

    Err(match status {
        StatusCode::UNAUTHORIZED => WaniAnkiError::Authentication,
        StatusCode::FORBIDDEN => WaniAnkiError::Forbidden(resp.url().to_string()),
        _ => WaniAnkiError::Http { status: status.as_u16(), url: resp.url().to_string() },
    })
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_secs(2 * attempt as u64)
}
