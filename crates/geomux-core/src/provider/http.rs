//! Minimal blocking HTTP GET used by the network adapters.

use std::time::Duration;

use super::ProviderError;

const USER_AGENT: &str = concat!("geomux/", env!("CARGO_PKG_VERSION"));

/// Response of a GET: status code and raw body.
pub(super) struct HttpResponse {
    pub code: u32,
    pub body: Vec<u8>,
}

/// Performs a GET request and collects the body.
///
/// Follows redirects. Runs in the current thread.
pub(super) fn get(url: &str, timeout: Duration) -> Result<HttpResponse, ProviderError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.useragent(USER_AGENT)?;
    easy.connect_timeout(Duration::from_secs(10))?;
    easy.timeout(timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    Ok(HttpResponse { code, body })
}
