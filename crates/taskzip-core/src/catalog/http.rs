//! Blocking JSON GET over libcurl.

use std::time::Duration;

use super::parse;
use super::CatalogError;

/// Connection settings shared by every catalog request.
#[derive(Debug, Clone)]
pub(super) struct HttpSettings {
    pub token: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

/// Performs an authenticated GET and returns the body of a 2xx response.
///
/// Non-2xx responses become [`CatalogError::Status`] with the API's error text.
/// Runs in the current thread.
pub(super) fn get_json_body(url: &str, settings: &HttpSettings) -> Result<Vec<u8>, CatalogError> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(5)?;
    easy.connect_timeout(settings.connect_timeout)?;
    easy.timeout(settings.request_timeout)?;
    easy.accept_encoding("")?;

    let mut list = curl::easy::List::new();
    list.append(&format!("Authorization: Bearer {}", settings.token.trim()))?;
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

    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        let message = parse::error_message(&body)
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().chars().take(200).collect());
        return Err(CatalogError::Status { status, message });
    }
    Ok(body)
}
