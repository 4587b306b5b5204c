// Fetching raw documents.

use std::fs;
use std::time::Duration;

use log::debug;
use snafu::{prelude::*, Snafu};

const USER_AGENT: &str = concat!("volby-results/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("request to {url} failed: {source}"))]
    Request { url: String, source: reqwest::Error },
    #[snafu(display("{url} answered with status {status}"))]
    Status { url: String, status: u16 },
    #[snafu(display("cannot read {path}: {source}"))]
    LocalFile {
        path: String,
        source: std::io::Error,
    },
}

/// Something that can fetch the full content behind a URL.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Blocking HTTP transport. `file://` URLs are read from the local disk, which
/// allows running against a registry that was downloaded beforehand.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<HttpTransport, reqwest::Error> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(HttpTransport {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        if let Some(path) = url.strip_prefix("file://") {
            debug!("get: reading local file {:?}", path);
            return fs::read(path).context(LocalFileSnafu { path });
        }

        let response = self.client.get(url).send().context(RequestSnafu { url })?;
        let status = response.status();
        ensure!(
            status.is_success(),
            StatusSnafu {
                url,
                status: status.as_u16()
            }
        );
        let body = response.bytes().context(RequestSnafu { url })?;
        debug!("get: {} -> {} bytes", url, body.len());
        Ok(body.to_vec())
    }
}
