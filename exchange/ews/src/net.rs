use std::time::Duration;

use const_format::concatcp;
use reqwest::{blocking::Client, header::CONTENT_TYPE, redirect::Policy, Url};

use crate::{
    credentials::Credentials,
    error::TransportError,
    xml::{parse_envelope, Element},
    Error,
};

const OFFICE365_HOST: &str = "outlook.office365.com";

/// The Office365 EWS endpoint.
pub const DEFAULT_ENDPOINT: &str = concatcp!("https://", OFFICE365_HOST, "/EWS/Exchange.asmx");

const USER_AGENT: &str = concatcp!("ews/", env!("CARGO_PKG_VERSION"));

/// Something able to deliver a SOAP request and hand back the parsed response.
pub trait Transport {
    /// Sends the given envelope, authenticating with `credentials`.
    fn send(&self, credentials: &Credentials, body: &str) -> Result<Element, Error>;
}

/// Settings for [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct TransportConfig {
    pub endpoint: String,

    /// How long to wait for a whole request. `None` waits until the
    /// connection itself fails.
    pub timeout: Option<Duration>,

    /// Refuse any endpoint which isn't HTTPS.
    pub https_only: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            https_only: true,
        }
    }
}

/// Sends requests over HTTP(S) with Basic auth, one at a time, blocking
/// until the response has been read.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        let endpoint = Url::parse(&config.endpoint).map_err(|err| {
            Error::InputValidation(format!("invalid endpoint {}: {err}", config.endpoint))
        })?;

        if config.https_only && endpoint.scheme() != "https" {
            return Err(TransportError::InsecureEndpoint(endpoint.to_string()).into());
        }

        // Following a redirect would hand the credentials to whichever host
        // the server names, so redirects are reported as failures instead.
        let client = Client::builder()
            .redirect(Policy::none())
            .https_only(config.https_only)
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }
}

impl Transport for HttpTransport {
    fn send(&self, credentials: &Credentials, body: &str) -> Result<Element, Error> {
        log::debug!("posting {} byte request to {}", body.len(), self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(credentials.identity(), Some(credentials.secret().expose()))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body.to_owned())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            if let Some(location) = response.headers().get(reqwest::header::LOCATION) {
                log::warn!("not following redirect to {location:?}");
            }

            let detail = response.text().unwrap_or_default();
            if !detail.is_empty() {
                log::debug!("error response body: {detail}");
            }

            return Err(TransportError::Status(status).into());
        }

        let bytes = response.bytes()?;
        log::debug!("received {} byte response", bytes.len());

        Ok(parse_envelope(&bytes[..])?)
    }
}
