use reqwest::StatusCode;
use thiserror::Error;

use crate::types::ResponseScope;

/// Errors which may occur while performing an EWS operation.
#[derive(Debug, Error)]
pub enum Error {
    /// User-provided input was rejected before any request was made.
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server reported a failure through a `ResponseCode` element.
    #[error("{scope} error: {code}")]
    Protocol { scope: ResponseScope, code: String },

    /// The response was free of errors but lacked an expected field.
    #[error("unable to extract result from response: {0}")]
    Extraction(String),

    #[error("failed to write request as XML")]
    Serialize(#[from] xml::writer::Error),
}

/// Failures in getting a parsed response back from the server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(StatusCode),

    #[error("refusing to send credentials to non-HTTPS endpoint {0}")]
    InsecureEndpoint(String),

    #[error("response is not a well-formed XML document: {0}")]
    Parse(#[from] xml::reader::Error),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        TransportError::Http(value).into()
    }
}

impl From<xml::reader::Error> for Error {
    fn from(value: xml::reader::Error) -> Self {
        TransportError::Parse(value).into()
    }
}
