use std::fmt;

use crate::Error;

/// An opaque secret, such as a password.
///
/// The contents can't be changed once captured and are never printed.
pub struct Secret(Box<str>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().into_boxed_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

/// The credentials to use when authenticating against the server.
#[derive(Debug)]
pub struct Credentials {
    identity: String,
    secret: Secret,
}

impl Credentials {
    /// Creates a set of credentials, checking that the identity looks like an
    /// email address and that the secret isn't empty.
    pub fn new(identity: impl Into<String>, secret: Secret) -> Result<Self, Error> {
        let identity = identity.into();
        validate_identity(&identity)?;

        if secret.is_empty() {
            return Err(Error::InputValidation("password is empty".to_string()));
        }

        Ok(Self { identity, secret })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub(crate) fn secret(&self) -> &Secret {
        &self.secret
    }
}

/// Checks that the identity is plausibly an SMTP address.
///
/// This is deliberately loose: only the presence of an "@" and a "." is
/// required.
pub fn validate_identity(identity: &str) -> Result<(), Error> {
    if identity.contains('@') && identity.contains('.') {
        Ok(())
    } else {
        Err(Error::InputValidation(format!(
            "email address {identity} is not a valid SMTP address"
        )))
    }
}

/// An entity which can supply the credentials for a session, usually by
/// asking the user.
pub trait CredentialProvider {
    fn acquire_credentials(&mut self) -> Result<Credentials, Error>;
}
