use std::io::{BufRead, Write};

use ews::{
    credentials::{validate_identity, CredentialProvider, Credentials, Secret},
    Error,
};

/// Asks the user for their credentials on the console. The password is read
/// without echoing it.
pub struct ConsolePrompt {
    username: Option<String>,
}

impl ConsolePrompt {
    /// Creates a prompt, which only asks for the address if `username` isn't
    /// already known.
    pub fn new(username: Option<String>) -> Self {
        Self { username }
    }
}

impl CredentialProvider for ConsolePrompt {
    fn acquire_credentials(&mut self) -> Result<Credentials, Error> {
        let address = match self.username.take() {
            Some(username) => username,
            None => read_address().map_err(console_error)?,
        };

        // No point asking for a password for an address we'll reject anyway.
        validate_identity(&address)?;

        let password = rpassword::prompt_password("Enter password: ").map_err(console_error)?;

        Credentials::new(address, Secret::new(password))
    }
}

fn read_address() -> std::io::Result<String> {
    print!("Enter an email address: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    // Trim the final newline, which would otherwise end up in the
    // Authorization header.
    Ok(line.trim().to_string())
}

fn console_error(err: std::io::Error) -> Error {
    Error::InputValidation(format!("unable to read from console: {err}"))
}
