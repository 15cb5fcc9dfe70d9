use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use ews::{
    credentials::CredentialProvider,
    net::HttpTransport,
    operations::{get_folder_summary, send_message, OutgoingMessage},
    trace::{TeeTrace, Trace},
    Error,
};

mod config;
mod prompt;

use config::Config;
use prompt::ConsolePrompt;

/// Shows how to talk to Exchange Web Services: look up a folder's message
/// counts, or send a message.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, default_value = "ews.toml")]
    config: PathBuf,

    /// Where to write the session transcript, overriding the config file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the name and message counts of a well-known folder.
    Folder {
        #[arg(long, default_value = "inbox")]
        folder: String,
    },

    /// Send an HTML message, keeping a copy in Sent Items.
    Send {
        /// Address of the recipient
        #[arg(long)]
        to: String,

        #[arg(long, default_value = "Company Soccer Team")]
        subject: String,

        /// HTML body of the message
        #[arg(long, default_value = "Are you interested in joining?")]
        body: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let env = env_logger::Env::default().default_filter_or(args.log_level.as_str());
    env_logger::Builder::from_env(env).init();

    let config = Config::load(&args.config)?;

    let log_path = args.log_file.clone().unwrap_or_else(|| config.log_file.clone());
    let log_file = File::create(&log_path)
        .with_context(|| format!("unable to create log file {}", log_path.display()))?;
    let mut trace = TeeTrace::new(io::stdout(), BufWriter::new(log_file));

    trace.write_line("EWS sample application started.");

    let exit_code = match run(&args.command, &config, &mut trace) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, &mut trace);
            ExitCode::FAILURE
        }
    };

    trace.write_line("EWS sample application ends.");
    trace.close().context("unable to flush transcript")?;

    Ok(exit_code)
}

fn run(command: &Command, config: &Config, trace: &mut dyn Trace) -> Result<(), Error> {
    let credentials = ConsolePrompt::new(config.username.clone()).acquire_credentials()?;
    log::info!("authenticating as {}", credentials.identity());

    let transport = HttpTransport::new(&config.transport())?;

    match command {
        Command::Folder { folder } => {
            get_folder_summary(&transport, &credentials, folder, trace)?;
        }
        Command::Send { to, subject, body } => {
            let message = OutgoingMessage {
                subject: subject.clone(),
                body_html: body.clone(),
                recipient_address: to.clone(),
            };

            send_message(&transport, &credentials, &message, trace)?;
        }
    }

    Ok(())
}

fn report(err: &Error, trace: &mut dyn Trace) {
    let heading = match err {
        Error::InputValidation(_) => "Invalid input:",
        Error::Transport(_) => "Caught web error:",
        Error::Protocol { .. } | Error::Extraction(_) | Error::Serialize(_) => {
            "Caught application error:"
        }
    };

    trace.write_line(heading);
    trace.write_line(&err.to_string());
}
