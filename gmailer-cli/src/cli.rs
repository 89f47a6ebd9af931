use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};

use gmailer_core::{
    Geocoder, Mailer, NetworkCollector, WeatherFetcher,
    config::{Config, DEFAULT_WEATHER_ADDRESS, FileConfig},
    model::EmailBody,
    report,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "gmailer", version, about = "Send a status-report email via the Gmail SMTP relay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store sender/receiver credentials and defaults.
    Configure,

    /// Compose the report and send it.
    Send {
        /// Address for the weather section; overrides the configured default.
        #[arg(long)]
        address: Option<String>,

        /// Subject line; defaults to a dated report subject.
        #[arg(long)]
        subject: Option<String>,

        /// Free-text message appended to the end of the report.
        #[arg(long)]
        message: Option<String>,
    },

    /// Print the report body to stdout without sending anything.
    Preview {
        /// Address for the weather section; overrides the configured default.
        #[arg(long)]
        address: Option<String>,

        /// Free-text message appended to the end of the report.
        #[arg(long)]
        message: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Send { address, subject, message } => send(address, subject, message).await,
            Command::Preview { address, message } => preview(address, message).await,
        }
    }
}

fn configure() -> Result<()> {
    let existing = FileConfig::load()?;

    let sender_email = Text::new("Sender Gmail address:")
        .with_initial_value(existing.sender_email.as_deref().unwrap_or(""))
        .prompt()?;

    let receiver_email = Text::new("Receiver email address:")
        .with_initial_value(existing.receiver_email.as_deref().unwrap_or(""))
        .prompt()?;

    let app_password = Password::new("Gmail app password:")
        .without_confirmation()
        .prompt()?;

    let weather_address = Text::new("Default weather address:")
        .with_initial_value(
            existing.weather_address.as_deref().unwrap_or(DEFAULT_WEATHER_ADDRESS),
        )
        .prompt()?;

    let cfg = FileConfig {
        sender_email: non_empty(sender_email),
        receiver_email: non_empty(receiver_email),
        app_password: non_empty(app_password),
        weather_address: non_empty(weather_address),
    };
    cfg.save()?;

    println!("Saved configuration to {}", FileConfig::config_file_path()?.display());

    Ok(())
}

async fn send(
    address: Option<String>,
    subject: Option<String>,
    message: Option<String>,
) -> Result<()> {
    let config = Config::load()?;

    let address = address.unwrap_or_else(|| config.weather_address.clone());
    let body = compile_body(&address, message.as_deref().unwrap_or("")).await?;

    let subject = subject.unwrap_or_else(default_subject);
    Mailer::new().send(&config, &subject, &body).await?;

    println!("Report sent to {}", config.receiver_email);

    Ok(())
}

async fn preview(address: Option<String>, message: Option<String>) -> Result<()> {
    let address = address.unwrap_or_else(Config::weather_address_or_default);
    let body = compile_body(&address, message.as_deref().unwrap_or("")).await?;

    print!("{}", body.text);

    Ok(())
}

async fn compile_body(address: &str, message: &str) -> Result<EmailBody> {
    let http = gmailer_core::http_client().context("Failed to build HTTP client")?;

    let geocoder = Geocoder::new(http.clone());
    let fetcher = WeatherFetcher::new(http.clone());
    let collector = NetworkCollector::new(http);

    Ok(report::compile(&geocoder, &fetcher, &collector, address, message).await)
}

fn default_subject() -> String {
    format!("{} 상태 리포트", chrono::Local::now().format("%Y-%m-%d"))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
