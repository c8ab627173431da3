//! Process configuration: command-line flags, each backed by an environment
//! variable, with `.env` loaded first.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use thiserror::Error;

use crate::consumer::RetryPolicy;
use crate::envelope::Topic;
use crate::logging::LogFormat;
use crate::ports::{PortError, DEFAULT_FROM_EMAIL};

/// Default broker address.
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";

/// Invalid configuration or failed startup wiring.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level `{0}`, use trace, debug, info, warn or error")]
    InvalidLogLevel(String),
    #[error("failed to install log subscriber: {0}")]
    Logging(String),
    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("failed to load users: {0}")]
    Users(#[from] PortError),
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Broker address list (`bootstrap.servers`)
    #[arg(long, env, global = true, default_value = DEFAULT_BOOTSTRAP_SERVERS)]
    pub bootstrap_servers: String,

    /// Upper bound on a single consumer poll, in milliseconds
    #[arg(long, env, global = true, default_value_t = 1000)]
    pub poll_timeout_ms: u64,

    /// How long a publish waits for its delivery report, in milliseconds
    #[arg(long, env, global = true, default_value_t = 10_000)]
    pub flush_timeout_ms: u64,

    /// Sender address on outgoing emails
    #[arg(long, env, global = true, default_value = DEFAULT_FROM_EMAIL)]
    pub email_from: String,

    /// Attempts per message when a collaborator call fails (1 = no retries)
    #[arg(long, env, global = true, default_value_t = 1)]
    pub retry_attempts: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, env, global = true, default_value_t = 200)]
    pub retry_backoff_ms: u64,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, env, global = true, default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// JSON array of users (`[{"id": 1, "email": "a@x.com"}]`) for the user directory
    #[arg(long, env, global = true)]
    pub users_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Consume one topic until interrupted
    Consume {
        #[arg(value_enum)]
        target: ConsumeTarget,

        /// Override the consumer group. Changing it resets offset tracking.
        #[arg(long, env)]
        group_id: Option<String>,
    },
    /// Publish a single JSON event and wait for its delivery report
    Publish {
        /// `employee-events` or `notifications`
        topic: Topic,

        /// The message value, as JSON
        payload: String,

        /// Optional message key
        #[arg(long)]
        key: Option<String>,
    },
}

/// Which consumer loop to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConsumeTarget {
    /// `employee-events` -> account emails
    Employee,
    /// `notifications` -> notification rows
    Notifications,
}

impl ConsumeTarget {
    pub fn topic(self) -> Topic {
        match self {
            ConsumeTarget::Employee => Topic::EmployeeEvents,
            ConsumeTarget::Notifications => Topic::Notifications,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(
            self.retry_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// The consumer group for `topic`: the override if given, else the deployed default.
pub fn consumer_group(topic: Topic, group_id: Option<&str>) -> String {
    group_id
        .map(str::to_string)
        .unwrap_or_else(|| topic.consumer_group().to_string())
}
