use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use workforce_events::bus::{KafkaConsumer, KafkaProducer};
use workforce_events::config::{self, Command, Config, ConfigError, ConsumeTarget};
use workforce_events::consumer::{ConsumerRuntime, ConsumerThread};
use workforce_events::envelope::Topic;
use workforce_events::handlers::Router;
use workforce_events::logging;
use workforce_events::ports::{InMemoryNotificationStore, InMemoryUserDirectory, LogMailer};
use workforce_events::publisher::EventPublisher;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::new();

    if let Err(err) = logging::init(&config.log_level, config.log_format) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let result = match config.command.clone() {
        Command::Consume { target, group_id } => consume(&config, target, group_id).await,
        Command::Publish {
            topic,
            payload,
            key,
        } => publish(&config, topic, &payload, key.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "exiting on error");
            ExitCode::FAILURE
        }
    }
}

async fn consume(
    config: &Config,
    target: ConsumeTarget,
    group_id: Option<String>,
) -> Result<(), BoxError> {
    let topic = target.topic();
    let group = config::consumer_group(topic, group_id.as_deref());

    let router = match topic {
        Topic::EmployeeEvents => {
            Router::employee_events(Arc::new(LogMailer::new(config.email_from.clone())))
        }
        Topic::Notifications => {
            let users = match &config.users_file {
                Some(path) => {
                    InMemoryUserDirectory::from_json_file(path).map_err(ConfigError::Users)?
                }
                None => {
                    warn!("no users file configured, every user lookup will miss");
                    InMemoryUserDirectory::new()
                }
            };
            info!(users = users.len(), "user directory loaded");
            Router::notifications(Arc::new(users), Arc::new(InMemoryNotificationStore::new()))
        }
    };

    let consumer = KafkaConsumer::subscribe(&config.bootstrap_servers, &group, topic.name())?;
    let runtime = ConsumerRuntime::new(consumer, router)
        .with_poll_timeout(config.poll_timeout())
        .with_retry(config.retry_policy());
    let worker = ConsumerThread::spawn(runtime);

    tokio::signal::ctrl_c().await?;
    info!(%topic, %group, "interrupt received, finishing in-flight message");

    let stats = worker.stop();
    info!(
        handled = stats.handled,
        skipped = stats.skipped,
        transport_errors = stats.transport_errors,
        commit_errors = stats.commit_errors,
        "consumer exited"
    );
    Ok(())
}

fn publish(
    config: &Config,
    topic: Topic,
    payload: &str,
    key: Option<&str>,
) -> Result<(), BoxError> {
    let event: serde_json::Value =
        serde_json::from_str(payload).map_err(ConfigError::InvalidPayload)?;

    let publisher = EventPublisher::new(KafkaProducer::new(&config.bootstrap_servers)?)
        .with_flush_timeout(config.flush_timeout());
    let report = match key {
        Some(key) => publisher.try_publish_keyed(topic.name(), key, &event)?,
        None => publisher.try_publish(topic.name(), &event)?,
    };

    info!(
        topic = %report.topic,
        partition = report.partition,
        offset = report.offset,
        "event published"
    );
    Ok(())
}
