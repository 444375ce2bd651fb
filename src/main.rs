use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use relay_sse::{decode_body, AgentEvent};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const READ_BUF_SIZE: usize = 8 * 1024;

/// Reads an event stream on stdin and writes one JSON event per line to stdout.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let events = decode_body(stdin_chunks());
    futures::pin_mut!(events);

    let mut count = 0u64;
    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                if let Ok(agent) = AgentEvent::from_value(event.clone()) {
                    if agent.is_error() {
                        tracing::warn!(
                            "agent reported error: {}",
                            agent.text().unwrap_or("<no content>")
                        );
                    }
                }
                println!("{}", event);
                count += 1;
            }
            Err(e) => {
                tracing::error!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    tracing::info!(count, "event stream finished");
    ExitCode::SUCCESS
}

fn stdin_chunks() -> impl Stream<Item = std::io::Result<Bytes>> {
    async_stream::try_stream! {
        let mut stdin = tokio::io::stdin();
        let mut buf = BytesMut::with_capacity(READ_BUF_SIZE);
        loop {
            buf.reserve(READ_BUF_SIZE);
            if stdin.read_buf(&mut buf).await? == 0 {
                break;
            }
            yield buf.split().freeze();
        }
    }
}
