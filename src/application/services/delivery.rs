//! Delivery - the inbound listener and the single outgoing consumer

use std::sync::Arc;

use tokio::sync::mpsc;

use super::lifecycle::ShutdownSignal;
use crate::application::messaging::{Dispatcher, OutboxReceiver};
use crate::domain::entities::Update;
use crate::domain::traits::Transport;

/// Drain the outgoing queue one instruction at a time until shutdown or
/// until every producer is gone. Send failures are logged and skipped.
pub async fn run_outgoing(transport: Arc<dyn Transport>, mut queue: OutboxReceiver, signal: ShutdownSignal) {
    loop {
        tokio::select! {
            biased;
            _ = signal.wait() => break,
            instruction = queue.recv() => match instruction {
                Some(instruction) => {
                    if let Err(e) = instruction.execute(transport.as_ref()).await {
                        tracing::error!("Failed to deliver {:?}: {}", instruction, e);
                    }
                }
                None => {
                    tracing::info!("Outgoing queue closed");
                    break;
                }
            },
        }
    }

    tracing::info!("Gracefully shut down outgoing handler");
    signal.report_done();
}

/// Feed inbound events to the dispatcher one at a time, each fully
/// processed before the next is pulled.
pub async fn run_incoming(mut dispatcher: Dispatcher, mut updates: mpsc::Receiver<Update>, signal: ShutdownSignal) {
    loop {
        tokio::select! {
            biased;
            _ = signal.wait() => break,
            update = updates.recv() => match update {
                Some(update) => dispatcher.handle_update(update).await,
                None => {
                    tracing::info!("Update stream closed");
                    break;
                }
            },
        }
    }

    tracing::info!("Gracefully shut down incoming handler");
    signal.report_done();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::outbox;
    use crate::application::services::lifecycle::Lifecycle;
    use crate::domain::traits::OutgoingMessage;
    use crate::infrastructure::adapters::memory::MemoryTransport;

    #[tokio::test]
    async fn test_outgoing_preserves_queue_order() {
        let transport = Arc::new(MemoryTransport::new());
        let (tx, rx) = outbox(8);
        let lifecycle = Lifecycle::new();

        for i in 0..3 {
            tx.send(Box::new(OutgoingMessage::new(1, format!("m{}", i)))).await.unwrap();
        }
        drop(tx);

        // Without a shutdown request the consumer drains until the queue closes
        tokio::spawn(run_outgoing(transport.clone(), rx, lifecycle.signal()))
            .await
            .unwrap();

        let texts: Vec<String> = transport.sent().into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["m0", "m1", "m2"]);
        assert_eq!(lifecycle.completed(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_consumer() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail_sends(true);
        let (tx, rx) = outbox(8);
        let lifecycle = Lifecycle::new();
        let task = tokio::spawn(run_outgoing(transport.clone(), rx, lifecycle.signal()));

        tx.send(Box::new(OutgoingMessage::new(1, "lost"))).await.unwrap();
        transport.fail_sends(false);
        tx.send(Box::new(OutgoingMessage::new(1, "kept"))).await.unwrap();
        drop(tx);

        task.await.unwrap();
        assert_eq!(lifecycle.completed(), 1);
        let texts: Vec<String> = transport.sent().into_iter().map(|s| s.text).collect();
        assert!(texts.contains(&"kept".to_string()));
    }
}
