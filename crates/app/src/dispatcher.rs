//! Input dispatcher — the single sequential loop driving the engine.
//!
//! Commands, chat events, and device notifications all pass through this
//! loop one at a time, which is what lets the rest of the application skip
//! internal locking.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use chatbuzz_domain::chat::ChatEvent;

use crate::commands::CommandProcessor;
use crate::ports::device::DeviceClient;
use crate::ports::reply::{Reply, ReplySink};

/// How often the loop absorbs pending device-discovery notifications.
const DEVICE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One unit of input for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A command line, without its leading slash.
    Command(String),
    /// An inbound chat event.
    Chat(ChatEvent),
    /// Stop the loop and tear the session down.
    Shutdown,
}

/// Run the engine loop until [`InputEvent::Shutdown`] arrives or the input
/// channel closes. The device session is torn down before returning.
pub async fn run<C, S>(
    mut events: mpsc::Receiver<InputEvent>,
    mut processor: CommandProcessor<C>,
    mut sink: S,
) where
    C: DeviceClient,
    S: ReplySink,
{
    let mut poll = time::interval(DEVICE_POLL_INTERVAL);
    poll.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(InputEvent::Command(line)) => {
                    deliver_all(&mut sink, processor.handle_command(&line).await).await;
                }
                Some(InputEvent::Chat(chat)) => {
                    deliver_all(&mut sink, processor.handle_chat(&chat).await).await;
                }
                Some(InputEvent::Shutdown) | None => break,
            },
            _ = poll.tick() => {
                deliver_all(&mut sink, processor.poll_device_notifications()).await;
            }
        }
    }

    if let Err(err) = processor.shutdown().await {
        tracing::warn!(error = %err, "session teardown failed");
    }
}

async fn deliver_all<S: ReplySink>(sink: &mut S, replies: Vec<Reply>) {
    for reply in replies {
        sink.deliver(&reply).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::device::{ClientError, DeviceEvent};
    use chatbuzz_domain::chat::ChatChannel;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeState {
        vibrations: Vec<(u32, f64)>,
        disconnect_calls: usize,
        events_tx: Option<mpsc::Sender<DeviceEvent>>,
    }

    #[derive(Clone, Default)]
    struct FakeClient {
        state: Arc<Mutex<FakeState>>,
    }

    impl DeviceClient for FakeClient {
        fn connect(
            &mut self,
            _url: &str,
        ) -> impl Future<Output = Result<mpsc::Receiver<DeviceEvent>, ClientError>> + Send
        {
            let (tx, rx) = mpsc::channel(16);
            self.state.lock().unwrap().events_tx = Some(tx);
            async { Ok(rx) }
        }

        fn start_scanning(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
            async { Ok(()) }
        }

        fn stop_scanning(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
            async { Ok(()) }
        }

        fn vibrate(
            &mut self,
            device_index: u32,
            speed: f64,
        ) -> impl Future<Output = Result<(), ClientError>> + Send {
            self.state.lock().unwrap().vibrations.push((device_index, speed));
            async { Ok(()) }
        }

        fn stop_all_devices(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
            async { Ok(()) }
        }

        fn disconnect(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
            self.state.lock().unwrap().disconnect_calls += 1;
            async { Ok(()) }
        }
    }

    #[derive(Clone, Default)]
    struct VecSink {
        replies: Arc<Mutex<Vec<Reply>>>,
    }

    impl ReplySink for VecSink {
        fn deliver(&mut self, reply: &Reply) -> impl Future<Output = ()> + Send {
            self.replies.lock().unwrap().push(reply.clone());
            async {}
        }
    }

    fn harness() -> (
        mpsc::Sender<InputEvent>,
        tokio::task::JoinHandle<()>,
        VecSink,
        FakeClient,
    ) {
        let client = FakeClient::default();
        let sink = VecSink::default();
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run(
            rx,
            CommandProcessor::new(client.clone()),
            sink.clone(),
        ));
        (tx, handle, sink, client)
    }

    fn command(line: &str) -> InputEvent {
        InputEvent::Command(line.to_string())
    }

    #[tokio::test]
    async fn should_process_commands_and_stop_on_shutdown() {
        let (tx, handle, sink, _) = harness();
        tx.send(command("add 20 slowly")).await.unwrap();
        tx.send(InputEvent::Shutdown).await.unwrap();
        handle.await.unwrap();

        let replies = sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.starts_with("Added "));
    }

    #[tokio::test]
    async fn should_stop_when_input_channel_closes() {
        let (tx, handle, _, _) = harness();
        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn should_route_chat_events_to_the_device() {
        let (tx, handle, _, client) = harness();
        tx.send(command("connect")).await.unwrap();
        tx.send(command("add 75 getting there")).await.unwrap();

        let device_tx = loop {
            if let Some(device_tx) = client.state.lock().unwrap().events_tx.clone() {
                break device_tx;
            }
            tokio::task::yield_now().await;
        };
        device_tx
            .send(DeviceEvent::Added {
                index: 0,
                name: "Test Wand".to_string(),
            })
            .await
            .unwrap();

        tx.send(InputEvent::Chat(ChatEvent {
            channel: ChatChannel::Party,
            sender: "Alice".to_string(),
            message: "getting there".to_string(),
        }))
        .await
        .unwrap();
        tx.send(InputEvent::Shutdown).await.unwrap();
        handle.await.unwrap();

        let state = client.state.lock().unwrap();
        assert_eq!(state.vibrations.len(), 1);
        assert!((state.vibrations[0].1 - 0.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_tear_down_the_session_on_shutdown() {
        let (tx, handle, _, client) = harness();
        tx.send(command("connect")).await.unwrap();
        tx.send(InputEvent::Shutdown).await.unwrap();
        handle.await.unwrap();
        assert_eq!(client.state.lock().unwrap().disconnect_calls, 1);
    }
}
