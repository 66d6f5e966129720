//! End-to-end smoke tests for the full chatbuzzd stack.
//!
//! Each test spins up a scripted Intiface-style websocket server on a local
//! port and drives the real dispatcher, command processor, and websocket
//! client with parsed input lines — no stdin/stdout involved.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use chatbuzz_adapter_intiface::WebsocketClient;
use chatbuzz_adapter_stdio::line::parse_line;
use chatbuzz_app::commands::CommandProcessor;
use chatbuzz_app::dispatcher::{self, InputEvent};
use chatbuzz_app::ports::reply::{Reply, ReplySink};

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

/// A scripted device server: answers the handshake, reports one connected
/// device, acknowledges everything else, and records every frame received.
async fn spawn_server(frames: Arc<Mutex<Vec<String>>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else { continue };
            frames.lock().unwrap().push(text.clone());
            let frame: serde_json::Value = serde_json::from_str(&text).unwrap();
            for entry in frame.as_array().unwrap() {
                let (kind, body) = entry.as_object().unwrap().iter().next().unwrap();
                let id = body["Id"].as_u64().unwrap();
                let reply = match kind.as_str() {
                    "RequestServerInfo" => format!(
                        r#"[{{"ServerInfo":{{"Id":{id},"ServerName":"Fake Server","MessageVersion":2,"MaxPingTime":0}}}}]"#
                    ),
                    "RequestDeviceList" => format!(
                        r#"[{{"DeviceList":{{"Id":{id},"Devices":[{{"DeviceIndex":0,"DeviceName":"Test Wand","DeviceMessages":{{}}}}]}}}}]"#
                    ),
                    _ => format!(r#"[{{"Ok":{{"Id":{id}}}}}]"#),
                };
                ws.send(Message::Text(reply)).await.unwrap();
            }
        }
    });
    addr.to_string()
}

struct Harness {
    tx: mpsc::Sender<InputEvent>,
    handle: tokio::task::JoinHandle<()>,
    sink: VecSink,
}

impl Harness {
    fn start() -> Self {
        let sink = VecSink::default();
        let (tx, rx) = mpsc::channel(16);
        let processor = CommandProcessor::new(WebsocketClient::new());
        let handle = tokio::spawn(dispatcher::run(rx, processor, sink.clone()));
        Self { tx, handle, sink }
    }

    async fn line(&self, line: &str) {
        self.tx.send(parse_line(line).unwrap()).await.unwrap();
    }

    async fn finish(self) -> Vec<Reply> {
        self.tx.send(InputEvent::Shutdown).await.unwrap();
        self.handle.await.unwrap();
        let replies = self.sink.replies.lock().unwrap();
        replies.clone()
    }
}

#[tokio::test]
async fn should_drive_device_from_chat_line() {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Arc::clone(&frames)).await;

    let harness = Harness::start();
    harness.line(&format!("/connect {addr}")).await;
    harness.line("/add 20 slowly").await;
    harness.line("/add 75 getting there").await;
    harness
        .line(r#"{"channel":"tell","sender":"Alice","message":"slowly getting there"}"#)
        .await;
    let replies = harness.finish().await;

    assert!(
        replies
            .iter()
            .any(|r| r.text == "Connected! Scanning for devices...")
    );
    assert!(replies.iter().all(|r| !r.is_error()));

    let frames = frames.lock().unwrap();
    let vibrate = frames
        .iter()
        .find(|frame| frame.contains("VibrateCmd"))
        .expect("a vibrate frame should have been sent");
    assert!(vibrate.contains(r#""Speed":0.75"#));
}

#[tokio::test]
async fn should_halt_devices_on_stop_line() {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Arc::clone(&frames)).await;

    let harness = Harness::start();
    harness.line(&format!("/connect {addr}")).await;
    harness.line("/stop").await;
    let replies = harness.finish().await;

    assert!(replies.iter().any(|r| r.text == "Stopped all devices."));
    assert!(
        frames
            .lock()
            .unwrap()
            .iter()
            .any(|frame| frame.contains("StopAllDevices"))
    );
}

#[tokio::test]
async fn should_report_device_failure_when_not_connected() {
    let harness = Harness::start();
    harness.line("/add 20 slowly").await;
    harness
        .line(r#"{"channel":"party","sender":"Alice","message":"slowly"}"#)
        .await;
    let replies = harness.finish().await;

    assert!(
        replies
            .iter()
            .any(|r| r.is_error() && r.text.contains("not connected"))
    );
}

#[tokio::test]
async fn should_ignore_public_channel_chat() {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_server(Arc::clone(&frames)).await;

    let harness = Harness::start();
    harness.line(&format!("/connect {addr}")).await;
    harness.line("/add 20 slowly").await;
    harness
        .line(r#"{"channel":"say","sender":"Alice","message":"slowly"}"#)
        .await;
    harness.finish().await;

    assert!(
        !frames
            .lock()
            .unwrap()
            .iter()
            .any(|frame| frame.contains("VibrateCmd"))
    );
}

#[tokio::test]
async fn should_save_and_reload_triggers_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triggers.txt");
    let path = path.to_str().unwrap();

    let harness = Harness::start();
    harness.line("/add 20 slowly").await;
    harness.line("/add 75 getting there").await;
    harness.line(&format!("/save {path}")).await;
    harness.finish().await;

    let harness = Harness::start();
    harness.line(&format!("/load {path}")).await;
    harness.line("/list").await;
    let replies = harness.finish().await;

    assert!(
        replies
            .iter()
            .any(|r| r.text == format!("Loaded 2 triggers from {path}"))
    );
    let listing = replies
        .iter()
        .find(|r| r.text.starts_with("Configured triggers:"))
        .unwrap();
    assert!(listing.text.contains("[0] | 20 | slowly"));
    assert!(listing.text.contains("[1] | 75 | getting there"));
}

#[tokio::test]
async fn should_print_usage_for_bare_slash() {
    let harness = Harness::start();
    harness.line("/").await;
    let replies = harness.finish().await;
    assert!(replies.iter().any(|r| r.text.starts_with("Usage:")));
}
