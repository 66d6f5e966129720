//! Websocket client for an Intiface-compatible device server.
//!
//! One connection at a time. Outgoing requests carry a message id; a reader
//! task routes the server's `Ok`/`Error` replies back to the waiting caller
//! through per-id oneshot channels, and forwards device added/removed
//! notifications to the channel handed out by `connect`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chatbuzz_app::ports::device::{ClientError, DeviceClient, DeviceEvent};

use crate::error::IntifaceError;
use crate::protocol::{self, CLIENT_NAME, ClientMessage, PROTOCOL_VERSION, ServerMessage, Speed};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<(), IntifaceError>>>>>;

struct Connection {
    sink: SplitSink<WsStream, Message>,
    pending: Pending,
    reader: tokio::task::JoinHandle<()>,
}

/// [`DeviceClient`] implementation speaking the Buttplug v2 JSON protocol
/// over a websocket.
pub struct WebsocketClient {
    connection: Option<Connection>,
    next_id: u32,
}

impl Default for WebsocketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebsocketClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connection: None,
            // Id 0 is reserved for server-initiated messages.
            next_id: 1,
        }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }

    async fn do_connect(
        &mut self,
        url: &str,
    ) -> Result<mpsc::Receiver<DeviceEvent>, IntifaceError> {
        let (stream, _) = connect_async(url).await?;
        let (mut sink, mut reader_stream) = stream.split();

        // Handshake runs on the raw stream, before the reader task exists.
        let id = self.take_id();
        let frame = protocol::encode_frame(&[ClientMessage::RequestServerInfo {
            id,
            client_name: CLIENT_NAME.to_string(),
            message_version: PROTOCOL_VERSION,
        }])
        .map_err(IntifaceError::Codec)?;
        sink.send(Message::Text(frame)).await?;

        let (server_name, message_version) =
            wait_for_server_info(&mut reader_stream).await?;
        if message_version < PROTOCOL_VERSION {
            return Err(IntifaceError::Handshake(format!(
                "server only speaks protocol version {message_version}"
            )));
        }
        tracing::info!(server = %server_name, "connected to device server");

        let (events_tx, events_rx) = mpsc::channel(32);
        let pending: Pending = Arc::default();
        let reader = tokio::spawn(read_loop(reader_stream, Arc::clone(&pending), events_tx));
        self.connection = Some(Connection {
            sink,
            pending,
            reader,
        });

        // Devices the server already knows about never produce a
        // DeviceAdded, so ask for the current list up front.
        self.request(|id| ClientMessage::RequestDeviceList { id })
            .await?;
        Ok(events_rx)
    }

    /// Send one request and wait for the server's reply to its id.
    async fn request(
        &mut self,
        build: impl FnOnce(u32) -> ClientMessage,
    ) -> Result<(), IntifaceError> {
        let id = self.take_id();
        let connection = self
            .connection
            .as_mut()
            .ok_or(IntifaceError::ConnectionLost)?;

        let (tx, rx) = oneshot::channel();
        connection.pending.lock().unwrap().insert(id, tx);

        let frame = protocol::encode_frame(&[build(id)]).map_err(IntifaceError::Codec)?;
        if let Err(err) = connection.sink.send(Message::Text(frame)).await {
            connection.pending.lock().unwrap().remove(&id);
            return Err(err.into());
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(IntifaceError::ConnectionLost),
        }
    }

    async fn do_disconnect(&mut self) -> Result<(), IntifaceError> {
        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };
        let result = connection.sink.send(Message::Close(None)).await;
        connection.reader.abort();
        tracing::debug!("closed device server connection");
        result.map_err(Into::into)
    }
}

impl DeviceClient for WebsocketClient {
    fn connect(
        &mut self,
        url: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<DeviceEvent>, ClientError>> + Send {
        async move { self.do_connect(url).await.map_err(Into::into) }
    }

    fn start_scanning(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move {
            self.request(|id| ClientMessage::StartScanning { id })
                .await
                .map_err(Into::into)
        }
    }

    fn stop_scanning(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move {
            self.request(|id| ClientMessage::StopScanning { id })
                .await
                .map_err(Into::into)
        }
    }

    fn vibrate(
        &mut self,
        device_index: u32,
        speed: f64,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move {
            self.request(|id| ClientMessage::VibrateCmd {
                id,
                device_index,
                speeds: vec![Speed { index: 0, speed }],
            })
            .await
            .map_err(Into::into)
        }
    }

    fn stop_all_devices(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move {
            self.request(|id| ClientMessage::StopAllDevices { id })
                .await
                .map_err(Into::into)
        }
    }

    fn disconnect(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move { self.do_disconnect().await.map_err(Into::into) }
    }
}

async fn wait_for_server_info(
    stream: &mut SplitStream<WsStream>,
) -> Result<(String, u32), IntifaceError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(IntifaceError::ConnectionLost);
        };
        let text = match message? {
            Message::Text(text) => text,
            Message::Close(_) => return Err(IntifaceError::ConnectionLost),
            _ => continue,
        };
        for message in protocol::decode_frame(&text).map_err(IntifaceError::Codec)? {
            match message {
                ServerMessage::ServerInfo {
                    server_name,
                    message_version,
                    ..
                } => return Ok((server_name, message_version)),
                ServerMessage::Error {
                    error_message,
                    error_code,
                    ..
                } => {
                    return Err(IntifaceError::Server {
                        code: error_code,
                        message: error_message,
                    });
                }
                _ => {}
            }
        }
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    pending: Pending,
    events: mpsc::Sender<DeviceEvent>,
) {
    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "websocket read failed");
                break;
            }
        };
        let messages = match protocol::decode_frame(&text) {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!(error = %err, "dropping unparseable frame");
                continue;
            }
        };
        for message in messages {
            match message {
                ServerMessage::Ok { id } => resolve(&pending, id, Ok(())),
                ServerMessage::Error {
                    id,
                    error_message,
                    error_code,
                } => {
                    if id == 0 {
                        tracing::warn!(
                            code = error_code,
                            message = %error_message,
                            "server-initiated error"
                        );
                    } else {
                        resolve(
                            &pending,
                            id,
                            Err(IntifaceError::Server {
                                code: error_code,
                                message: error_message,
                            }),
                        );
                    }
                }
                ServerMessage::DeviceAdded {
                    device_index,
                    device_name,
                } => {
                    let _ = events
                        .send(DeviceEvent::Added {
                            index: device_index,
                            name: device_name,
                        })
                        .await;
                }
                ServerMessage::DeviceRemoved { device_index } => {
                    let _ = events
                        .send(DeviceEvent::Removed {
                            index: device_index,
                        })
                        .await;
                }
                ServerMessage::DeviceList { id, devices } => {
                    // Resolve before forwarding: the receiver is not handed
                    // out until connect returns, and a list larger than the
                    // event buffer would otherwise wedge this loop mid-list.
                    resolve(&pending, id, Ok(()));
                    for device in devices {
                        let _ = events
                            .send(DeviceEvent::Added {
                                index: device.device_index,
                                name: device.device_name,
                            })
                            .await;
                    }
                }
                ServerMessage::ServerInfo { .. } | ServerMessage::ScanningFinished { .. } => {}
            }
        }
    }

    // Fail everything still waiting so callers observe the drop.
    let mut pending = pending.lock().unwrap();
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(IntifaceError::ConnectionLost));
    }
}

fn resolve(pending: &Pending, id: u32, result: Result<(), IntifaceError>) {
    let Some(tx) = pending.lock().unwrap().remove(&id) else {
        tracing::debug!(id, "reply for unknown request id");
        return;
    };
    let _ = tx.send(result);
}
