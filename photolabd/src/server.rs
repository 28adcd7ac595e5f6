//! JSON-lines IPC server.

use std::sync::Arc;

use photolab::protocol::{encode_line, Request, Response};
use photolab::state::ParameterUpdate;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tracing::{error, info};

use crate::error::DaemonError;
use crate::session::Session;

/// Apply one request to the session.
pub async fn dispatch(session: &Session, request: Request, shutdown: &Notify) -> Response {
    match request {
        Request::GetState => Response::State(session.snapshot().await),
        Request::GetHistory => Response::History {
            points: session.history().await,
        },
        Request::GetChat => Response::Chat {
            messages: session.chat().await,
        },
        Request::SetParameters {
            light_intensity,
            co2_level,
            temperature,
        } => {
            let update = ParameterUpdate {
                light_intensity,
                co2_level,
                temperature,
            };
            if update.is_empty() {
                return Response::error("SetParameters needs at least one field");
            }
            session.update_parameters(update).await;
            Response::State(session.snapshot().await)
        }
        Request::ToggleSimulation => {
            if session.toggle_simulating().await {
                Response::success("Running")
            } else {
                Response::success("Paused")
            }
        }
        Request::Start => {
            session.set_simulating(true).await;
            Response::success("Running")
        }
        Request::Pause => {
            session.set_simulating(false).await;
            Response::success("Paused")
        }
        Request::Ask { question } => match session.ask(&question).await {
            Ok(content) => Response::Reply { content },
            Err(rejected) => Response::error(rejected.message()),
        },
        Request::Shutdown => {
            info!("Shutdown requested");
            shutdown.notify_one();
            Response::success("Shutting down")
        }
    }
}

pub async fn handle_client(
    stream: TcpStream,
    session: Arc<Session>,
    shutdown: Arc<Notify>,
) -> Result<(), DaemonError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(&session, request, &shutdown).await,
            Err(e) => Response::error(format!("Invalid request: {}", e)),
        };
        writer.write_all(encode_line(&response)?.as_bytes()).await?;
    }

    Ok(())
}

/// Accept clients until a `Shutdown` request or Ctrl-C, then stop the clock.
pub async fn serve(
    listener: TcpListener,
    session: Arc<Session>,
    shutdown: Arc<Notify>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = accepted?;
                info!("Client connected: {}", addr);
                let session = Arc::clone(&session);
                let shutdown = Arc::clone(&shutdown);
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, session, shutdown).await {
                        error!("Client handler error: {}", e);
                    }
                });
            }
            _ = shutdown.notified() => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
        }
    }

    session.shutdown().await;
    info!("Session closed");
    Ok(())
}
