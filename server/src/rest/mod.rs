use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use lumen_display_shared::ControlEvent;
use tokio::sync::mpsc;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use crate::{display::Display, Configuration};

#[derive(Clone)]
struct AppState {
    display: Display,
    events: mpsc::Sender<ControlEvent>,
}

pub(crate) async fn serve_rest_endpoint(
    display: Display,
    events: mpsc::Sender<ControlEvent>,
    config: &Configuration,
) {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap();
    let app_state = AppState { display, events };

    let app = Router::new()
        .route("/display", get(display_socket))
        .layer(CorsLayer::permissive())
        .nest_service("/logf", ServeFile::new(config.log_location.clone()))
        .nest_service("/", ServeDir::new("../app/dist"))
        .with_state(app_state);

    let _ = axum::serve(listener, app).await;
}

async fn display_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_client(socket, state))
}

async fn handle_client(socket: WebSocket, state: AppState) {
    tracing::debug!("display client connected");
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before replaying so nothing is lost in between; a fresh
    // client first converges to the live screen, then follows the broadcast.
    let updates = BroadcastStream::new(state.display.subscribe());
    for update in state.display.replay().await {
        let Ok(frame) = serde_json::to_string(&update) else {
            continue;
        };
        if sender.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    let mut send_task = tokio::spawn(async move {
        let mut updates = updates;
        while let Some(update) = updates.next().await {
            // A lagged client skips updates; the next page push resyncs it.
            let Ok(update) = update else {
                continue;
            };
            let Ok(frame) = serde_json::to_string(&update) else {
                continue;
            };
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let events = state.events.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            match serde_json::from_str::<ControlEvent>(&text) {
                Ok(event) => {
                    let _ = events.send(event).await;
                }
                Err(e) => tracing::warn!("invalid control event: {}", e),
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    tracing::debug!("display client disconnected");
}
