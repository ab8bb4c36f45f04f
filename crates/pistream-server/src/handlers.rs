//! HTTP endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Bootstrap page that connects to `/ws` |
//! | `GET` | `/api/health` | Liveness plus session counters |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::state::AppState;

/// Static page that opens the stream and renders `current_pi`.
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Pi, live</title>
    <style>
        html, body {
            margin: 0;
            padding: 0;
            height: 100%;
            overflow-y: auto;
        }
        body {
            font-family: 'Courier New', monospace;
            background: #000;
            color: #0f0;
            padding: 20px;
            font-size: 1.5em;
            line-height: 1.8;
            word-wrap: break-word;
        }
        .pi-display {
            white-space: pre-wrap;
        }
    </style>
</head>
<body>
    <div class="pi-display" id="pi-value">Waiting for the first digits...</div>
    <script>
        const ws = new WebSocket(`ws://${window.location.host}/ws`);
        const piValue = document.getElementById('pi-value');
        ws.onmessage = (event) => {
            const data = JSON.parse(event.data);
            piValue.textContent = data.current_pi;
        };
        window.onload = () => window.scrollTo(0, 0);
    </script>
</body>
</html>
"#;

/// Serve the bootstrap page.
pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// Body of `GET /api/health`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers.
    pub status: String,
    /// Sessions currently streaming.
    pub active_sessions: u64,
    /// Sessions started since boot.
    pub total_sessions: u64,
    /// Precision every new session starts with.
    pub initial_precision: u64,
}

/// Report liveness and session counters.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        active_sessions: state.active_sessions(),
        total_sessions: state.total_sessions(),
        initial_precision: state.settings.series.initial_precision,
    })
}
