use crate::config::ServerConfig;
use crate::core::ThreadPicker;
use crate::model::{SessionState, Track};
use crate::proxy::{AudioProxy, FETCH_FAILURE_MESSAGE, HttpFetcher};
use crate::render::{self, AudioSlot, PlayerView};
use crate::session::{self, SessionStore};
use crate::view::{self, PageQuery};
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub playlist: Arc<Vec<Track>>,
    pub sessions: Arc<SessionStore>,
    pub proxy: Arc<AudioProxy>,
    pub inline_audio: bool,
}

impl AppState {
    pub fn new(playlist: Vec<Track>, config: &ServerConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout, config.max_audio_bytes)?;
        Ok(Self {
            playlist: Arc::new(playlist),
            sessions: Arc::new(SessionStore::default()),
            proxy: Arc::new(AudioProxy::new(fetcher)),
            inline_audio: config.inline_audio,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page))
        .route("/audio/{index}", get(audio))
        .route("/api/now-playing", get(now_playing))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

pub async fn serve(config: ServerConfig, playlist: Vec<Track>) -> anyhow::Result<()> {
    let state = AppState::new(playlist, &config)?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("shellarchive listening on http://{}", config.bind_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")?;
    info!("shellarchive stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

async fn page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let len = state.playlist.len();
    let url_flag = query.url_flag();
    let events = query.events();

    let cookie_id = cookie_session_id(&headers);
    let known = cookie_id.is_some_and(|id| state.sessions.peek(id).is_some());
    if !known && !url_flag {
        // nothing to remember until the visitor enters the player
        return if events.is_empty() {
            Html(render::landing_page()).into_response()
        } else {
            Redirect::to("/").into_response()
        };
    }

    let (session_id, issued) = match cookie_id {
        Some(id) => (id.to_string(), false),
        None => (session::generate_session_id(), true),
    };

    let (view, session) = state.sessions.update(&session_id, |session| {
        session.playback.reconcile(len);
        let view = view::resolve(url_flag, session);
        if view.is_active {
            for event in &events {
                *session = session.apply(*event, len, &mut ThreadPicker);
            }
        }
        (view, *session)
    });

    if !events.is_empty() {
        debug!(?events, session = %session_id, active = view.is_active, "page actions");
        return with_session_cookie(Redirect::to("/").into_response(), &session_id, issued);
    }

    let body = if view.is_active {
        let audio = audio_slot(&state, &session).await;
        render::player_page(&PlayerView {
            playlist: &state.playlist,
            session,
            audio,
        })
    } else {
        render::landing_page()
    };
    with_session_cookie(Html(body).into_response(), &session_id, issued)
}

async fn audio_slot(state: &AppState, session: &SessionState) -> AudioSlot {
    let Some(index) = session.playback.current_index else {
        return AudioSlot::Empty;
    };
    let Some(url) = state.playlist.get(index).and_then(|track| track.url.as_deref()) else {
        return AudioSlot::Empty;
    };

    match state.proxy.fetch_once(url).await {
        Ok(bytes) if state.inline_audio => AudioSlot::Inline { bytes },
        Ok(_) => AudioSlot::Stream { index },
        Err(_) => AudioSlot::Failed,
    }
}

async fn audio(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    let Some(url) = state
        .playlist
        .get(index)
        .and_then(|track| track.url.as_deref())
    else {
        return (StatusCode::NOT_FOUND, "NO_SUCH_TRACK").into_response();
    };

    match state.proxy.fetch_once(url).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (header::CACHE_CONTROL, "private, max-age=3600"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::BAD_GATEWAY, FETCH_FAILURE_MESSAGE).into_response(),
    }
}

#[derive(Debug, Serialize)]
struct NowPlaying<'a> {
    active: bool,
    shuffle: bool,
    index: Option<usize>,
    track: Option<&'a Track>,
}

async fn now_playing(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = cookie_session_id(&headers)
        .and_then(|id| state.sessions.peek(id))
        .unwrap_or_default();
    let index = session
        .playback
        .current_index
        .filter(|idx| *idx < state.playlist.len());

    Json(NowPlaying {
        active: session.launched,
        shuffle: session.playback.shuffle_enabled,
        index,
        track: index.and_then(|idx| state.playlist.get(idx)),
    })
    .into_response()
}

fn cookie_session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session::session_id_from_cookie_header)
}

fn with_session_cookie(mut response: Response, session_id: &str, issued: bool) -> Response {
    if issued && let Ok(value) = HeaderValue::from_str(&session::session_cookie(session_id)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}
