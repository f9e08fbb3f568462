//! Reveal state endpoints: the countdown and the live event stream.

use super::shared_types::ApiError;
use super::view::{snapshot, RevealSummary, ViewSnapshot};
use crate::app_state::AppState;
use crate::domain::RevealOrchestrator;
use crate::session::CookieIdentity;
use axum::{
    extract::State,
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use futures::stream::{self, Stream};
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;

/// SSE event name carrying a full page payload.
const VIEW_EVENT: &str = "view";

/// GET /api/reveal
///
/// Countdown and reveal flag. The gender is included only once revealed.
pub async fn get_reveal(State(state): State<AppState>) -> Result<Json<RevealSummary>, ApiError> {
    // ---
    let reveal = state.current_reveal_state().await?;
    Ok(Json(RevealSummary::public(&reveal, Utc::now())))
}

fn view_event(body: &ViewSnapshot) -> Result<Event, axum::Error> {
    Event::default().event(VIEW_EVENT).json_data(body)
}

/// GET /api/reveal/events
///
/// Server-sent events. The first event is the current page payload; after
/// that, one `view` event per reveal-state change. The visitor's prediction
/// is resolved once, when the stream opens, and the view is recomputed
/// against it for every change.
///
/// Clients must reopen the stream after a successful submit or "find my
/// prediction". A stream opened before either keeps reporting `predicting`
/// for that browser, even once the reveal goes live.
///
/// A subscriber that falls behind skips the events it missed; each event
/// carries the whole state, so the newest one is all that matters.
#[tracing::instrument(skip(state, headers))]
pub async fn reveal_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<
    (
        HeaderMap,
        Sse<impl Stream<Item = Result<Event, axum::Error>>>,
    ),
    ApiError,
> {
    // ---
    // Subscribe before reading so a change in between is not lost.
    let receiver = state.hub().subscribe();

    let reveal = state.current_reveal_state().await?;
    let mut identity = CookieIdentity::from_headers(&headers, state.cookies());
    let orchestrator =
        RevealOrchestrator::resolve(reveal, &mut identity, state.predictions().as_ref()).await;

    let initial = snapshot(&state, &orchestrator).await;
    let first = stream::once(async move { view_event(&initial) });

    let updates = stream::unfold(
        (state, orchestrator, receiver),
        |(state, mut orchestrator, mut receiver)| async move {
            // ---
            loop {
                match receiver.recv().await {
                    Ok(reveal) => {
                        let view = orchestrator.apply(reveal);
                        tracing::debug!("Pushing reveal change, view is now {view:?}");
                        let body = snapshot(&state, &orchestrator).await;
                        return Some((view_event(&body), (state, orchestrator, receiver)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("SSE subscriber lagged, skipped {skipped} reveal event(s)");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        },
    );

    let mut response_headers = HeaderMap::new();
    identity.apply(&mut response_headers);

    Ok((
        response_headers,
        Sse::new(first.chain(updates)).keep_alive(KeepAlive::default()),
    ))
}
