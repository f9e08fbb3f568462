//! The page payload shared by the view endpoint, submissions, lookups and
//! the live event stream.
//!
//! A snapshot is rebuilt from scratch every time from the orchestrator's
//! `(reveal state, resolved prediction)` pair. Statistics and registries are
//! decoration: if either fails to load the snapshot is still served without
//! them.

use crate::app_state::AppState;
use crate::domain::{
    Countdown, Guess, Prediction, PredictionStats, Registry, RevealOrchestrator, RevealState,
    Standing, View,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reveal state as guests see it. The gender stays hidden until revealed.
#[derive(Debug, Serialize)]
pub struct RevealSummary {
    // ---
    pub countdown_date: DateTime<Utc>,
    pub countdown: Countdown,
    pub is_revealed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Guess>,
}

impl RevealSummary {
    // ---
    pub fn public(state: &RevealState, now: DateTime<Utc>) -> Self {
        // ---
        Self {
            countdown_date: state.countdown_date,
            countdown: Countdown::until(state.countdown_date, now),
            is_revealed: state.is_revealed,
            gender: state.gender.filter(|_| state.is_revealed),
        }
    }
}

/// Tallies plus, when a guess is known, where that guess stands.
#[derive(Debug, Serialize)]
pub struct StatsView {
    // ---
    #[serde(flatten)]
    pub stats: PredictionStats,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub standing: Option<Standing>,

    /// Share of all guests who picked the same as this visitor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guess_percent: Option<u8>,

    /// Only present once the reveal is live and the gender is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

impl StatsView {
    // ---
    pub fn new(stats: PredictionStats, guess: Option<Guess>, reveal: Option<&RevealState>) -> Self {
        // ---
        let revealed_gender = reveal.filter(|r| r.is_revealed).and_then(|r| r.gender);
        Self {
            stats,
            standing: guess.map(|g| stats.standing(g)),
            guess_percent: guess.map(|g| stats.percent_for(g)),
            correct: guess.zip(revealed_gender).map(|(g, actual)| g == actual),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViewSnapshot {
    // ---
    pub view: View,
    pub reveal: RevealSummary,
    pub prediction: Option<Prediction>,

    /// Only sent to visitors with a resolved prediction.
    pub stats: Option<StatsView>,
    pub registries: Vec<Registry>,
}

/// Assemble the payload for one render of the page.
pub async fn snapshot(state: &AppState, orchestrator: &RevealOrchestrator) -> ViewSnapshot {
    // ---
    let reveal = orchestrator.reveal();
    let prediction = orchestrator.resolved().cloned();

    let stats = match &prediction {
        None => None,
        Some(p) => match state.current_stats().await {
            Ok(stats) => Some(StatsView::new(stats, Some(p.prediction), Some(reveal))),
            Err(err) => {
                tracing::warn!("Statistics unavailable, rendering without them: {err}");
                None
            }
        },
    };

    let registries = state.registries().list().await.unwrap_or_else(|err| {
        tracing::warn!("Registries unavailable, rendering without them: {err}");
        Vec::new()
    });

    ViewSnapshot {
        view: orchestrator.view(),
        reveal: RevealSummary::public(reveal, Utc::now()),
        prediction,
        stats,
        registries,
    }
}
