use crate::models::{MoodSession, Pillar, TrendRecord};
use std::collections::BTreeMap;

/// Session scores within this band count as "consistent".
const CONSISTENCY_RANGE: f64 = 0.5;

/// Rolling per-pillar view over recent sessions.
///
/// `sessions` arrives most-recent-first, the order history is fetched
/// in; scores are reversed to chronological order before differencing
/// so `trend[0]` is always 0 (no prior session) and `trend[i]` is the
/// change from the previous session. A session missing a pillar scores
/// 0 for it. Empty history is the steady state for a new user and
/// yields average 0, an empty trend, no improvement, and vacuous
/// consistency.
pub fn compute_trends(
    sessions: &[MoodSession],
    pillars: &[Pillar],
) -> BTreeMap<Pillar, TrendRecord> {
    let mut records = BTreeMap::new();
    for &pillar in pillars {
        let mut scores: Vec<f64> = sessions
            .iter()
            .map(|session| session.perma_scores.get(&pillar).copied().unwrap_or(0.0))
            .collect();
        scores.reverse();

        let trend: Vec<f64> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| if i == 0 { 0.0 } else { score - scores[i - 1] })
            .collect();

        let average = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let improvement = trend.last().is_some_and(|&last| last > 0.0);
        let consistency = match (
            scores.iter().copied().reduce(f64::max),
            scores.iter().copied().reduce(f64::min),
        ) {
            (Some(max), Some(min)) => max - min < CONSISTENCY_RANGE,
            _ => true,
        };

        records.insert(
            pillar,
            TrendRecord {
                average,
                trend,
                improvement,
                consistency,
            },
        );
    }
    records
}

/// Pillars whose latest movement is downward, in canonical order.
pub fn declining_pillars(records: &BTreeMap<Pillar, TrendRecord>) -> Vec<Pillar> {
    records
        .iter()
        .filter(|(_, record)| record.trend.last().is_some_and(|&last| last < 0.0))
        .map(|(&pillar, _)| pillar)
        .collect()
}

/// Overall-score bands mapped to the mood labels shown in history views.
pub fn mood_label(overall: f64) -> &'static str {
    if overall >= 1.6 {
        "Very happy"
    } else if overall >= 1.2 {
        "Good"
    } else if overall >= 0.8 {
        "Neutral"
    } else if overall >= 0.4 {
        "A bit down"
    } else {
        "Very low"
    }
}

/// Nudges surfaced when a pillar is sliding.
pub fn suggestions_for(pillar: Pillar) -> &'static [&'static str] {
    match pillar {
        Pillar::PositiveEmotion => &[
            "Write down three things you're grateful for right now.",
            "Take a mindful moment to appreciate something around you.",
        ],
        Pillar::Engagement => &[
            "Set aside time for an activity that fully absorbs you.",
            "Break a complex task into smaller, more engaging chunks.",
        ],
        Pillar::Relationships => &[
            "Reach out to a friend or loved one, even a quick message counts.",
            "Express appreciation to someone you care about.",
        ],
        Pillar::Meaning => &[
            "Reflect on what gives your days purpose.",
            "Do something kind for someone else today.",
        ],
        Pillar::Accomplishment => &[
            "Set one small, achievable goal for today and finish it.",
            "Pick a task you've been putting off and work on it for five minutes.",
        ],
    }
}
