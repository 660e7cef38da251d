use crate::models::{Pillar, Question, QuestionOption};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;

pub const MIN_DAILY: usize = 5;
pub const MAX_DAILY: usize = 8;

fn question(pillar: Pillar, text: &str, options: [(&str, u8); 3]) -> Question {
    Question {
        pillar,
        text: text.to_string(),
        options: options
            .into_iter()
            .map(|(label, score)| QuestionOption {
                label: label.to_string(),
                score,
            })
            .collect(),
    }
}

/// Process-wide question catalog: two questions per pillar, each with
/// three answers scored 2/1/0.
pub static POOL: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        question(
            Pillar::PositiveEmotion,
            "How would you describe your overall mood today?",
            [
                ("Mostly upbeat and positive", 2),
                ("Somewhere in the middle", 1),
                ("Mostly low or heavy", 0),
            ],
        ),
        question(
            Pillar::PositiveEmotion,
            "How often did something make you smile or laugh today?",
            [
                ("Several times", 2),
                ("Once or twice", 1),
                ("Hardly at all", 0),
            ],
        ),
        question(
            Pillar::Engagement,
            "How absorbed were you in what you were doing today?",
            [
                ("Fully absorbed, lost track of time", 2),
                ("Engaged some of the time", 1),
                ("Mostly going through the motions", 0),
            ],
        ),
        question(
            Pillar::Engagement,
            "Did any activity today hold your full attention?",
            [
                ("Yes, for a good stretch", 2),
                ("Briefly", 1),
                ("Not really", 0),
            ],
        ),
        question(
            Pillar::Relationships,
            "How connected did you feel to the people around you today?",
            [
                ("Close and supported", 2),
                ("Somewhat connected", 1),
                ("Isolated", 0),
            ],
        ),
        question(
            Pillar::Relationships,
            "How satisfying were your conversations today?",
            [
                ("Genuinely satisfying", 2),
                ("Fine but shallow", 1),
                ("Draining or absent", 0),
            ],
        ),
        question(
            Pillar::Meaning,
            "How meaningful did today's activities feel?",
            [
                ("Deeply meaningful", 2),
                ("Moderately meaningful", 1),
                ("Pointless", 0),
            ],
        ),
        question(
            Pillar::Meaning,
            "Did you spend time on something that matters to you?",
            [
                ("Yes, a real chunk of the day", 2),
                ("A little", 1),
                ("None at all", 0),
            ],
        ),
        question(
            Pillar::Accomplishment,
            "How productive did you feel today?",
            [
                ("Got a lot done", 2),
                ("Made some progress", 1),
                ("Got nothing moving", 0),
            ],
        ),
        question(
            Pillar::Accomplishment,
            "Did you move closer to a goal today?",
            [
                ("Clear progress", 2),
                ("A small step", 1),
                ("No progress", 0),
            ],
        ),
    ]
});

/// Calendar-date seed: 2024-06-01 -> 20240601. Keeps the daily set
/// identical across processes and machines without any shared state.
pub fn daily_seed(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Deterministic daily subset of the pool. A Fisher-Yates pass whose
/// swap index is derived from the date seed instead of an RNG, followed
/// by a seed-derived cut between `min` and `max` questions. Same date,
/// same output, every call. Not uniformly distributed, and doesn't need
/// to be.
pub fn select_daily(pool: &[Question], date: NaiveDate, min: usize, max: usize) -> Vec<Question> {
    let seed = daily_seed(date);
    let mut shuffled: Vec<Question> = pool.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = (seed + i as i64 * 31).rem_euclid(i as i64 + 1) as usize;
        shuffled.swap(i, j);
    }

    let span = max.saturating_sub(min) as i64 + 1;
    let count = min + seed.rem_euclid(span) as usize;
    shuffled.truncate(count.min(pool.len()));
    shuffled
}

pub fn todays_questions(date: NaiveDate) -> Vec<Question> {
    select_daily(&POOL, date, MIN_DAILY, MAX_DAILY)
}
