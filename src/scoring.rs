use crate::errors::CoreError;
use crate::models::{Pillar, Question};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub pillar_averages: BTreeMap<Pillar, f64>,
    pub strongest: Pillar,
    pub weakest: Pillar,
}

/// Aggregates a fully answered questionnaire into per-pillar averages
/// and picks the strongest and weakest pillar.
///
/// Callers gate on "all answered"; a `None` entry, a length mismatch,
/// or a score above 2 is rejected rather than coerced. Pillars with no
/// question in today's set average 0. Ties are broken by canonical
/// pillar order: first wins "strongest", last wins "weakest".
pub fn analyze(questions: &[Question], answers: &[Option<u8>]) -> Result<Analysis, CoreError> {
    if questions.len() != answers.len() {
        return Err(CoreError::InvalidInput(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }

    let mut by_pillar: BTreeMap<Pillar, Vec<u8>> = BTreeMap::new();
    for (index, (question, answer)) in questions.iter().zip(answers.iter().copied()).enumerate() {
        let score = answer.ok_or_else(|| {
            CoreError::InvalidInput(format!("question {} is unanswered", index + 1))
        })?;
        if score > 2 {
            return Err(CoreError::InvalidInput(format!(
                "score {score} for question {} is out of range",
                index + 1
            )));
        }
        by_pillar.entry(question.pillar).or_default().push(score);
    }

    let mut pillar_averages = BTreeMap::new();
    for pillar in Pillar::ALL {
        let average = match by_pillar.get(&pillar) {
            Some(scores) if !scores.is_empty() => {
                scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64
            }
            _ => 0.0,
        };
        pillar_averages.insert(pillar, average);
    }

    let mut strongest = Pillar::PositiveEmotion;
    let mut weakest = Pillar::PositiveEmotion;
    for pillar in Pillar::ALL {
        if pillar_averages[&pillar] > pillar_averages[&strongest] {
            strongest = pillar;
        }
        if pillar_averages[&pillar] <= pillar_averages[&weakest] {
            weakest = pillar;
        }
    }

    Ok(Analysis {
        pillar_averages,
        strongest,
        weakest,
    })
}

/// Human-readable one-liner stored alongside the structured fields.
pub fn summary_text(analysis: &Analysis) -> String {
    format!(
        "Strongest pillar: {}. Focus area: {}.",
        analysis.strongest.name(),
        analysis.weakest.name()
    )
}

/// Mean of the five pillar averages, the headline number behind the
/// mood label.
pub fn overall_score(pillar_averages: &BTreeMap<Pillar, f64>) -> f64 {
    if pillar_averages.is_empty() {
        return 0.0;
    }
    pillar_averages.values().sum::<f64>() / pillar_averages.len() as f64
}
