use super::super::models::{ScoreDetail, ScoreOutcome};
use super::ScoreCalculator;
use crate::pilots;

/// All-or-nothing category: the single pick must match the single result
pub struct SinglePickCalculator {
    label: &'static str,
    correct: i32,
}

impl SinglePickCalculator {
    pub fn new(label: &'static str, correct: i32) -> Self {
        Self { label, correct }
    }
}

impl ScoreCalculator for SinglePickCalculator {
    fn calculate(&self, predictions: &[String], actual: &[String]) -> ScoreOutcome {
        let predicted = predictions.first();
        let official = actual.first();

        match (predicted, official) {
            (Some(predicted), Some(official)) if predicted == official => ScoreOutcome {
                points: self.correct,
                detail: ScoreDetail {
                    correct_pilots: vec![predicted.clone()],
                    bonus_exact_order: false,
                    breakdown: format!(
                        "{} correct: {} → +{}pts",
                        self.label,
                        pilots::display_name(predicted),
                        self.correct
                    ),
                },
            },
            _ => ScoreOutcome {
                points: 0,
                detail: ScoreDetail {
                    correct_pilots: Vec::new(),
                    bonus_exact_order: false,
                    breakdown: format!(
                        "{} incorrect (predicted: {}, actual: {})",
                        self.label,
                        predicted.map(|c| pilots::display_name(c)).unwrap_or_else(|| "none".into()),
                        official.map(|c| pilots::display_name(c)).unwrap_or_else(|| "none".into()),
                    ),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn hit_reports_the_pilot() {
        let calculator = SinglePickCalculator::new("Pole Position", 5);
        let outcome = calculator.calculate(&codes(&["VER"]), &codes(&["VER"]));

        assert_eq!(outcome.points, 5);
        assert_eq!(outcome.detail.correct_pilots, vec!["VER"]);
        assert_eq!(
            outcome.detail.breakdown,
            "Pole Position correct: Max Verstappen → +5pts"
        );
    }

    #[test]
    fn miss_reports_both_sides() {
        let calculator = SinglePickCalculator::new("Race Winner", 10);
        let outcome = calculator.calculate(&codes(&["HAM"]), &codes(&["VER"]));

        assert_eq!(outcome.points, 0);
        assert!(outcome.detail.correct_pilots.is_empty());
        assert_eq!(
            outcome.detail.breakdown,
            "Race Winner incorrect (predicted: Lewis Hamilton, actual: Max Verstappen)"
        );
    }

    #[test]
    fn empty_sides_never_score() {
        let calculator = SinglePickCalculator::new("Fastest Lap", 3);
        assert_eq!(calculator.calculate(&[], &codes(&["VER"])).points, 0);
        assert_eq!(calculator.calculate(&codes(&["VER"]), &[]).points, 0);
        assert_eq!(calculator.calculate(&[], &[]).points, 0);
    }
}
