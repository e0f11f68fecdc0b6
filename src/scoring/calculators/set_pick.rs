use super::super::models::{ScoreDetail, ScoreOutcome};
use super::ScoreCalculator;
use crate::pilots;

const SET_SIZE: usize = 3;

/// Three-pick category: each predicted pilot found anywhere in the official set
/// earns `per_pilot`; matching all three positions adds `order_bonus` once
pub struct SetPickCalculator {
    per_pilot: i32,
    order_bonus: i32,
}

impl SetPickCalculator {
    pub fn new(per_pilot: i32, order_bonus: i32) -> Self {
        Self {
            per_pilot,
            order_bonus,
        }
    }
}

impl ScoreCalculator for SetPickCalculator {
    fn calculate(&self, predictions: &[String], actual: &[String]) -> ScoreOutcome {
        let mut correct: Vec<String> = Vec::new();
        for code in predictions {
            if actual.contains(code) && !correct.contains(code) {
                correct.push(code.clone());
            }
        }

        let exact_order = predictions.len() == SET_SIZE
            && correct.len() == SET_SIZE
            && predictions == actual;

        let member_points = self.per_pilot * correct.len() as i32;
        let bonus_points = if exact_order { self.order_bonus } else { 0 };

        let mut parts = Vec::new();
        if correct.is_empty() {
            parts.push("No correct pilot".to_string());
        } else {
            let names: Vec<String> = correct.iter().map(|c| pilots::display_name(c)).collect();
            parts.push(format!(
                "{} correct pilot(s): {} → +{}pts",
                correct.len(),
                names.join(", "),
                member_points
            ));
        }
        if exact_order {
            parts.push(format!("Exact order bonus → +{}pts", bonus_points));
        }

        ScoreOutcome {
            points: member_points + bonus_points,
            detail: ScoreDetail {
                correct_pilots: correct,
                bonus_exact_order: exact_order,
                breakdown: parts.join(" | "),
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
    fn partial_set_is_credited_per_pilot() {
        let calculator = SetPickCalculator::new(5, 10);
        let outcome = calculator.calculate(&codes(&["VER", "HAM", "NOR"]), &codes(&["NOR", "VER", "LEC"]));

        assert_eq!(outcome.points, 10);
        assert_eq!(outcome.detail.correct_pilots, vec!["VER", "NOR"]);
        assert!(!outcome.detail.bonus_exact_order);
        assert_eq!(
            outcome.detail.breakdown,
            "2 correct pilot(s): Max Verstappen, Lando Norris → +10pts"
        );
    }

    #[test]
    fn exact_order_adds_bonus_once() {
        let calculator = SetPickCalculator::new(3, 5);
        let podium = codes(&["NOR", "VER", "LEC"]);
        let outcome = calculator.calculate(&podium, &podium);

        assert_eq!(outcome.points, 14);
        assert!(outcome.detail.bonus_exact_order);
        assert_eq!(
            outcome.detail.breakdown,
            "3 correct pilot(s): Lando Norris, Max Verstappen, Charles Leclerc → +9pts | Exact order bonus → +5pts"
        );
    }

    #[test]
    fn no_member_scores_zero() {
        let calculator = SetPickCalculator::new(5, 10);
        let outcome = calculator.calculate(&codes(&["ALO", "STR", "GAS"]), &codes(&["NOR", "VER", "LEC"]));

        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.detail.breakdown, "No correct pilot");
    }

    #[test]
    fn duplicate_pick_counts_once() {
        let calculator = SetPickCalculator::new(5, 10);
        let outcome = calculator.calculate(&codes(&["VER", "VER", "VER"]), &codes(&["VER", "NOR", "LEC"]));
        assert_eq!(outcome.points, 5);
        assert!(!outcome.detail.bonus_exact_order);
    }
}
