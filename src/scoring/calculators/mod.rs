mod set_pick;
mod single_pick;

pub use set_pick::SetPickCalculator;
pub use single_pick::SinglePickCalculator;

use super::models::ScoreOutcome;
use crate::category::{Category, ScoringShape};

/// Turns a prediction and the official result into points.
/// Implementations are pure: the same inputs always give the same outcome.
pub trait ScoreCalculator: Send + Sync {
    fn calculate(&self, predictions: &[String], actual: &[String]) -> ScoreOutcome;
}

pub fn calculator_for(category: Category) -> Box<dyn ScoreCalculator> {
    let rule = category.rule();
    match rule.shape {
        ScoringShape::Single { correct } => Box::new(SinglePickCalculator::new(rule.label, correct)),
        ScoringShape::Set {
            per_pilot,
            order_bonus,
        } => Box::new(SetPickCalculator::new(per_pilot, order_bonus)),
    }
}

pub fn calculate_points(category: Category, predictions: &[String], actual: &[String]) -> ScoreOutcome {
    calculator_for(category).calculate(predictions, actual)
}
