use super::scorer::CandidateScore;
use nalgebra::{Unit, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerState {
    #[default]
    Idle,
    Sweeping,
    Converged,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestCandidate {
    pub normal: Unit<Vector3<f64>>,
    pub score: CandidateScore,
}

impl BestCandidate {
    pub fn improves_on(score: &CandidateScore, current: Option<&BestCandidate>) -> bool {
        score.success && current.is_none_or(|best| score.q_value > best.score.q_value)
    }
}
