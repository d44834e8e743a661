pub mod builds;
pub mod situation;
pub mod swap;

pub use builds::{BuildEngine, BuildRecommendation, BuildScorer};
pub use situation::{EnemyProfile, EnemySummary, SituationKeys};
pub use swap::{recommend_swap, SwapRecommendation};
