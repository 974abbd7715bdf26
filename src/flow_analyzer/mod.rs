pub mod density_scorer;

// Re-export the items from density_scorer
pub use density_scorer::{DensityScorer, WeightTable};
