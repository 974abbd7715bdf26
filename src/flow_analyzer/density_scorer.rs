use crate::error::EngineError;
use crate::shared_data::{DensityScore, LaneReading, TrafficClass};
use crate::simulation_engine::profiles::{JitterBand, Profile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-class weights used in the density sum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightTable {
    weights: BTreeMap<TrafficClass, f64>,
}

impl WeightTable {
    pub fn from_pairs(pairs: &[(TrafficClass, f64)]) -> Self {
        Self {
            weights: pairs.iter().copied().collect(),
        }
    }

    /// Weight of `class`; classes outside the table weigh nothing.
    pub fn weight(&self, class: TrafficClass) -> f64 {
        self.weights.get(&class).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrafficClass, f64)> + '_ {
        self.weights.iter().map(|(&class, &weight)| (class, weight))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (class, weight) in self.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::invalid(format!(
                    "weight for {} must be a non-negative number, got {}",
                    class, weight
                )));
            }
        }
        Ok(())
    }
}

/// Turns readings into density scores.
#[derive(Debug, Clone)]
pub struct DensityScorer {
    weights: WeightTable,
    jitter: Option<JitterBand>,
}

impl DensityScorer {
    pub fn new(weights: WeightTable, jitter: Option<JitterBand>) -> Self {
        Self { weights, jitter }
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::new(profile.weights.clone(), profile.jitter)
    }

    /// Same scorer with jitter switched off.
    pub fn deterministic(mut self) -> Self {
        self.jitter = None;
        self
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// `None` when scores are left unperturbed.
    pub fn jitter_band(&self) -> Option<&JitterBand> {
        self.jitter.as_ref()
    }

    /// Weighted sum of the reading's counts. Pure: equal readings give equal scores.
    pub fn score(&self, reading: &LaneReading) -> DensityScore {
        let total: f64 = reading
            .counts
            .iter()
            .map(|(&class, &count)| self.weights.weight(class) * count as f64)
            .sum();
        DensityScore::new(total)
    }

    /// Multiplies an already computed score by a jitter factor.
    ///
    /// The factor is clamped to the configured band; without a band the score
    /// comes back unchanged.
    pub fn apply_jitter(&self, base: DensityScore, factor: f64) -> DensityScore {
        match &self.jitter {
            Some(band) => DensityScore::new(base.value() * band.clamp(factor).max(0.0)),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::LaneId;

    fn example_scorer() -> DensityScorer {
        DensityScorer::new(
            WeightTable::from_pairs(&[
                (TrafficClass::Car, 1.0),
                (TrafficClass::Truck, 2.5),
                (TrafficClass::Pedestrian, 0.3),
            ]),
            None,
        )
    }

    fn reading(light: u32, heavy: u32, ped: u32) -> LaneReading {
        LaneReading::new(LaneId::from("L"))
            .with_count(TrafficClass::Car, light)
            .with_count(TrafficClass::Truck, heavy)
            .with_count(TrafficClass::Pedestrian, ped)
    }

    #[test]
    fn weighted_sum_matches_table() {
        let scorer = example_scorer();
        assert_eq!(scorer.score(&reading(10, 0, 0)).value(), 10.0);
        assert_eq!(scorer.score(&reading(0, 4, 0)).value(), 10.0);
        assert!((scorer.score(&reading(5, 1, 10)).value() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = DensityScorer::for_profile(&Profile::extended()).deterministic();
        let r = LaneReading::new(LaneId::from("Lane_1"))
            .with_count(TrafficClass::Car, 17)
            .with_count(TrafficClass::Bus, 4)
            .with_count(TrafficClass::Motorcycle, 9);
        let first = scorer.score(&r);
        for _ in 0..20 {
            assert_eq!(scorer.score(&r), first);
        }
    }

    #[test]
    fn score_is_monotone_in_every_count() {
        let scorer = DensityScorer::for_profile(&Profile::extended());
        let base = LaneReading::new(LaneId::from("Lane_1"))
            .with_count(TrafficClass::Car, 10)
            .with_count(TrafficClass::Truck, 3)
            .with_count(TrafficClass::Pedestrian, 5)
            .with_count(TrafficClass::Bicycle, 2)
            .with_count(TrafficClass::Motorcycle, 3)
            .with_count(TrafficClass::Bus, 1);
        let before = scorer.score(&base);
        for class in base.counts.keys().copied().collect::<Vec<_>>() {
            for bump in [1, 5, 40] {
                let mut more = base.clone();
                more.counts.insert(class, base.count(class) + bump);
                assert!(scorer.score(&more) >= before, "{} decreased the score", class);
            }
        }
    }

    #[test]
    fn unweighted_classes_contribute_nothing() {
        let scorer = DensityScorer::for_profile(&Profile::basic());
        let r = reading(2, 1, 4).with_count(TrafficClass::Bus, 50);
        assert_eq!(scorer.score(&r).value(), 2.0 + 2.0 + 2.0);
    }

    #[test]
    fn jitter_is_separate_and_clamped() {
        let scorer = DensityScorer::for_profile(&Profile::extended());
        let base = DensityScore::new(100.0);
        assert!((scorer.apply_jitter(base, 1.1).value() - 110.0).abs() < 1e-9);
        assert!((scorer.apply_jitter(base, 5.0).value() - 120.0).abs() < 1e-9);
        assert!((scorer.apply_jitter(base, -1.0).value() - 80.0).abs() < 1e-9);

        let plain = scorer.deterministic();
        assert!(plain.jitter_band().is_none());
        assert_eq!(plain.apply_jitter(base, 1.2), base);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let table = WeightTable::from_pairs(&[(TrafficClass::Car, -1.0)]);
        assert!(table.validate().is_err());
    }
}
