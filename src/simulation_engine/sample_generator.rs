// simulation_engine/sample_generator.rs
use crate::error::EngineError;
use crate::shared_data::{LaneId, LaneReading};
use crate::simulation_engine::profiles::{JitterBand, Profile};
use chrono::{NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Where the cycle reporter gets its readings and jitter factors from.
pub trait ReadingSource {
    fn profile(&self) -> &Profile;

    /// One reading per lane, in the order of `lanes`.
    fn readings(
        &mut self,
        lanes: &[LaneId],
        clock: Option<NaiveDateTime>,
    ) -> Result<Vec<LaneReading>, EngineError>;

    fn jitter(&mut self, band: &JitterBand) -> f64;
}

/// Draws synthetic per-lane readings for one profile.
///
/// The generator is the only owner of the random source; anything else that
/// needs randomness (score jitter) asks the generator for it.
pub struct SampleGenerator<R: RngCore = StdRng> {
    profile: Profile,
    rng: R,
}

impl SampleGenerator<StdRng> {
    /// Reproducible generator: the same seed yields the same readings.
    pub fn seeded(profile: Profile, seed: u64) -> Self {
        Self::with_rng(profile, StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system's entropy source.
    pub fn from_entropy(profile: Profile) -> Result<Self, EngineError> {
        let rng = StdRng::try_from_os_rng()
            .map_err(|e| EngineError::GenerationFailure(format!("entropy source unavailable: {}", e)))?;
        Ok(Self::with_rng(profile, rng))
    }
}

impl<R: RngCore> SampleGenerator<R> {
    pub fn with_rng(profile: Profile, rng: R) -> Self {
        Self { profile, rng }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// One reading per lane, in the order of `lanes`.
    ///
    /// When `clock` falls in a rush window every drawn count is scaled by the
    /// window's multiplier and rounded half-to-even.
    pub fn generate(&mut self, lanes: &[LaneId], clock: Option<NaiveDateTime>) -> Vec<LaneReading> {
        let multiplier = clock
            .map(|at| self.profile.multiplier_at(at.hour()))
            .unwrap_or(1.0);

        let mut readings = Vec::with_capacity(lanes.len());
        for lane in lanes {
            let mut reading = LaneReading::new(lane.clone());
            for range in &self.profile.ranges {
                let drawn = self.rng.random_range(range.min..=range.max);
                reading
                    .counts
                    .insert(range.class, scale_count(drawn, multiplier));
            }
            readings.push(reading);
        }
        readings
    }

    /// One jitter factor drawn uniformly from `band`.
    pub fn draw_jitter(&mut self, band: &JitterBand) -> f64 {
        if band.low >= band.high {
            return band.low;
        }
        self.rng.random_range(band.low..=band.high)
    }
}

impl<R: RngCore> ReadingSource for SampleGenerator<R> {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn readings(
        &mut self,
        lanes: &[LaneId],
        clock: Option<NaiveDateTime>,
    ) -> Result<Vec<LaneReading>, EngineError> {
        Ok(self.generate(lanes, clock))
    }

    fn jitter(&mut self, band: &JitterBand) -> f64 {
        self.draw_jitter(band)
    }
}

/// Applies a rush multiplier to a drawn count.
pub fn scale_count(count: u32, multiplier: f64) -> u32 {
    if multiplier == 1.0 {
        return count;
    }
    (count as f64 * multiplier).round_ties_even().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow_analyzer::density_scorer::WeightTable;
    use crate::shared_data::TrafficClass;
    use crate::simulation_engine::profiles::{CountRange, RushWindow};
    use chrono::NaiveDate;

    fn at_hour(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .and_then(|d| d.and_hms_opt(hour, 30, 0))
            .expect("valid time")
    }

    fn fixed_profile(count: u32) -> Profile {
        Profile::new(
            "fixed",
            vec![LaneId::from("L1")],
            vec![
                CountRange {
                    class: TrafficClass::Car,
                    min: count,
                    max: count,
                },
                CountRange {
                    class: TrafficClass::Truck,
                    min: count,
                    max: count,
                },
            ],
            WeightTable::from_pairs(&[(TrafficClass::Car, 1.0), (TrafficClass::Truck, 2.0)]),
        )
    }

    #[test]
    fn empty_lane_list_yields_no_readings() {
        let mut generator = SampleGenerator::seeded(Profile::basic(), 7);
        assert!(generator.generate(&[], None).is_empty());
    }

    #[test]
    fn readings_follow_lane_order_and_ranges() {
        let profile = Profile::extended();
        let lanes = profile.lanes.clone();
        let mut generator = SampleGenerator::seeded(profile.clone(), 42);
        for _ in 0..50 {
            let readings = generator.generate(&lanes, Some(at_hour(13)));
            assert_eq!(readings.len(), lanes.len());
            for (reading, lane) in readings.iter().zip(&lanes) {
                assert_eq!(&reading.lane, lane);
                assert_eq!(reading.counts.len(), profile.ranges.len());
                for range in &profile.ranges {
                    let count = reading.count(range.class);
                    assert!(count >= range.min && count <= range.max, "{} out of range", range.class);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_readings() {
        let lanes = Profile::basic().lanes;
        let mut a = SampleGenerator::seeded(Profile::basic(), 99);
        let mut b = SampleGenerator::seeded(Profile::basic(), 99);
        for _ in 0..10 {
            assert_eq!(a.generate(&lanes, None), b.generate(&lanes, None));
        }
    }

    #[test]
    fn rush_hour_scales_counts() {
        let profile = fixed_profile(5).with_rush_windows(vec![RushWindow {
            start_hour: 7,
            end_hour: 10,
            multiplier: 1.5,
        }]);
        let lanes = profile.lanes.clone();
        let mut generator = SampleGenerator::seeded(profile, 1);

        let quiet = generator.generate(&lanes, Some(at_hour(12)));
        assert_eq!(quiet[0].count(TrafficClass::Car), 5);

        // 5 * 1.5 = 7.5 rounds to the even neighbour
        let rush = generator.generate(&lanes, Some(at_hour(8)));
        assert_eq!(rush[0].count(TrafficClass::Car), 8);
        assert_eq!(rush[0].count(TrafficClass::Truck), 8);

        let no_clock = generator.generate(&lanes, None);
        assert_eq!(no_clock[0].count(TrafficClass::Car), 5);
    }

    #[test]
    fn scale_count_rounds_half_to_even() {
        assert_eq!(scale_count(3, 1.5), 4); // 4.5
        assert_eq!(scale_count(5, 1.5), 8); // 7.5
        assert_eq!(scale_count(5, 1.8), 9); // 9.0
        assert_eq!(scale_count(25, 1.8), 45);
        assert_eq!(scale_count(7, 1.0), 7);
        assert_eq!(scale_count(0, 1.8), 0);
    }

    #[test]
    fn jitter_stays_in_band() {
        let band = JitterBand { low: 0.8, high: 1.2 };
        let mut generator = SampleGenerator::seeded(Profile::extended(), 3);
        for _ in 0..200 {
            let factor = generator.draw_jitter(&band);
            assert!((0.8..=1.2).contains(&factor));
        }
        let flat = JitterBand { low: 1.0, high: 1.0 };
        assert_eq!(generator.draw_jitter(&flat), 1.0);
    }
}
