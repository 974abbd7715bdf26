use crate::config::{validate_lanes, EngineConfig};
use crate::control_system::signal_allocator::allocate;
use crate::error::EngineError;
use crate::flow_analyzer::density_scorer::DensityScorer;
use crate::monitoring::sinks::SnapshotSink;
use crate::shared_data::{LaneId, LaneStatus, Snapshot};
use crate::simulation_engine::sample_generator::{ReadingSource, SampleGenerator};
use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Where a cycle gets its timestamp from.
pub trait ClockSource {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl ClockSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Runs generate → score → allocate and packages the result as a [`Snapshot`].
pub struct CycleReporter<G: ReadingSource = SampleGenerator<StdRng>> {
    lanes: Vec<LaneId>,
    interval: Duration,
    generator: G,
    scorer: DensityScorer,
    next_cycle: u64,
}

impl CycleReporter<SampleGenerator<StdRng>> {
    /// Validates `config` and builds the session. Nothing runs if this fails.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let profile = config.resolved_profile();
        let generator = match config.seed {
            Some(seed) => SampleGenerator::seeded(profile, seed),
            None => SampleGenerator::from_entropy(profile)?,
        };
        Self::with_generator(config.lanes(), config.refresh_interval()?, generator)
    }
}

impl<G: ReadingSource> CycleReporter<G> {
    pub fn with_generator(
        lanes: Vec<LaneId>,
        interval: Duration,
        generator: G,
    ) -> Result<Self, EngineError> {
        validate_lanes(&lanes)?;
        if interval.is_zero() {
            return Err(EngineError::invalid("refresh interval must be positive"));
        }
        generator.profile().validate()?;
        let scorer = DensityScorer::for_profile(generator.profile());
        Ok(Self {
            lanes,
            interval,
            generator,
            scorer,
            next_cycle: 1,
        })
    }

    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn scorer(&self) -> &DensityScorer {
        &self.scorer
    }

    /// One full cycle stamped with `clock`. Performs no I/O.
    pub fn run_once(&mut self, clock: NaiveDateTime) -> Result<Snapshot, EngineError> {
        let readings = self.generator.readings(&self.lanes, Some(clock))?;
        if readings.len() != self.lanes.len() {
            return Err(EngineError::GenerationFailure(format!(
                "expected {} readings, got {}",
                self.lanes.len(),
                readings.len()
            )));
        }

        let mut scored = Vec::with_capacity(readings.len());
        for reading in readings {
            let weighted_sum = self.scorer.score(&reading);
            let jitter_factor = match self.scorer.jitter_band() {
                Some(band) => self.generator.jitter(band),
                None => 1.0,
            };
            let score = self.scorer.apply_jitter(weighted_sum, jitter_factor);
            scored.push((reading, weighted_sum, jitter_factor, score));
        }

        let scores: Vec<_> = scored
            .iter()
            .map(|(reading, _, _, score)| (reading.lane.clone(), *score))
            .collect();
        let signals = allocate(&scores);

        let lanes = scored
            .into_iter()
            .zip(signals)
            .map(|((reading, weighted_sum, jitter_factor, score), (_, signal))| LaneStatus {
                reading,
                weighted_sum,
                jitter_factor,
                score,
                signal,
            })
            .collect();

        let snapshot = Snapshot {
            cycle: self.next_cycle,
            profile: self.generator.profile().name.clone(),
            captured_at: clock,
            classes: self.generator.profile().classes(),
            lanes,
        };
        self.next_cycle += 1;

        log::debug!(
            "Cycle {} produced {} lanes, green = {:?}",
            snapshot.cycle,
            snapshot.lanes.len(),
            snapshot.green_lane()
        );
        Ok(snapshot)
    }

    /// Repeats [`run_once`](Self::run_once) until `shutdown` turns true or its sender is dropped.
    ///
    /// Each snapshot is delivered to `sink` before the interval sleep starts.
    /// Failures of a cycle or of the sink are logged and the next cycle runs on
    /// schedule. Returns the number of cycles completed; a cycle whose
    /// `run_once` failed is not counted, one whose delivery failed is.
    pub async fn run_forever<C, S>(
        &mut self,
        clock: &C,
        sink: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> u64
    where
        C: ClockSource + ?Sized,
        S: SnapshotSink + ?Sized,
    {
        let mut cycles = 0;
        log::info!(
            "Live monitor started for {} lanes, refreshing every {:?}",
            self.lanes.len(),
            self.interval
        );
        loop {
            if stop_requested(&shutdown) {
                break;
            }

            match self.run_once(clock.now()) {
                Ok(snapshot) => {
                    if let Err(e) = sink.deliver(&snapshot) {
                        log::error!("Cycle {}: {}", snapshot.cycle(), e);
                    }
                    cycles += 1;
                }
                Err(e) => log::error!("Cycle skipped: {}", e),
            }

            if wait_or_stop(self.interval, &mut shutdown).await {
                break;
            }
        }
        log::info!("Live monitor stopped after {} cycles", cycles);
        cycles
    }
}

/// True once the flag is set or the sender is gone.
fn stop_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Sleeps for `interval`; returns true if a stop was requested meanwhile.
async fn wait_or_stop(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let pause = sleep(interval);
    tokio::pin!(pause);
    loop {
        tokio::select! {
            _ = &mut pause => return false,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return true;
                }
            }
        }
    }
}
