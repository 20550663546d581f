use super::{Error, Hardware};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Reading returned when no distances are scripted: open space.
pub const DEFAULT_DISTANCE_CM: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Action {
    Move(f64),
    Turn(f64),
    ReadDistance(f64),
    ReadLine(bool),
    Pen(bool),
    Alert(bool),
}

/// Deterministic in-memory robot.
#[derive(Debug, Clone)]
pub struct SimulatedHardware {
    distances: Vec<f64>,
    next_distance: usize,
    line_detected: bool,
    noise: Option<(StdRng, f64)>,
    latency: Duration,
    fail_after: Option<usize>,
    calls: usize,
    history: Vec<Action>,
}

impl Default for SimulatedHardware {
    fn default() -> SimulatedHardware {
        SimulatedHardware {
            distances: vec![],
            next_distance: 0,
            line_detected: false,
            noise: None,
            latency: Duration::from_millis(0),
            fail_after: None,
            calls: 0,
            history: vec![],
        }
    }
}

impl SimulatedHardware {
    pub fn new() -> SimulatedHardware {
        SimulatedHardware::default()
    }

    /// Distance readings returned in order, cycling once exhausted.
    pub fn with_distances(mut self, distances: Vec<f64>) -> SimulatedHardware {
        self.distances = distances;
        self
    }

    pub fn with_line_sensor(mut self, detected: bool) -> SimulatedHardware {
        self.line_detected = detected;
        self
    }

    /// Adds uniform noise in `[-amplitude, amplitude]` to distance readings.
    pub fn with_noise(mut self, seed: u64, amplitude: f64) -> SimulatedHardware {
        self.noise = Some((StdRng::seed_from_u64(seed), amplitude.abs()));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> SimulatedHardware {
        self.latency = latency;
        self
    }

    /// Every call after the first `calls` fails.
    pub fn failing_after(mut self, calls: usize) -> SimulatedHardware {
        self.fail_after = Some(calls);
        self
    }

    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn moves(&self) -> Vec<f64> {
        self.history.iter()
            .filter_map(|action| match action {
                Action::Move(units) => Some(*units),
                _ => None,
            })
            .collect()
    }

    pub fn turns(&self) -> Vec<f64> {
        self.history.iter()
            .filter_map(|action| match action {
                Action::Turn(degrees) => Some(*degrees),
                _ => None,
            })
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    async fn begin(&mut self) -> Result<(), Error> {
        self.calls += 1;
        if self.fail_after.map_or(false, |limit| self.calls > limit) {
            debug!(call = self.calls, "injecting hardware failure");
            return Err(Error::Injected);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(())
    }

    fn next_distance(&mut self) -> f64 {
        let base = if self.distances.is_empty() {
            DEFAULT_DISTANCE_CM
        } else {
            let reading = self.distances[self.next_distance % self.distances.len()];
            self.next_distance += 1;
            reading
        };

        match &mut self.noise {
            Some((rng, amplitude)) if *amplitude > 0.0 => base + rng.gen_range(-*amplitude..=*amplitude),
            _ => base,
        }
    }
}

impl Hardware for SimulatedHardware {
    async fn move_by(&mut self, units: f64) -> Result<(), Error> {
        self.begin().await?;
        self.history.push(Action::Move(units));
        Ok(())
    }

    async fn turn_by(&mut self, degrees: f64) -> Result<(), Error> {
        self.begin().await?;
        self.history.push(Action::Turn(degrees));
        Ok(())
    }

    async fn read_distance(&mut self) -> Result<f64, Error> {
        self.begin().await?;
        let distance = self.next_distance();
        self.history.push(Action::ReadDistance(distance));
        Ok(distance)
    }

    async fn read_line_sensor(&mut self) -> Result<bool, Error> {
        self.begin().await?;
        self.history.push(Action::ReadLine(self.line_detected));
        Ok(self.line_detected)
    }

    async fn pen(&mut self, down: bool) -> Result<(), Error> {
        self.begin().await?;
        self.history.push(Action::Pen(down));
        Ok(())
    }

    async fn alert(&mut self, on: bool) -> Result<(), Error> {
        self.begin().await?;
        self.history.push(Action::Alert(on));
        Ok(())
    }
}
