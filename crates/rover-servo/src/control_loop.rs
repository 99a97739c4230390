//! The frame → observation → command cycle.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use rover_servo_approach::{
    execute, ApproachMachine, ApproachState, ChannelError, CommandSink, StepOutcome,
};
use rover_servo_core::{Observation, RgbImage};
use rover_servo_vision::{FrameEstimate, NavigationEstimator};
use serde::Serialize;

use crate::annotate::{annotate, save_annotated};
use crate::config::{ConfigError, ServoConfig};
use crate::frame::{to_image_rgb, FrameError, FrameSource};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why [`ControlLoop::run`] returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Interrupted,
    FramesExhausted,
    CycleLimit,
}

#[derive(Clone, Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub estimate: FrameEstimate,
    pub outcome: StepOutcome,
    pub annotated: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub cycles: u64,
    /// Cycles that produced a navigation vector.
    pub solved: u64,
    pub final_state: ApproachState,
    pub stopped_by: StopReason,
}

/// Owns the frame source, the actuator sink and the approach state for one run.
pub struct ControlLoop<F, S> {
    frames: F,
    sink: S,
    estimator: NavigationEstimator,
    machine: ApproachMachine,
    annotate_dir: Option<PathBuf>,
    max_cycles: Option<u64>,
    cycle: u64,
}

impl<F: FrameSource, S: CommandSink> ControlLoop<F, S> {
    pub fn new(config: &ServoConfig, frames: F, sink: S) -> Self {
        Self {
            frames,
            sink,
            estimator: NavigationEstimator::new(config.localizer.clone()),
            machine: ApproachMachine::new(config.approach),
            annotate_dir: config.annotate_dir.clone(),
            max_cycles: None,
            cycle: 0,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn machine(&self) -> &ApproachMachine {
        &self.machine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Localize one frame, step the machine, and send its commands.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, frame), fields(cycle = self.cycle)))]
    pub fn run_cycle(&mut self, frame: &RgbImage) -> Result<CycleReport, ServoError> {
        let cycle = self.cycle;
        self.cycle += 1;

        let estimate = self.estimator.estimate(&frame.view());
        match &estimate.observation {
            Observation::Navigation(_) => {}
            Observation::MissingMarker { profile } => {
                warn!("cycle {cycle}: {profile} marker not found, stopping")
            }
            Observation::Implausible { spread_px } => {
                warn!("cycle {cycle}: markers {spread_px:.1} px apart, stopping")
            }
            Observation::TargetLost => warn!("cycle {cycle}: target not found"),
        }

        let outcome = self.machine.step(&estimate.observation);
        execute(&outcome.actions, &mut self.sink)?;

        let annotated = match (&self.annotate_dir, estimate.observation.navigation()) {
            (Some(dir), Some(_)) => self.write_annotation(dir, cycle, frame, &estimate),
            _ => None,
        };

        Ok(CycleReport {
            cycle,
            estimate,
            outcome,
            annotated,
        })
    }

    /// Overlay failures are logged and skipped; they never stop the loop.
    fn write_annotation(
        &self,
        dir: &Path,
        cycle: u64,
        frame: &RgbImage,
        estimate: &FrameEstimate,
    ) -> Option<PathBuf> {
        let mut img = to_image_rgb(frame)?;
        annotate(&mut img, estimate, &self.estimator.params().markers);
        match save_annotated(dir, cycle, &img) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(
                    "cycle {cycle}: annotated frame not written to {}: {err}",
                    dir.display()
                );
                None
            }
        }
    }

    /// Run until `stop` is set, the frames run out, or the cycle limit is hit.
    ///
    /// Forks are lowered before the first cycle and the sink is closed on every
    /// exit path, including errors.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<RunSummary, ServoError> {
        info!("control loop starting");
        let result = self.run_inner(stop);
        let closed = self.sink.close();
        let summary = result?;
        closed?;
        info!(
            "control loop stopped ({:?}) after {} cycles, {} solved",
            summary.stopped_by, summary.cycles, summary.solved
        );
        Ok(summary)
    }

    fn run_inner(&mut self, stop: &AtomicBool) -> Result<RunSummary, ServoError> {
        execute(&self.machine.startup_actions(), &mut self.sink)?;

        let mut cycles = 0;
        let mut solved = 0;
        let stopped_by = loop {
            if stop.load(Ordering::Relaxed) {
                break StopReason::Interrupted;
            }
            if self.max_cycles.is_some_and(|max| cycles >= max) {
                break StopReason::CycleLimit;
            }
            let Some(frame) = self.frames.next_frame()? else {
                break StopReason::FramesExhausted;
            };
            let report = self.run_cycle(&frame)?;
            cycles += 1;
            if report.estimate.observation.navigation().is_some() {
                solved += 1;
            }
        };

        Ok(RunSummary {
            cycles,
            solved,
            final_state: self.machine.state(),
            stopped_by,
        })
    }
}
