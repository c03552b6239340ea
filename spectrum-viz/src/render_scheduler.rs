#[cfg(feature = "logging")]
use defmt::info;
#[cfg(feature = "logging")]
use defmt_rtt as _;

use crate::config::{MAX_REFRESH_INTERVAL_MS, MIN_REFRESH_INTERVAL_MS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Gates the per-tick pipeline so it only runs while useful.
///
/// Ticks fire only while attached, the display surface is visible, the
/// host window is active, and there is something to animate: either the
/// source is playing or some bar's peak has not yet settled. Detaching
/// always stops the timer and clears the registration, so a torn-down
/// host can never receive a stale tick.
///
/// The scheduler owns no clock. The host feeds elapsed wall time into
/// [`advance`](RenderScheduler::advance) on its render timeline; at most
/// one tick is reported per call, and each tick is expected to run the
/// whole pipeline before the next `advance`.
#[derive(Clone, Debug)]
pub struct RenderScheduler {
    state: SchedulerState,
    interval_ms: u32,
    elapsed_ms: u32,
    attached: bool,
    surface_visible: bool,
    window_active: bool,
}

impl RenderScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            state: SchedulerState::Stopped,
            interval_ms: interval_ms.clamp(MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS),
            elapsed_ms: 0,
            attached: false,
            surface_visible: false,
            window_active: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn set_interval_ms(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms.clamp(MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS);
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Register with the host. Idempotent; ticks still wait for the
    /// visibility gates and a reason to animate.
    pub fn attach(&mut self) {
        self.attached = true;
        #[cfg(feature = "logging")]
        info!("render scheduler attached");
    }

    /// Unregister from the host. Always stops the timer and drops the
    /// visibility gates so nothing fires after teardown.
    pub fn detach(&mut self) {
        self.attached = false;
        self.surface_visible = false;
        self.window_active = false;
        self.stop();
        #[cfg(feature = "logging")]
        info!("render scheduler detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_surface_visible(&mut self, visible: bool) {
        self.surface_visible = visible;
    }

    pub fn set_window_active(&mut self, active: bool) {
        self.window_active = active;
    }

    /// Apply the start/stop conditions to the current gate and animation
    /// state. Called after every host event and at the end of every tick.
    pub fn reevaluate(&mut self, playing: bool, peaks_settled: bool) {
        let gates_open = self.attached && self.surface_visible && self.window_active;
        match self.state {
            SchedulerState::Stopped => {
                if gates_open && (playing || !peaks_settled) {
                    self.state = SchedulerState::Running;
                    self.elapsed_ms = 0;
                    #[cfg(feature = "logging")]
                    info!("render scheduler running");
                }
            }
            SchedulerState::Running => {
                if !gates_open || (!playing && peaks_settled) {
                    self.stop();
                }
            }
        }
    }

    /// Stop unconditionally; used when the host tears a collaborator down
    /// outside the normal gate flow.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            #[cfg(feature = "logging")]
            info!("render scheduler stopped");
        }
        self.state = SchedulerState::Stopped;
        self.elapsed_ms = 0;
    }

    /// Account for `elapsed_ms` of wall time; returns whether a tick is
    /// due. Backlog beyond one interval is discarded rather than burst:
    /// ticks never overlap and never run back to back to catch up.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        if self.state != SchedulerState::Running {
            return false;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms = 0;
            true
        } else {
            false
        }
    }
}
