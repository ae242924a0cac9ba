use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use lc360_logic::TrackingSimulation;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::TickerError;

pub type SharedSimulation = Arc<Mutex<TrackingSimulation>>;

pub struct TrackingService {
    simulation: SharedSimulation,
    period: Duration,
    stop_when_idle: bool,
    ticker: Option<JoinHandle<()>>,
}

impl TrackingService {
    /// Service ticking at the simulation's configured period.
    pub fn new(simulation: TrackingSimulation) -> Self {
        let period = simulation.config().tick_interval();
        Self {
            simulation: Arc::new(Mutex::new(simulation)),
            period,
            stop_when_idle: false,
            ticker: None,
        }
    }

    /// Override the tick period. Takes effect on the next `start`.
    /// Clamped to at least 1 ms.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// End the loop on its own once a tick advances nothing.
    pub fn stop_when_idle(mut self, stop: bool) -> Self {
        self.stop_when_idle = stop;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn simulation(&self) -> SharedSimulation {
        Arc::clone(&self.simulation)
    }

    /// Run `f` against the simulation between ticks (filtering, selection,
    /// reading markers).
    pub fn with_simulation<R>(&self, f: impl FnOnce(&mut TrackingSimulation) -> R) -> R {
        f(&mut lock(&self.simulation))
    }

    /// Start the tick loop, cancelling any loop already running.
    pub fn start(&mut self) -> Result<(), TickerError> {
        let handle = Handle::try_current().map_err(|_| TickerError::NoRuntime)?;
        if self.stop() {
            log::debug!("Restarting tick loop");
        }
        log::info!("Tick loop started ({} ms period)", self.period.as_millis());
        self.ticker = Some(handle.spawn(run_ticks(
            Arc::clone(&self.simulation),
            self.period,
            self.stop_when_idle,
        )));
        Ok(())
    }

    /// Cancel the tick loop. Returns false if none was running.
    pub fn stop(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                let was_running = !ticker.is_finished();
                ticker.abort();
                if was_running {
                    log::info!("Tick loop stopped");
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait for the loop to end. Only returns on its own when the service
    /// was built with `stop_when_idle(true)`.
    pub async fn join(&mut self) -> Result<(), TickerError> {
        match self.ticker.take() {
            Some(ticker) => match ticker.await {
                Ok(()) => Ok(()),
                Err(e) if e.is_cancelled() => Ok(()),
                Err(e) => Err(e.into()),
            },
            None => Ok(()),
        }
    }
}

impl Drop for TrackingService {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

async fn run_ticks(simulation: SharedSimulation, period: Duration, stop_when_idle: bool) {
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; simulation ticks start one period in.
    interval.tick().await;

    'tick: loop {
        interval.tick().await;
        let report = lock(&simulation).tick();
        if stop_when_idle && report.is_idle() {
            log::info!("Nothing left to move after {} ticks", report.tick);
            break 'tick;
        }
    }
}

/// A panicking observer poisons the lock mid-tick; the tracking state is
/// still consistent per shipment, so keep going with it.
fn lock(simulation: &SharedSimulation) -> MutexGuard<'_, TrackingSimulation> {
    match simulation.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Simulation lock poisoned; recovering");
            poisoned.into_inner()
        }
    }
}
