use futures::channel::mpsc::UnboundedSender;
use log::debug;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::app::Msg;
use crate::models::settings::DEFAULT_REFRESH_INTERVAL;

pub type TimerId = u64;

/// Starts one snapshot request. Completion is reported asynchronously.
pub trait Fetch {
    fn fetch(&mut self);
}

struct Timer {
    id: TimerId,
    task: JoinHandle<()>,
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Owns the refresh countdown and at most one one-second ticking task.
pub struct Poller<F> {
    handle: Handle,
    bus: UnboundedSender<Msg>,
    fetcher: F,
    interval: u64,
    enabled: bool,
    countdown: u64,
    next_id: TimerId,
    timer: Option<Timer>,
}

impl<F: Fetch> Poller<F> {
    pub fn new(handle: Handle, bus: UnboundedSender<Msg>, fetcher: F) -> Self {
        Self {
            handle,
            bus,
            fetcher,
            interval: DEFAULT_REFRESH_INTERVAL,
            enabled: false,
            countdown: DEFAULT_REFRESH_INTERVAL,
            next_id: 0,
            timer: None,
        }
    }

    pub fn start(&mut self, interval_secs: u64, enabled: bool) {
        self.stop();
        self.interval = interval_secs.max(1);
        self.enabled = enabled;
        self.countdown = self.interval;

        if enabled {
            self.arm();
        }
    }

    pub fn restart(&mut self, manual: bool) {
        self.stop();

        if manual {
            debug!("Manual refresh requested");
            self.fetcher.fetch();
        }

        self.countdown = self.interval;

        if self.enabled {
            self.arm();
        }
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!("Cancelling timer {}", timer.id);
        }
    }

    pub fn on_tick(&mut self, id: TimerId) {
        match self.timer.as_ref() {
            Some(timer) if timer.id == id => {}
            _ => {
                debug!("Ignoring tick from cancelled timer {}", id);
                return;
            }
        }

        if self.countdown <= 1 {
            self.countdown = self.interval;
            self.fetcher.fetch();
        } else {
            self.countdown -= 1;
        }
    }

    /// Seconds until the next automatic refresh, `None` while disarmed.
    pub fn countdown(&self) -> Option<u64> {
        self.timer.as_ref().map(|_| self.countdown)
    }

    pub fn active_timer(&self) -> Option<TimerId> {
        self.timer.as_ref().map(|timer| timer.id)
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn arm(&mut self) {
        self.next_id += 1;
        let id = self.next_id;

        debug!("Arming timer {} ({}s interval)", id, self.interval);

        let task = self.handle.spawn(ticking_loop(id, self.bus.clone()));
        self.timer = Some(Timer { id, task });
    }
}

async fn ticking_loop(id: TimerId, bus: UnboundedSender<Msg>) {
    let period = Duration::from_secs(1);
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    loop {
        interval.tick().await;

        if bus.unbounded_send(Msg::Tick(id)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use futures::channel::mpsc::{self, UnboundedReceiver};
    use futures::StreamExt;

    #[derive(Default)]
    pub struct Counter(pub usize);

    impl Fetch for Counter {
        fn fetch(&mut self) {
            self.0 += 1;
        }
    }

    fn poller() -> (Poller<Counter>, UnboundedReceiver<Msg>) {
        let (bus, recv) = mpsc::unbounded();

        (Poller::new(Handle::current(), bus, Counter::default()), recv)
    }

    #[tokio::test]
    async fn disabled_poller_never_arms() {
        let (mut poller, _recv) = poller();
        poller.start(10, false);

        assert!(poller.active_timer().is_none());
        assert!(poller.countdown().is_none());

        poller.restart(true);

        assert_eq!(poller.fetcher().0, 1);
        assert!(poller.active_timer().is_none());
    }

    #[tokio::test]
    async fn fetches_when_countdown_runs_out() {
        let (mut poller, _recv) = poller();
        poller.start(3, true);
        let id = poller.active_timer().unwrap();

        assert_eq!(poller.countdown(), Some(3));
        poller.on_tick(id);
        assert_eq!(poller.countdown(), Some(2));
        poller.on_tick(id);
        assert_eq!(poller.countdown(), Some(1));
        assert_eq!(poller.fetcher().0, 0);

        poller.on_tick(id);
        assert_eq!(poller.fetcher().0, 1);
        assert_eq!(poller.countdown(), Some(3));
    }

    #[tokio::test]
    async fn manual_refresh_resets_countdown() {
        let (mut poller, _recv) = poller();
        poller.start(10, true);

        for _ in 0..4 {
            poller.on_tick(poller.active_timer().unwrap());
        }
        assert_eq!(poller.countdown(), Some(6));

        poller.restart(true);

        assert_eq!(poller.countdown(), Some(10));
        assert_eq!(poller.fetcher().0, 1);
    }

    #[tokio::test]
    async fn ticks_from_cancelled_timer_are_ignored() {
        let (mut poller, _recv) = poller();
        poller.start(10, true);
        let stale = poller.active_timer().unwrap();

        poller.restart(false);
        poller.on_tick(stale);

        assert_ne!(poller.active_timer(), Some(stale));
        assert_eq!(poller.countdown(), Some(10));
    }

    #[tokio::test]
    async fn interval_is_at_least_one_second() {
        let (mut poller, _recv) = poller();
        poller.start(0, true);
        let id = poller.active_timer().unwrap();

        poller.on_tick(id);
        assert_eq!(poller.fetcher().0, 1);
        assert_eq!(poller.countdown(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_restarts_leave_one_timer() {
        let (mut poller, mut recv) = poller();
        poller.start(2, true);
        poller.restart(false);
        poller.restart(false);
        let active = poller.active_timer().unwrap();

        for _ in 0..4 {
            match recv.next().await {
                Some(Msg::Tick(id)) => {
                    assert_eq!(id, active);
                    poller.on_tick(id);
                }
                _ => panic!("expected a tick"),
            }
        }

        assert_eq!(poller.fetcher().0, 2);
        assert!(recv.try_next().is_err());
    }
}
