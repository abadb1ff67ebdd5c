use futures::channel::mpsc::UnboundedSender;
use log::{debug, error, warn};
use tokio::runtime::Handle;

use crate::client::StatsClient;
use crate::error::Result;
use crate::models::{
    delta, settings, Baseline, Comparison, History, KeyValueStore, Metric, Settings, Snapshot,
    SnapshotStore,
};
use crate::poller::{Fetch, Poller, TimerId};

pub enum Msg {
    Tick(TimerId),
    Fetched { seq: u64, result: Result<Snapshot> },
}

/// Spawns a request on the runtime and posts the outcome back on the bus,
/// tagged with an increasing sequence number.
pub struct Fetcher {
    handle: Handle,
    client: StatsClient,
    bus: UnboundedSender<Msg>,
    seq: u64,
}

impl Fetcher {
    pub fn new(handle: Handle, client: StatsClient, bus: UnboundedSender<Msg>) -> Self {
        Self {
            handle,
            client,
            bus,
            seq: 0,
        }
    }
}

impl Fetch for Fetcher {
    fn fetch(&mut self) {
        self.seq += 1;

        let seq = self.seq;
        let client = self.client.clone();
        let bus = self.bus.clone();

        debug!("Fetch #{} from {}", seq, client.endpoint());

        self.handle.spawn(async move {
            let result = client.fetch().await;
            let _ = bus.unbounded_send(Msg::Fetched { seq, result });
        });
    }
}

/// All dashboard state. Only touched from the thread draining the bus.
pub struct App<F> {
    store: SnapshotStore,
    history: History,
    poller: Poller<F>,
    baseline: Baseline,
    settings: Settings,
    settings_store: Box<dyn KeyValueStore>,
    last_applied: u64,
}

impl<F: Fetch> App<F> {
    pub fn new(poller: Poller<F>, settings_store: Box<dyn KeyValueStore>) -> Self {
        let settings = settings::load(&*settings_store);

        Self {
            store: SnapshotStore::default(),
            history: History::default(),
            poller,
            baseline: Baseline::default(),
            settings,
            settings_store,
            last_applied: 0,
        }
    }

    /// Arms the timer per the loaded settings and performs the first fetch.
    pub fn start(&mut self) {
        self.poller
            .start(self.settings.refresh_interval(), self.settings.auto_refresh);
        self.poller.restart(true);
    }

    pub fn handle(&mut self, msg: Msg) {
        match msg {
            Msg::Tick(id) => self.poller.on_tick(id),
            Msg::Fetched { seq, result } => self.on_fetched(seq, result),
        }
    }

    fn on_fetched(&mut self, seq: u64, result: Result<Snapshot>) {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error fetching Wikipedia stats: {}", e);
                return;
            }
        };

        if seq <= self.last_applied {
            warn!(
                "Discarding late response #{} (already applied #{})",
                seq, self.last_applied
            );
            return;
        }

        self.last_applied = seq;
        self.history.on_snapshot(&snapshot);
        self.store.record_fetch(snapshot);
    }

    pub fn manual_refresh(&mut self) {
        self.poller.restart(true);
    }

    pub fn toggle_baseline(&mut self) {
        self.baseline = self.baseline.toggle();
    }

    pub fn track(&mut self, metric: Metric) {
        self.history.select(metric);
    }

    pub fn untrack(&mut self) {
        self.history.deselect();
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.settings.auto_refresh = !self.settings.auto_refresh;
        self.poller
            .start(self.settings.refresh_interval(), self.settings.auto_refresh);
    }

    pub fn set_refresh_interval(&mut self, secs: u64) {
        self.settings.set_refresh_interval(secs);
        self.poller
            .start(self.settings.refresh_interval(), self.settings.auto_refresh);
    }

    pub fn increase_interval(&mut self) {
        self.set_refresh_interval(self.settings.refresh_interval().saturating_add(1));
    }

    pub fn decrease_interval(&mut self) {
        self.set_refresh_interval(self.settings.refresh_interval().saturating_sub(1));
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = settings::save(&mut *self.settings_store, &self.settings) {
            error!("Failed to save settings: {}", e);
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.store.current()
    }

    pub fn comparison(&self, metric: Metric) -> Comparison {
        delta(&self.store, metric, self.baseline)
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn countdown(&self) -> Option<u64> {
        self.poller.countdown()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    #[cfg(test)]
    fn poller(&self) -> &Poller<F> {
        &self.poller
    }
}
