use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::{api::Region, core::snapshot::Snapshot, quantity::money::Currency};

/// Dashboard state.
pub struct App {
    pub region: Region,
    pub currency: Currency,
    pub snapshot: Snapshot,

    /// When the snapshot was fetched, `None` until the first refresh completes.
    pub updated_at: Option<DateTime<Local>>,

    pub is_loading: bool,
    pub quit: bool,

    refresh: Duration,
    refresh_requested: bool,
    last_refresh: Option<Instant>,
}

impl App {
    pub fn new(region: Region, refresh: Duration) -> Self {
        Self {
            region,
            currency: region.currency(),
            snapshot: Snapshot::default(),
            updated_at: None,
            is_loading: false,
            quit: false,
            refresh,
            refresh_requested: false,
            last_refresh: None,
        }
    }

    pub fn is_refresh_due(&self) -> bool {
        self.refresh_requested
            || self.last_refresh.is_none_or(|last_refresh| last_refresh.elapsed() >= self.refresh)
    }

    pub const fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    pub fn update(&mut self, snapshot: Snapshot, now: DateTime<Local>) {
        self.snapshot = snapshot;
        self.updated_at = Some(now);
        self.is_loading = false;
        self.refresh_requested = false;
        self.last_refresh = Some(Instant::now());
    }
}
