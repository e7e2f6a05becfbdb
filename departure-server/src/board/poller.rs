//! Background refresh of one station's board.
//!
//! Every board has its own task. It runs a cycle (resolve station, fetch,
//! transform, publish) immediately and then on a fixed interval; cycles of a
//! board never overlap. Once every [`BoardHandle`] is dropped the task stops,
//! and an in-flight cycle is dropped unpublished.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::domain::{Station, StationQuery};
use crate::mvg::{TransitApi, first_station};
use crate::stations::StationDirectory;

use super::error::BoardError;
use super::snapshot::BoardSnapshot;
use super::transform::{TransformOptions, transform_with};

/// Configuration for the board poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between cycles.
    pub interval: Duration,
    /// Departures requested per cycle.
    pub limit: u16,
    /// Drop cancelled departures before transforming.
    pub hide_cancelled: bool,
    pub transform: TransformOptions,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            limit: 20,
            hide_cancelled: false,
            transform: TransformOptions::default(),
        }
    }
}

/// Handle to a running board.
///
/// Cheap to clone; the poller stops once every handle is dropped.
#[derive(Clone)]
pub struct BoardHandle {
    query: StationQuery,
    snapshots: watch::Receiver<Arc<BoardSnapshot>>,
}

impl BoardHandle {
    /// The station this board shows.
    pub fn query(&self) -> &StationQuery {
        &self.query
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Arc<BoardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Wait until the first cycle has finished, at most `timeout`. Returns
    /// the current snapshot either way.
    pub async fn wait_ready(&self, timeout: Duration) -> Arc<BoardSnapshot> {
        let mut rx = self.snapshots.clone();
        let ready = tokio::time::timeout(timeout, async move {
            rx.wait_for(|s| !s.loading).await.map(|s| (*s).clone())
        })
        .await;

        match ready {
            Ok(Ok(snapshot)) => snapshot,
            _ => self.current(),
        }
    }
}

/// Start a board for `query` and return a handle to it.
///
/// Must be called within a tokio runtime.
pub fn spawn(
    api: Arc<dyn TransitApi>,
    directory: StationDirectory,
    config: PollerConfig,
    query: StationQuery,
) -> BoardHandle {
    let (snapshot_tx, snapshot_rx) =
        watch::channel(Arc::new(BoardSnapshot::loading(query.clone())));

    let poller = Poller {
        api,
        directory,
        config,
        query: query.clone(),
        snapshots: snapshot_tx,
    };
    tokio::spawn(poller.run());

    BoardHandle {
        query,
        snapshots: snapshot_rx,
    }
}

struct Poller {
    api: Arc<dyn TransitApi>,
    directory: StationDirectory,
    config: PollerConfig,
    query: StationQuery,
    snapshots: watch::Sender<Arc<BoardSnapshot>>,
}

impl Poller {
    async fn run(self) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        let mut resolved: Option<Station> = None;
        let mut cycles: u64 = 0;
        tracing::info!(station = %self.query, "board poller started");

        loop {
            cycles += 1;
            tokio::select! {
                (snapshot, station) = self.cycle(cycles, resolved.take()) => {
                    resolved = station;
                    self.publish(snapshot);
                }
                _ = self.snapshots.closed() => break,
            }

            tokio::select! {
                _ = interval.tick() => {}
                _ = self.snapshots.closed() => break,
            }
        }

        tracing::debug!(station = %self.query, "board poller stopped");
    }

    fn publish(&self, snapshot: BoardSnapshot) {
        self.snapshots.send_replace(Arc::new(snapshot));
    }

    /// One refresh. Returns the snapshot and the station to reuse next time.
    async fn cycle(
        &self,
        cycle: u64,
        resolved: Option<Station>,
    ) -> (BoardSnapshot, Option<Station>) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let query = self.query.clone();

        let station = match resolved {
            Some(station) => station,
            None => match self.resolve(&self.query).await {
                Ok(station) => station,
                Err(error) => {
                    tracing::warn!(station = %query, code = error.code(), "station resolution failed");
                    return (
                        BoardSnapshot::failed(cycle, query, None, error, now_ms),
                        None,
                    );
                }
            },
        };

        let mut departures = match self
            .api
            .departures(&station.global_id, self.config.limit)
            .await
        {
            Ok(departures) => departures,
            Err(e) => {
                let error = BoardError::from_fetch(&e);
                tracing::warn!(station = %station.global_id, error = %e, code = error.code(), "departure fetch failed");
                let snapshot =
                    BoardSnapshot::failed(cycle, query, Some(station.clone()), error, now_ms);
                return (snapshot, Some(station));
            }
        };

        if self.config.hide_cancelled {
            departures.retain(|d| !d.cancelled);
        }

        if departures.is_empty() {
            tracing::info!(station = %station.global_id, "no departures");
            let snapshot = BoardSnapshot::failed(
                cycle,
                query,
                Some(station.clone()),
                BoardError::NoDepartures,
                now_ms,
            );
            return (snapshot, Some(station));
        }

        let lines = transform_with(&departures, &self.config.transform);
        tracing::debug!(
            station = %station.global_id,
            departures = departures.len(),
            lines = lines.len(),
            "board updated"
        );

        let snapshot = BoardSnapshot::ready(cycle, query, station.clone(), lines, now_ms);
        (snapshot, Some(station))
    }

    /// Turn the user's query into a station.
    ///
    /// Names go through the location search; ids are looked up in the
    /// directory and fall back to a bare station.
    async fn resolve(&self, query: &StationQuery) -> Result<Station, BoardError> {
        match query {
            StationQuery::Name(name) => {
                let locations = self.api.locations(name).await.map_err(|e| {
                    tracing::debug!(error = %e, "location search failed");
                    BoardError::from_lookup(&e)
                })?;
                first_station(&locations).ok_or(BoardError::StationNotFound)
            }
            StationQuery::Id(id) => Ok(self
                .directory
                .get(id)
                .await
                .unwrap_or_else(|| Station::from_id(id.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::domain::{Departure, GlobalId, TransportType};
    use crate::mvg::{Location, MvgError};

    const FAST: &str = "de:09162:470";
    const SLOW: &str = "de:09162:1110";
    const BROKEN: &str = "de:09162:666";
    const CANCELLED: &str = "de:09162:999";

    #[derive(Default)]
    struct FakeApi {
        location_calls: AtomicUsize,
        departure_calls: AtomicUsize,
        slow_completed: AtomicUsize,
    }

    fn station_location(name: &str, id: &str) -> Location {
        Location {
            kind: "STATION".to_string(),
            name: Some(name.to_string()),
            place: Some("München".to_string()),
            global_id: Some(id.to_string()),
            diva_id: None,
            transport_types: Vec::new(),
            latitude: None,
            longitude: None,
            surrounding_plan_link: None,
            aliases: None,
            tariff_zones: None,
        }
    }

    #[async_trait]
    impl TransitApi for FakeApi {
        async fn locations(&self, query: &str) -> Result<Vec<Location>, MvgError> {
            self.location_calls.fetch_add(1, Ordering::SeqCst);
            match query {
                "Moosach" => Ok(vec![station_location("Moosach", FAST)]),
                "Broken" => Err(MvgError::Api {
                    status: 500,
                    message: String::new(),
                }),
                _ => Ok(Vec::new()),
            }
        }

        async fn departures(
            &self,
            station: &GlobalId,
            _limit: u16,
        ) -> Result<Vec<Departure>, MvgError> {
            self.departure_calls.fetch_add(1, Ordering::SeqCst);
            match station.as_str() {
                SLOW => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    self.slow_completed.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![Departure::new("U6", "Klinikum Großhadern", TransportType::UBahn, 1)])
                }
                BROKEN => Err(MvgError::Api {
                    status: 503,
                    message: String::new(),
                }),
                CANCELLED => {
                    let mut dep = Departure::new("58", "Silberhornstraße", TransportType::Bus, 1);
                    dep.cancelled = true;
                    Ok(vec![dep])
                }
                _ => Ok(vec![
                    Departure::new("U3", "Moosach", TransportType::UBahn, 1000),
                    Departure::new("U3", "Moosach", TransportType::UBahn, 500),
                ]),
            }
        }
    }

    fn id(s: &str) -> GlobalId {
        GlobalId::parse(s).unwrap()
    }

    fn start(api: Arc<FakeApi>, config: PollerConfig, query: StationQuery) -> BoardHandle {
        spawn(api, StationDirectory::fixed(Vec::new()), config, query)
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn first_cycle_publishes_board() {
        let api = Arc::new(FakeApi::default());
        let board = start(api, PollerConfig::default(), StationQuery::Name("Moosach".into()));

        let snapshot = board.wait_ready(WAIT).await;
        assert!(!snapshot.loading);
        assert_eq!(snapshot.cycle, 1);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.query, StationQuery::Name("Moosach".into()));
        assert_eq!(snapshot.station.as_ref().unwrap().global_id, id(FAST));
        assert_eq!(snapshot.lines.len(), 1);
        let times: Vec<i64> = snapshot.lines[0].destinations[0]
            .departures
            .iter()
            .map(|d| d.realtime_departure_time)
            .collect();
        assert_eq!(times, vec![500, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_handle_cancels_in_flight_cycle() {
        let api = Arc::new(FakeApi::default());
        let board = start(api.clone(), PollerConfig::default(), StationQuery::Id(id(SLOW)));
        let other = board.clone();

        // Let the slow cycle start.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.departure_calls.load(Ordering::SeqCst), 1);

        drop(board);
        drop(other);

        // Well past the point the slow request would have finished, and
        // past the next tick.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(api.slow_completed.load(Ordering::SeqCst), 0);
        assert_eq!(api.departure_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn one_clone_keeps_the_board_running() {
        let api = Arc::new(FakeApi::default());
        let board = start(api.clone(), PollerConfig::default(), StationQuery::Id(id(FAST)));
        let kept = board.clone();
        drop(board);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(api.departure_calls.load(Ordering::SeqCst), 2);
        assert_eq!(kept.current().cycle, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn resolved_station_is_reused_across_ticks() {
        let api = Arc::new(FakeApi::default());
        let board = start(
            api.clone(),
            PollerConfig::default(),
            StationQuery::Name("Moosach".into()),
        );

        tokio::time::sleep(Duration::from_secs(130)).await;

        assert_eq!(api.location_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.departure_calls.load(Ordering::SeqCst), 3);
        assert_eq!(board.current().cycle, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_name_is_station_not_found() {
        let api = Arc::new(FakeApi::default());
        let board = start(api, PollerConfig::default(), StationQuery::Name("Nowhere".into()));

        let snapshot = board.wait_ready(WAIT).await;
        assert_eq!(snapshot.error, Some(BoardError::StationNotFound));
        assert!(snapshot.station.is_none());
        assert!(snapshot.lines.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_is_retried_next_tick() {
        let api = Arc::new(FakeApi::default());
        let board = start(
            api.clone(),
            PollerConfig::default(),
            StationQuery::Name("Broken".into()),
        );

        let snapshot = board.wait_ready(WAIT).await;
        assert_eq!(snapshot.error, Some(BoardError::StationLookup));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(api.location_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_keeps_station_without_departures() {
        let api = Arc::new(FakeApi::default());
        let board = start(api, PollerConfig::default(), StationQuery::Id(id(BROKEN)));

        let snapshot = board.wait_ready(WAIT).await;
        assert_eq!(snapshot.error, Some(BoardError::DepartureFetch));
        assert!(snapshot.lines.is_empty());
        assert_eq!(snapshot.station.as_ref().unwrap().global_id, id(BROKEN));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_departures_are_kept_by_default() {
        let api = Arc::new(FakeApi::default());
        let board = start(api, PollerConfig::default(), StationQuery::Id(id(CANCELLED)));

        let snapshot = board.wait_ready(WAIT).await;
        assert_eq!(snapshot.error, None);
        assert!(snapshot.lines[0].destinations[0].departures[0].cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_cancellations_can_empty_the_board() {
        let api = Arc::new(FakeApi::default());
        let config = PollerConfig {
            hide_cancelled: true,
            ..PollerConfig::default()
        };
        let board = start(api, config, StationQuery::Id(id(CANCELLED)));

        let snapshot = board.wait_ready(WAIT).await;
        assert_eq!(snapshot.error, Some(BoardError::NoDepartures));
    }

    #[tokio::test(start_paused = true)]
    async fn id_lookup_uses_directory() {
        let api = Arc::new(FakeApi::default());
        let mut moosach = Station::from_id(id(FAST));
        moosach.name = "Moosach".to_string();
        let directory = StationDirectory::fixed(vec![moosach]);

        let board = spawn(
            api.clone(),
            directory,
            PollerConfig::default(),
            StationQuery::Id(id(FAST)),
        );

        let snapshot = board.wait_ready(WAIT).await;
        assert_eq!(snapshot.station.as_ref().unwrap().name, "Moosach");
        assert_eq!(api.location_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_ready_times_out_with_loading_snapshot() {
        let api = Arc::new(FakeApi::default());
        let board = start(api, PollerConfig::default(), StationQuery::Id(id(SLOW)));

        let snapshot = board.wait_ready(Duration::from_secs(1)).await;
        assert!(snapshot.loading);
        assert_eq!(snapshot.cycle, 0);
        assert_eq!(snapshot.query, StationQuery::Id(id(SLOW)));
    }
}
