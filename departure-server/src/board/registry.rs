//! One board per requested station.
//!
//! Every distinct [`StationQuery`] gets its own poller, so clients asking for
//! different stations never see each other's boards. The default station's
//! board is pinned; others are stopped once idle, or when the registry is
//! full and a new station is asked for.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::StationQuery;
use crate::mvg::TransitApi;
use crate::stations::StationDirectory;

use super::poller::{BoardHandle, PollerConfig, spawn};

/// Default number of boards kept running, the pinned one included.
pub const DEFAULT_MAX_BOARDS: usize = 16;

/// Default time a board keeps running without being asked for.
pub const DEFAULT_BOARD_IDLE: Duration = Duration::from_secs(10 * 60);

/// Bounds on the running boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLimits {
    pub max_boards: usize,
    pub idle_timeout: Duration,
}

impl Default for BoardLimits {
    fn default() -> Self {
        Self {
            max_boards: DEFAULT_MAX_BOARDS,
            idle_timeout: DEFAULT_BOARD_IDLE,
        }
    }
}

struct Entry {
    handle: BoardHandle,
    last_used: Instant,
}

/// Running boards, keyed by the station they show.
pub struct BoardRegistry {
    api: Arc<dyn TransitApi>,
    directory: StationDirectory,
    config: PollerConfig,
    limits: BoardLimits,
    pinned: StationQuery,
    boards: Mutex<HashMap<StationQuery, Entry>>,
}

impl BoardRegistry {
    /// Create the registry and start the board for `pinned`, which is never
    /// stopped.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(
        api: Arc<dyn TransitApi>,
        directory: StationDirectory,
        config: PollerConfig,
        limits: BoardLimits,
        pinned: StationQuery,
    ) -> Self {
        let handle = spawn(
            api.clone(),
            directory.clone(),
            config.clone(),
            pinned.clone(),
        );
        let mut boards = HashMap::new();
        boards.insert(
            pinned.clone(),
            Entry {
                handle,
                last_used: Instant::now(),
            },
        );

        Self {
            api,
            directory,
            config,
            limits,
            pinned,
            boards: Mutex::new(boards),
        }
    }

    /// The board for `query`, started if it is not running.
    pub async fn board(&self, query: StationQuery) -> BoardHandle {
        let now = Instant::now();
        let mut boards = self.boards.lock().await;
        self.evict_idle_at(&mut boards, now);

        if let Some(entry) = boards.get_mut(&query) {
            entry.last_used = now;
            return entry.handle.clone();
        }

        if boards.len() >= self.limits.max_boards {
            let oldest = boards
                .iter()
                .filter(|(q, _)| **q != self.pinned)
                .min_by_key(|(_, e)| e.last_used)
                .map(|(q, _)| q.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(station = %oldest, "registry full, stopping least recently used board");
                boards.remove(&oldest);
            }
        }

        tracing::info!(station = %query, boards = boards.len() + 1, "starting board");
        let handle = spawn(
            self.api.clone(),
            self.directory.clone(),
            self.config.clone(),
            query.clone(),
        );
        boards.insert(
            query,
            Entry {
                handle: handle.clone(),
                last_used: now,
            },
        );
        handle
    }

    /// Stop boards not asked for within the idle timeout. Returns how many
    /// were stopped.
    pub async fn evict_idle(&self) -> usize {
        let mut boards = self.boards.lock().await;
        self.evict_idle_at(&mut boards, Instant::now())
    }

    /// How often [`evict_idle`](Self::evict_idle) should run.
    pub fn sweep_interval(&self) -> Duration {
        self.limits.idle_timeout
    }

    fn evict_idle_at(&self, boards: &mut HashMap<StationQuery, Entry>, now: Instant) -> usize {
        let before = boards.len();
        boards.retain(|query, entry| {
            *query == self.pinned
                || now.duration_since(entry.last_used) < self.limits.idle_timeout
        });

        let stopped = before - boards.len();
        if stopped > 0 {
            tracing::debug!(stopped, "stopped idle boards");
        }
        stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::domain::{Departure, GlobalId, TransportType};
    use crate::mvg::{Location, MvgError};

    const HOME: &str = "de:09162:1110";
    const SLOW: &str = "de:09162:470";
    const FAST: &str = "de:09162:6";

    /// Departures labelled after the station; one station answers slowly.
    #[derive(Default)]
    struct FakeApi {
        departure_calls: StdMutex<Vec<String>>,
    }

    impl FakeApi {
        fn calls_for(&self, station: &str) -> usize {
            self.departure_calls
                .lock()
                .unwrap()
                .iter()
                .filter(|s| *s == station)
                .count()
        }
    }

    #[async_trait]
    impl TransitApi for FakeApi {
        async fn locations(&self, _query: &str) -> Result<Vec<Location>, MvgError> {
            Ok(Vec::new())
        }

        async fn departures(
            &self,
            station: &GlobalId,
            _limit: u16,
        ) -> Result<Vec<Departure>, MvgError> {
            self.departure_calls
                .lock()
                .unwrap()
                .push(station.as_str().to_string());
            if station.as_str() == SLOW {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Ok(vec![Departure::new(
                station.as_str(),
                "Moosach",
                TransportType::UBahn,
                1000,
            )])
        }
    }

    fn query(id: &str) -> StationQuery {
        StationQuery::Id(GlobalId::parse(id).unwrap())
    }

    fn registry(api: Arc<FakeApi>, limits: BoardLimits) -> BoardRegistry {
        BoardRegistry::new(
            api,
            StationDirectory::fixed(Vec::new()),
            PollerConfig::default(),
            limits,
            query(HOME),
        )
    }

    async fn running(registry: &BoardRegistry) -> Vec<StationQuery> {
        let boards = registry.boards.lock().await;
        let mut queries: Vec<StationQuery> = boards.keys().cloned().collect();
        queries.sort_by_key(|q| q.to_string());
        queries
    }

    #[tokio::test(start_paused = true)]
    async fn another_station_never_reaches_a_waiting_board() {
        let api = Arc::new(FakeApi::default());
        let registry = registry(api, BoardLimits::default());

        let slow = registry.board(query(SLOW)).await;
        let waiter = tokio::spawn(async move { slow.wait_ready(Duration::from_secs(30)).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        let fast = registry.board(query(FAST)).await;
        let fast_snapshot = fast.wait_ready(Duration::from_secs(5)).await;
        assert_eq!(fast_snapshot.query, query(FAST));
        assert_eq!(fast_snapshot.lines[0].label, FAST);

        let slow_snapshot = waiter.await.unwrap();
        assert!(!slow_snapshot.loading);
        assert_eq!(slow_snapshot.query, query(SLOW));
        assert_eq!(
            slow_snapshot.station.as_ref().unwrap().global_id.as_str(),
            SLOW
        );
        assert_eq!(slow_snapshot.lines[0].label, SLOW);
    }

    #[tokio::test(start_paused = true)]
    async fn same_station_shares_one_board() {
        let api = Arc::new(FakeApi::default());
        let registry = registry(api.clone(), BoardLimits::default());

        let first = registry.board(query(FAST)).await;
        let second = registry.board(query(FAST)).await;
        first.wait_ready(Duration::from_secs(5)).await;
        second.wait_ready(Duration::from_secs(5)).await;

        assert_eq!(running(&registry).await.len(), 2);
        assert_eq!(api.calls_for(FAST), 1);
        assert_eq!(second.query(), &query(FAST));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_boards_stop_polling() {
        let api = Arc::new(FakeApi::default());
        let limits = BoardLimits {
            max_boards: 4,
            idle_timeout: Duration::from_secs(5 * 60),
        };
        let registry = registry(api.clone(), limits);

        drop(registry.board(query(FAST)).await);
        tokio::time::sleep(Duration::from_secs(6 * 60)).await;

        assert_eq!(registry.evict_idle().await, 1);
        assert_eq!(running(&registry).await, vec![query(HOME)]);

        let calls = api.calls_for(FAST);
        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(api.calls_for(FAST), calls);
        assert!(api.calls_for(HOME) > calls);
    }

    #[tokio::test(start_paused = true)]
    async fn pinned_board_survives_idleness() {
        let api = Arc::new(FakeApi::default());
        let limits = BoardLimits {
            max_boards: 4,
            idle_timeout: Duration::from_secs(60),
        };
        let registry = registry(api, limits);

        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        assert_eq!(registry.evict_idle().await, 0);
        assert_eq!(running(&registry).await, vec![query(HOME)]);
    }

    #[tokio::test(start_paused = true)]
    async fn full_registry_replaces_least_recently_used() {
        let api = Arc::new(FakeApi::default());
        let limits = BoardLimits {
            max_boards: 3,
            ..BoardLimits::default()
        };
        let registry = registry(api, limits);

        registry.board(query(SLOW)).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        registry.board(query(FAST)).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        // Touch the slow board so the fast one is the oldest.
        registry.board(query(SLOW)).await;

        registry.board(query("de:09162:1")).await;

        let running = running(&registry).await;
        assert_eq!(running.len(), 3);
        assert!(running.contains(&query(HOME)));
        assert!(running.contains(&query(SLOW)));
        assert!(!running.contains(&query(FAST)));
    }
}
