//! Rate-Limited Dispatcher
//!
//! Paces outbound calls per endpoint key, honours provider-side throttle signals,
//! and serves the last known good value instead of failing when a call is skipped.
//!
//! # State machine (per endpoint key)
//!
//! - **Ready**: enough time has passed since the last successful call and no ban is
//!   active. The call runs.
//!   - success: `last_call = start time`, the ban is cleared, the fresh value is returned
//!   - provider throttle: the ban is set to `now + ban_window`, the fallback is returned
//!   - any other error: propagated untouched, bookkeeping unchanged
//! - **Throttled**: too soon since the last call. Skipped, fallback returned.
//! - **Banned**: skipped until the ban expires, fallback returned.
//!
//! The ban covers every key of the dispatcher, since exchanges ban per IP. One
//! dispatcher belongs to exactly one adapter and is never shared across exchanges.
//!
//! Bookkeeping is guarded by a single mutex that is never held while the call is
//! awaited. A slot is reserved before the call starts, so concurrent callers on
//! one key cannot both pass the cadence check; the reservation is rolled back if
//! the call does not succeed.
//!
//! # Example
//!
//! ```rust
//! use coinbridge_core::config::DispatcherConfig;
//! use coinbridge_core::dispatcher::{Dispatched, Dispatcher, EndpointKey};
//! use coinbridge_core::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let dispatcher = Dispatcher::with_system_clock(DispatcherConfig::default());
//! let key = EndpointKey::new("GET", "/v1/book");
//!
//! let outcome = dispatcher
//!     .dispatch(&key, 60, || async { Ok(vec![1, 2, 3]) }, Vec::new())
//!     .await?;
//! assert!(outcome.is_fresh());
//!
//! // Immediately again: skipped, the fallback comes back as stale data.
//! let outcome = dispatcher
//!     .dispatch(&key, 60, || async { Ok(vec![4]) }, vec![1, 2, 3])
//!     .await?;
//! assert!(matches!(outcome, Dispatched::Stale { .. }));
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::{CadencePolicy, DispatcherConfig};
use crate::error::{Error, Result};
use crate::time::{Clock, SystemClock};

/// Identifies a rate-limited endpoint: HTTP method followed by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey(String);

impl EndpointKey {
    /// Builds `METHOD + path`, e.g. `POST/v1/balances`.
    pub fn new(method: &str, path: &str) -> Self {
        Self(format!("{}{}", method.to_ascii_uppercase(), path))
    }

    /// Key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a dispatch returned stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Too soon since the last call on this key
    Throttled,
    /// A provider ban is in effect
    Banned,
    /// This very call was rejected by the provider as throttled
    ProviderThrottle,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Throttled => write!(f, "call skipped, endpoint quota not yet replenished"),
            Self::Banned => write!(f, "call skipped, provider ban in effect"),
            Self::ProviderThrottle => write!(f, "provider rejected the call as rate limited"),
        }
    }
}

/// Outcome of a dispatch that did not hard-fail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Dispatched<T> {
    /// The call ran and succeeded
    Fresh(T),
    /// The call was skipped or throttled; `value` is the best available fallback
    Stale {
        /// Last known good value
        value: T,
        /// Why the call did not produce fresh data
        reason: StaleReason,
    },
}

impl<T> Dispatched<T> {
    /// Returns `true` for fresh data.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    /// Returns `true` for stale data.
    pub fn is_stale(&self) -> bool {
        !self.is_fresh()
    }

    /// Stale reason, if any.
    pub fn reason(&self) -> Option<StaleReason> {
        match self {
            Self::Fresh(_) => None,
            Self::Stale { reason, .. } => Some(*reason),
        }
    }

    /// Borrows the value, fresh or stale.
    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(value) | Self::Stale { value, .. } => value,
        }
    }

    /// Takes the value, fresh or stale.
    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(value) | Self::Stale { value, .. } => value,
        }
    }

    /// Takes the value only if fresh; stale data becomes [`Error::RateLimited`].
    pub fn into_fresh(self) -> Result<T> {
        match self {
            Self::Fresh(value) => Ok(value),
            Self::Stale { reason, .. } => Err(Error::rate_limited(reason.to_string(), None)),
        }
    }

    /// Maps the value, keeping freshness.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Dispatched<U> {
        match self {
            Self::Fresh(value) => Dispatched::Fresh(f(value)),
            Self::Stale { value, reason } => Dispatched::Stale {
                value: f(value),
                reason,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EndpointState {
    last_call: Option<i64>,
    window_start: Option<i64>,
    window_count: u32,
}

#[derive(Debug, Default)]
struct DispatcherState {
    endpoints: HashMap<EndpointKey, EndpointState>,
    ban_until: Option<i64>,
}

enum Admission {
    Proceed { previous: EndpointState, started: i64 },
    Skip(StaleReason),
}

/// Per-adapter rate limiter with fallback-to-last-good semantics.
#[derive(Debug)]
pub struct Dispatcher {
    config: DispatcherConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<DispatcherState>,
}

impl Dispatcher {
    /// Creates a dispatcher reading time from `clock`.
    pub fn new(config: DispatcherConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(DispatcherState::default()),
        }
    }

    /// Creates a dispatcher on the system clock.
    pub fn with_system_clock(config: DispatcherConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    /// Dispatcher settings.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Runs `call` if `key` is ready, otherwise returns `fallback` as stale data.
    ///
    /// `quota_per_minute` is the exchange's published quota for the endpoint; a
    /// per-key override in [`DispatcherConfig::endpoint_quotas`] takes precedence.
    /// Under [`CadencePolicy::FixedWindow`] the quota counts calls per window.
    ///
    /// Never use this for order placement: a skipped placement must not look
    /// like success.
    pub async fn dispatch<T, F, Fut>(
        &self,
        key: &EndpointKey,
        quota_per_minute: u32,
        call: F,
        fallback: T,
    ) -> Result<Dispatched<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let quota = self.config.quota_for(key.as_str(), quota_per_minute);
        if quota == 0 {
            return Err(Error::invalid_request(format!(
                "quota for {key} must be positive"
            )));
        }

        let (previous, started) = match self.admit(key, quota) {
            Admission::Proceed { previous, started } => (previous, started),
            Admission::Skip(reason) => {
                debug!(key = %key, %reason, "Serving fallback");
                return Ok(Dispatched::Stale {
                    value: fallback,
                    reason,
                });
            }
        };

        match call().await {
            Ok(value) => {
                self.settle_success();
                trace!(key = %key, started, "Dispatch succeeded");
                Ok(Dispatched::Fresh(value))
            }
            Err(err) if err.is_provider_throttle() => {
                self.rollback(key, previous, started);
                self.enter_ban(key, &err);
                Ok(Dispatched::Stale {
                    value: fallback,
                    reason: StaleReason::ProviderThrottle,
                })
            }
            Err(err) => {
                self.rollback(key, previous, started);
                Err(err)
            }
        }
    }

    /// Returns `true` while a provider ban is in effect.
    pub fn is_banned(&self) -> bool {
        self.ban_remaining().is_some()
    }

    /// Time left on the current ban.
    pub fn ban_remaining(&self) -> Option<Duration> {
        let now = self.clock.now_ms();
        let ban_until = self.state.lock().ban_until?;
        (now < ban_until).then(|| Duration::from_millis((ban_until - now).unsigned_abs()))
    }

    /// Start time of the last successful call on `key`, in milliseconds.
    pub fn last_call(&self, key: &EndpointKey) -> Option<i64> {
        self.state
            .lock()
            .endpoints
            .get(key)
            .and_then(|state| state.last_call)
    }

    fn admit(&self, key: &EndpointKey, quota: u32) -> Admission {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        if state.ban_until.is_some_and(|until| now < until) {
            return Admission::Skip(StaleReason::Banned);
        }

        let entry = state.endpoints.entry(key.clone()).or_default();
        let previous = *entry;
        let admitted = match self.config.cadence {
            CadencePolicy::Spacing => {
                let interval = 60_000 / i64::from(quota);
                let ready = entry.last_call.is_none_or(|last| now - last >= interval);
                if ready {
                    entry.last_call = Some(now);
                }
                ready
            }
            CadencePolicy::FixedWindow { window } => {
                let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
                if entry
                    .window_start
                    .is_none_or(|start| now - start > window_ms)
                {
                    entry.window_start = Some(now);
                    entry.window_count = 0;
                }
                let ready = entry.window_count < quota;
                if ready {
                    entry.window_count += 1;
                    entry.last_call = Some(now);
                }
                ready
            }
        };

        if admitted {
            Admission::Proceed {
                previous,
                started: now,
            }
        } else {
            Admission::Skip(StaleReason::Throttled)
        }
    }

    fn settle_success(&self) {
        self.state.lock().ban_until = None;
    }

    /// Undoes a reservation unless another caller has reserved the key since.
    fn rollback(&self, key: &EndpointKey, previous: EndpointState, started: i64) {
        let mut state = self.state.lock();
        if let Some(entry) = state.endpoints.get_mut(key) {
            if entry.last_call == Some(started) {
                entry.last_call = previous.last_call;
                if entry.window_start == previous.window_start {
                    entry.window_count = entry.window_count.saturating_sub(1);
                }
            }
        }
    }

    fn enter_ban(&self, key: &EndpointKey, err: &Error) {
        let now = self.clock.now_ms();
        let window = i64::try_from(self.config.ban_window.as_millis()).unwrap_or(i64::MAX);
        let until = now.saturating_add(window);
        self.state.lock().ban_until = Some(until);
        warn!(
            key = %key,
            ban_ms = window,
            error = %err,
            "Provider throttled requests, backing off"
        );
    }
}

/// A dispatcher endpoint with a typed cache of its last good response.
///
/// The cached value is offered as the fallback on every skipped call, so callers
/// keep operating on stale-but-valid data. Before the first success, the
/// caller-supplied fallback is used instead.
#[derive(Debug)]
pub struct CachedEndpoint<T> {
    key: EndpointKey,
    quota_per_minute: u32,
    last_good: Mutex<Option<T>>,
}

impl<T: Clone> CachedEndpoint<T> {
    /// Creates an endpoint with an empty cache.
    pub fn new(key: EndpointKey, quota_per_minute: u32) -> Self {
        Self {
            key,
            quota_per_minute,
            last_good: Mutex::new(None),
        }
    }

    /// Endpoint key.
    pub fn key(&self) -> &EndpointKey {
        &self.key
    }

    /// Last good value, if any call has succeeded yet.
    pub fn cached(&self) -> Option<T> {
        self.last_good.lock().clone()
    }

    /// Dispatches `call`, caching fresh results.
    pub async fn fetch<F, Fut>(
        &self,
        dispatcher: &Dispatcher,
        call: F,
        fallback: T,
    ) -> Result<Dispatched<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let last_good = self.cached().unwrap_or(fallback);
        let outcome = dispatcher
            .dispatch(&self.key, self.quota_per_minute, call, last_good)
            .await?;
        if let Dispatched::Fresh(value) = &outcome {
            *self.last_good.lock() = Some(value.clone());
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::time::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dispatcher(config: DispatcherConfig) -> (Dispatcher, ManualClock) {
        let clock = ManualClock::new(0);
        (Dispatcher::new(config, Arc::new(clock.clone())), clock)
    }

    fn key() -> EndpointKey {
        EndpointKey::new("post", "/v1/balances")
    }

    #[test]
    fn test_endpoint_key_format() {
        assert_eq!(key().as_str(), "POST/v1/balances");
    }

    #[tokio::test]
    async fn test_second_call_within_interval_is_skipped() {
        let (dispatcher, clock) = dispatcher(DispatcherConfig::default());

        let first = dispatcher
            .dispatch(&key(), 60, || async { Ok(1) }, 0)
            .await
            .unwrap();
        assert_eq!(first, Dispatched::Fresh(1));

        clock.advance(Duration::from_millis(500));
        let second = dispatcher
            .dispatch(&key(), 60, || async { Ok(2) }, 0)
            .await
            .unwrap();
        assert_eq!(
            second,
            Dispatched::Stale {
                value: 0,
                reason: StaleReason::Throttled
            }
        );
    }

    #[tokio::test]
    async fn test_call_at_interval_boundary_runs() {
        let (dispatcher, clock) = dispatcher(DispatcherConfig::default());
        dispatcher
            .dispatch(&key(), 10, || async { Ok(1) }, 0)
            .await
            .unwrap();

        clock.set(5_999);
        let early = dispatcher
            .dispatch(&key(), 10, || async { Ok(2) }, 0)
            .await
            .unwrap();
        assert!(early.is_stale());

        clock.set(6_000);
        let on_time = dispatcher
            .dispatch(&key(), 10, || async { Ok(3) }, 0)
            .await
            .unwrap();
        assert_eq!(on_time, Dispatched::Fresh(3));
        assert_eq!(dispatcher.last_call(&key()), Some(6_000));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (dispatcher, _clock) = dispatcher(DispatcherConfig::default());
        let other = EndpointKey::new("GET", "/v1/book");
        assert!(dispatcher
            .dispatch(&key(), 1, || async { Ok(()) }, ())
            .await
            .unwrap()
            .is_fresh());
        assert!(dispatcher
            .dispatch(&other, 1, || async { Ok(()) }, ())
            .await
            .unwrap()
            .is_fresh());
    }

    #[tokio::test]
    async fn test_provider_throttle_bans_all_keys() {
        let config = DispatcherConfig::default().with_ban_window(Duration::from_secs(60));
        let (dispatcher, clock) = dispatcher(config);
        let calls = AtomicUsize::new(0);

        let outcome = dispatcher
            .dispatch(
                &key(),
                600,
                || async { Err::<u32, _>(Error::rate_limited("ERR_RATE_LIMIT", None)) },
                7,
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Dispatched::Stale {
                value: 7,
                reason: StaleReason::ProviderThrottle
            }
        );
        assert!(dispatcher.is_banned());
        assert_eq!(dispatcher.last_call(&key()), None);

        for at in [1_000, 30_000, 59_999] {
            clock.set(at);
            for k in [key(), EndpointKey::new("GET", "/v1/book")] {
                let outcome = dispatcher
                    .dispatch(
                        &k,
                        600,
                        || async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(1)
                        },
                        7,
                    )
                    .await
                    .unwrap();
                assert_eq!(outcome.reason(), Some(StaleReason::Banned));
                assert_eq!(*outcome.value(), 7);
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        clock.set(60_000);
        let outcome = dispatcher
            .dispatch(
                &key(),
                600,
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(8)
                },
                7,
            )
            .await
            .unwrap();
        assert_eq!(outcome, Dispatched::Fresh(8));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!dispatcher.is_banned());
    }

    #[tokio::test]
    async fn test_http_429_is_a_throttle() {
        let (dispatcher, _clock) = dispatcher(DispatcherConfig::default());
        let outcome = dispatcher
            .dispatch(
                &key(),
                60,
                || async {
                    Err::<u32, _>(Error::from(NetworkError::RequestFailed {
                        status: 429,
                        message: "Too Many Requests".to_string(),
                    }))
                },
                0,
            )
            .await
            .unwrap();
        assert_eq!(outcome.reason(), Some(StaleReason::ProviderThrottle));
        assert_eq!(dispatcher.ban_remaining(), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_other_errors_propagate_without_state_change() {
        let (dispatcher, _clock) = dispatcher(DispatcherConfig::default());

        let err = dispatcher
            .dispatch(
                &key(),
                60,
                || async { Err::<u32, _>(Error::exchange("10001", "Insufficient funds")) },
                0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Exchange(_)));
        assert_eq!(dispatcher.last_call(&key()), None);
        assert!(!dispatcher.is_banned());

        let retry = dispatcher
            .dispatch(&key(), 60, || async { Ok(5) }, 0)
            .await
            .unwrap();
        assert_eq!(retry, Dispatched::Fresh(5));
    }

    #[tokio::test]
    async fn test_fixed_window_cadence() {
        let config = DispatcherConfig::default().with_cadence(CadencePolicy::FixedWindow {
            window: Duration::from_secs(90),
        });
        let (dispatcher, clock) = dispatcher(config);

        for _ in 0..2 {
            assert!(dispatcher
                .dispatch(&key(), 2, || async { Ok(()) }, ())
                .await
                .unwrap()
                .is_fresh());
        }
        clock.set(90_000);
        assert_eq!(
            dispatcher
                .dispatch(&key(), 2, || async { Ok(()) }, ())
                .await
                .unwrap()
                .reason(),
            Some(StaleReason::Throttled)
        );
        clock.set(90_001);
        assert!(dispatcher
            .dispatch(&key(), 2, || async { Ok(()) }, ())
            .await
            .unwrap()
            .is_fresh());
    }

    #[tokio::test]
    async fn test_quota_override_and_zero_quota() {
        let config = DispatcherConfig::default().with_endpoint_quota("POST/v1/balances", 0);
        let (dispatcher, _clock) = dispatcher(config);
        let err = dispatcher
            .dispatch(&key(), 60, || async { Ok(()) }, ())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_concurrent_callers_admit_one() {
        let (dispatcher, _clock) = dispatcher(DispatcherConfig::default());
        let dispatcher = Arc::new(dispatcher);
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    dispatcher
                        .dispatch(
                            &key(),
                            60,
                            || async move {
                                calls.fetch_add(1, Ordering::SeqCst);
                                tokio::task::yield_now().await;
                                Ok(1)
                            },
                            0,
                        )
                        .await
                })
            })
            .collect();

        let mut fresh = 0;
        for task in tasks {
            if task.await.unwrap().unwrap().is_fresh() {
                fresh += 1;
            }
        }
        assert_eq!(fresh, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_endpoint_serves_last_good() {
        let (dispatcher, clock) = dispatcher(DispatcherConfig::default());
        let endpoint = CachedEndpoint::new(key(), 10);
        assert_eq!(endpoint.cached(), None);

        let first = endpoint
            .fetch(&dispatcher, || async { Ok("V1") }, "V0")
            .await
            .unwrap();
        assert_eq!(first, Dispatched::Fresh("V1"));

        clock.set(1_000);
        let second = endpoint
            .fetch(&dispatcher, || async { Ok("never") }, "V0")
            .await
            .unwrap();
        assert_eq!(second.value(), &"V1");
        assert!(second.into_fresh().is_err());

        clock.set(6_000);
        let third = endpoint
            .fetch(&dispatcher, || async { Ok("V2") }, "V0")
            .await
            .unwrap();
        assert_eq!(third, Dispatched::Fresh("V2"));
        assert_eq!(endpoint.cached(), Some("V2"));
    }

    #[test]
    fn test_dispatched_helpers() {
        let fresh: Dispatched<u32> = Dispatched::Fresh(2);
        assert_eq!(fresh.clone().map(|v| v * 2), Dispatched::Fresh(4));
        assert_eq!(fresh.into_fresh().unwrap(), 2);

        let stale = Dispatched::Stale {
            value: 1,
            reason: StaleReason::Banned,
        };
        let err = stale.clone().into_fresh().unwrap_err();
        assert!(err.as_rate_limited().is_some());
        assert_eq!(stale.into_value(), 1);
    }
}
