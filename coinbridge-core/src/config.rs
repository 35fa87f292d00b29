//! Configuration types for exchange adapters.
//!
//! Loading configuration from files or the environment is up to the embedding
//! application; these types only derive `serde` so any format can feed them.
//!
//! ```rust
//! use coinbridge_core::config::{CadencePolicy, DispatcherConfig, ExchangeConfig};
//! use std::time::Duration;
//!
//! let config = ExchangeConfig::builder()
//!     .id("bitfinex")
//!     .name("Bitfinex")
//!     .api_key("key")
//!     .secret("secret")
//!     .dispatcher(
//!         DispatcherConfig::default()
//!             .with_ban_window(Duration::from_secs(120))
//!             .with_endpoint_quota("POST/v1/orders", 30),
//!     )
//!     .build();
//!
//! assert_eq!(config.dispatcher.quota_for("POST/v1/orders", 10), 30);
//! assert_eq!(config.dispatcher.cadence, CadencePolicy::Spacing);
//! ```

use crate::credentials::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default cooldown after the provider signals throttling.
pub const DEFAULT_BAN_WINDOW: Duration = Duration::from_secs(60);

/// Default number of levels kept per order-book side.
pub const DEFAULT_ORDER_BOOK_DEPTH: usize = 50;

/// How the dispatcher paces calls on one endpoint key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CadencePolicy {
    /// At least `60000 / quota` milliseconds between successful calls.
    #[default]
    Spacing,
    /// At most `quota` calls per window; the counter resets when the window elapses.
    FixedWindow {
        /// Window length
        #[serde(with = "duration_secs")]
        window: Duration,
    },
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Cooldown applied to every key after a provider throttle
    #[serde(with = "duration_secs")]
    pub ban_window: Duration,
    /// Pacing policy
    pub cadence: CadencePolicy,
    /// Per-key quota overrides (calls per minute or per window)
    pub endpoint_quotas: HashMap<String, u32>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            ban_window: DEFAULT_BAN_WINDOW,
            cadence: CadencePolicy::Spacing,
            endpoint_quotas: HashMap::new(),
        }
    }
}

impl DispatcherConfig {
    /// Sets the ban window.
    pub fn with_ban_window(mut self, window: Duration) -> Self {
        self.ban_window = window;
        self
    }

    /// Sets the pacing policy.
    pub fn with_cadence(mut self, cadence: CadencePolicy) -> Self {
        self.cadence = cadence;
        self
    }

    /// Overrides the quota of one endpoint key.
    pub fn with_endpoint_quota(mut self, key: impl Into<String>, quota: u32) -> Self {
        self.endpoint_quotas.insert(key.into(), quota);
        self
    }

    /// Quota for `key`, or `default` when not overridden.
    pub fn quota_for(&self, key: &str, default: u32) -> u32 {
        self.endpoint_quotas.get(key).copied().unwrap_or(default)
    }
}

/// Exchange adapter configuration.
///
/// Only deserializable; secrets never leave the process through serde.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Exchange identifier
    pub id: String,
    /// Exchange display name
    pub name: String,
    /// API key (zeroed on drop)
    pub api_key: Option<SecretString>,
    /// API secret (zeroed on drop)
    pub secret: Option<SecretString>,
    /// Dispatcher settings
    pub dispatcher: DispatcherConfig,
    /// Levels kept per order-book side
    pub order_book_depth: usize,
    /// Log request/response bookkeeping at debug level
    pub verbose: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            api_key: None,
            secret: None,
            dispatcher: DispatcherConfig::default(),
            order_book_depth: DEFAULT_ORDER_BOOK_DEPTH,
            verbose: false,
        }
    }
}

impl ExchangeConfig {
    /// Creates a configuration builder.
    pub fn builder() -> ExchangeConfigBuilder {
        ExchangeConfigBuilder::default()
    }

    /// Returns `true` when both key and secret are present.
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
            && self.secret.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Builder for [`ExchangeConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfigBuilder {
    config: ExchangeConfig,
}

impl ExchangeConfigBuilder {
    /// Set the exchange identifier
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.config.id = id.into();
        self
    }

    /// Set the exchange display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(key));
        self
    }

    /// Set the API secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = Some(SecretString::new(secret));
        self
    }

    /// Set the dispatcher settings
    pub fn dispatcher(mut self, dispatcher: DispatcherConfig) -> Self {
        self.config.dispatcher = dispatcher;
        self
    }

    /// Set the order-book depth
    pub fn order_book_depth(mut self, depth: usize) -> Self {
        self.config.order_book_depth = depth;
        self
    }

    /// Enable verbose logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExchangeConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
