//! Generic exchange adapter.
//!
//! An [`Adapter`] wires one exchange [`Dialect`] to the core components:
//!
//! - a [`SymbolCodec`] translating pairs to the exchange's symbols
//! - a [`Dispatcher`] pacing every read endpoint and absorbing provider bans
//! - an [`OrderBookStore`] holding the latest book per pair and market type, and
//!   a ticker cache keyed the same way
//! - the normalizer turning exchange orders and balances into canonical form
//!
//! The adapter never talks HTTP itself. The embedding application supplies a
//! [`Transport`] that performs the request (and signs private ones); the dialect
//! describes what to request and how to read the answer.
//!
//! Reads (`update_order_book`, `update_ticker`, `open_orders`, `balances`) go
//! through the dispatcher and may come back [`Dispatched::Stale`]. Order placement,
//! cancellation and single-order lookups never do: they hit the transport
//! directly and surface every failure.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use coinbridge_core::prelude::*;
//! use coinbridge_exchanges::adapter::{Adapter, ExchangeRequest, Transport};
//! use coinbridge_exchanges::bitfinex::Bitfinex;
//! use serde_json::{Value, json};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn public(&self, _request: &ExchangeRequest) -> Result<Value> {
//!         Ok(json!({
//!             "bids": [{"price": "0.0712", "amount": "3", "timestamp": "1500000000.0"}],
//!             "asks": [{"price": "0.0715", "amount": "1", "timestamp": "1500000000.0"}]
//!         }))
//!     }
//!
//!     async fn private(&self, _request: &ExchangeRequest, _nonce: u64) -> Result<Value> {
//!         Err(Error::authentication("no credentials"))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let adapter = Adapter::new(Bitfinex, Canned, ExchangeConfig::default())?;
//! let pair = CurrencyPair::new("ETH", "BTC")?;
//!
//! let book = adapter.update_order_book(&pair, MarketType::Spot).await?;
//! assert!(book.is_fresh());
//! assert_eq!(adapter.order_book(&pair, &MarketType::Spot)?.bids.len(), 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use coinbridge_core::config::{DispatcherConfig, ExchangeConfig};
use coinbridge_core::dispatcher::{CachedEndpoint, Dispatched, Dispatcher, EndpointKey};
use coinbridge_core::error::{ContextExt, Error, Result};
use coinbridge_core::limits::{DefaultLimits, ExchangeLimits, TableLimits, validate_order};
use coinbridge_core::nonce::{Nonce, NonceResolution};
use coinbridge_core::normalize::{
    ExchangeContext, FieldVocabulary, RawBalance, RawOrder, RawStatus, normalize, normalize_all,
    normalize_balances,
};
use coinbridge_core::order_book_store::OrderBookStore;
use coinbridge_core::symbol::SymbolCodec;
use coinbridge_core::time::{Clock, SystemClock};
use coinbridge_core::types::{
    Amount, Balances, CanonicalOrder, CurrencyPair, MarketType, OrderBookSnapshot, OrderSide,
    OrderType, Price, Ticker,
};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// Requests
// ============================================================================

/// HTTP method of an exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// GET: parameters in the query string
    #[default]
    Get,
    /// POST: parameters in the body
    Post,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Uppercase method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request a dialect wants performed.
///
/// `path` is relative to the exchange's API root; the transport owns base URLs,
/// encoding and signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API root
    pub path: String,
    /// Request parameters, sorted by name
    pub params: BTreeMap<String, String>,
    scope: Option<String>,
}

impl ExchangeRequest {
    /// Creates a request without parameters.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: BTreeMap::new(),
            scope: None,
        }
    }

    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Adds a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Paces this request separately from others on the same path.
    ///
    /// Used where the exchange limits per market, e.g. one order book per symbol.
    pub fn scoped(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Dispatcher key: method and path, plus the scope if any.
    pub fn endpoint_key(&self) -> EndpointKey {
        match &self.scope {
            Some(scope) => {
                EndpointKey::new(self.method.as_str(), &format!("{}?{scope}", self.path))
            }
            None => EndpointKey::new(self.method.as_str(), &self.path),
        }
    }
}

/// Performs HTTP requests on behalf of an adapter.
///
/// Implementations map HTTP failures onto [`Error`]; a 429 or 418 response should
/// become a `NetworkError::RequestFailed` with that status (or
/// [`Error::RateLimited`]) so the dispatcher can recognize a provider throttle.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Unauthenticated request.
    async fn public(&self, request: &ExchangeRequest) -> Result<Value>;

    /// Authenticated request. `nonce` is strictly increasing per adapter.
    async fn private(&self, request: &ExchangeRequest, nonce: u64) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn public(&self, request: &ExchangeRequest) -> Result<Value> {
        (**self).public(request).await
    }

    async fn private(&self, request: &ExchangeRequest, nonce: u64) -> Result<Value> {
        (**self).private(request, nonce).await
    }
}

/// An order to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Market
    pub pair: CurrencyPair,
    /// Buy or sell
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Amount in base currency
    pub amount: Amount,
    /// Limit price; `None` for market orders
    pub price: Option<Price>,
}

impl OrderRequest {
    /// Limit order.
    pub fn limit(pair: CurrencyPair, side: OrderSide, amount: Amount, price: Price) -> Self {
        Self {
            pair,
            side,
            order_type: OrderType::Limit,
            amount,
            price: Some(price),
        }
    }
}

// ============================================================================
// Dialect
// ============================================================================

/// Published per-minute quotas of an exchange's paced endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quotas {
    /// Order-book snapshots, per symbol
    pub order_book: u32,
    /// Tickers, per symbol
    pub ticker: u32,
    /// Open-orders listing
    pub open_orders: u32,
    /// Account balances
    pub balances: u32,
}

/// Markets parsed from an exchange's market listing.
#[derive(Debug, Clone)]
pub struct MarketListing {
    /// `(symbol, pair)` for every tradable market
    pub markets: Vec<(String, CurrencyPair)>,
    /// Trading limits per pair
    pub limits: TableLimits,
}

/// Exchange-specific knowledge: endpoints, payload shapes and vocabulary.
///
/// Dialects are stateless; all state lives in the [`Adapter`].
pub trait Dialect: Send + Sync + 'static {
    /// Raw order status of this exchange.
    type Status: RawStatus + Send + Sync;

    /// Short lowercase identifier.
    const ID: &'static str;
    /// Display name, used in errors and logs.
    const NAME: &'static str;
    /// Side and order-type tokens.
    const FIELDS: FieldVocabulary;
    /// Default endpoint quotas.
    const QUOTAS: Quotas;
    /// Unit of the nonce sent with private requests.
    const NONCE_RESOLUTION: NonceResolution = NonceResolution::Nanos;

    /// Codec in effect before (or without) a market listing.
    fn initial_codec(&self) -> Result<SymbolCodec>;

    /// Adjusts the configured dispatcher settings for this exchange.
    fn tune(&self, config: DispatcherConfig) -> DispatcherConfig {
        config
    }

    /// Unwraps the response envelope, turning error bodies into errors.
    ///
    /// Rate-limit signals must come back as [`Error::RateLimited`].
    fn check_response(&self, payload: Value) -> Result<Value>;

    /// Request for the market listing; `None` when the codec is fixed.
    fn markets_request(&self) -> Option<ExchangeRequest> {
        None
    }

    /// Parses the market listing.
    fn parse_markets(&self, payload: &Value) -> Result<MarketListing> {
        let _ = payload;
        Err(Error::invalid_request(format!(
            "{} has no market listing",
            Self::NAME
        )))
    }

    /// Request for an order-book snapshot of `symbol`.
    fn order_book_request(&self, symbol: &str, depth: usize) -> ExchangeRequest;

    /// Parses an order-book payload. `now_ms` stamps books that carry no time.
    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot>;

    /// Request for the ticker of `symbol`.
    fn ticker_request(&self, symbol: &str) -> ExchangeRequest;

    /// Parses a ticker payload for `symbol`, which is `pair` on this exchange.
    /// `now_ms` stamps tickers that carry no time.
    fn parse_ticker(
        &self,
        payload: &Value,
        symbol: &str,
        pair: &CurrencyPair,
        now_ms: i64,
    ) -> Result<Ticker>;

    /// Request listing every open order of the account.
    fn open_orders_request(&self) -> ExchangeRequest;

    /// Parses the open-orders listing.
    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<Self::Status>>>;

    /// Request for one order; `symbol` is given when the caller knows the market.
    fn order_request(&self, id: &str, symbol: Option<&str>) -> Result<ExchangeRequest> {
        let _ = (id, symbol);
        Err(Error::invalid_request(format!(
            "{} does not support single-order lookups",
            Self::NAME
        )))
    }

    /// Parses a single-order payload.
    fn parse_order(&self, payload: &Value, id: &str) -> Result<RawOrder<Self::Status>> {
        let _ = (payload, id);
        Err(Error::invalid_request(format!(
            "{} does not support single-order lookups",
            Self::NAME
        )))
    }

    /// Request for the account balances.
    fn balances_request(&self) -> ExchangeRequest;

    /// Parses the balances payload.
    fn parse_balances(&self, payload: &Value) -> Result<Vec<RawBalance>>;

    /// Request placing `order` on `symbol`.
    fn place_order_request(&self, order: &OrderRequest, symbol: &str) -> Result<ExchangeRequest>;

    /// Extracts the new order id from a placement response.
    fn parse_placed_order_id(&self, payload: &Value) -> Result<String>;

    /// Request cancelling order `id`.
    fn cancel_order_request(&self, id: &str, symbol: Option<&str>) -> Result<ExchangeRequest>;
}

/// Looks up the exchange token for an order's side.
pub(crate) fn side_token<D: Dialect>(side: OrderSide) -> Result<&'static str> {
    D::FIELDS
        .side_token(side)
        .ok_or_else(|| Error::unsupported_order_field(D::NAME, "side", side.to_string()))
}

/// Looks up the exchange token for an order type.
pub(crate) fn order_type_token<D: Dialect>(order_type: OrderType) -> Result<&'static str> {
    D::FIELDS
        .order_type_token(order_type)
        .ok_or_else(|| Error::unsupported_order_field(D::NAME, "type", order_type.to_string()))
}

/// Limit price of an order, rejecting market orders.
pub(crate) fn required_price<D: Dialect>(order: &OrderRequest) -> Result<Price> {
    order.price.ok_or_else(|| {
        Error::invalid_request(format!(
            "{} requires a price for {} orders",
            D::NAME,
            order.order_type
        ))
    })
}

// ============================================================================
// Adapter
// ============================================================================

/// One exchange, wired to the core components.
pub struct Adapter<D: Dialect, T: Transport> {
    dialect: D,
    transport: T,
    config: ExchangeConfig,
    clock: Arc<dyn Clock>,
    dispatcher: Dispatcher,
    books: OrderBookStore,
    tickers: Mutex<HashMap<(CurrencyPair, MarketType), Arc<Ticker>>>,
    codec: RwLock<SymbolCodec>,
    limits: RwLock<Arc<dyn ExchangeLimits>>,
    nonce: Nonce,
    open_orders: CachedEndpoint<Vec<CanonicalOrder>>,
    balances: CachedEndpoint<Balances>,
}

impl<D: Dialect, T: Transport> fmt::Debug for Adapter<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("exchange", &D::NAME)
            .field("dispatcher", &self.dispatcher)
            .field("books", &self.books.len())
            .finish_non_exhaustive()
    }
}

impl<D: Dialect, T: Transport> Adapter<D, T> {
    /// Creates an adapter on the system clock.
    pub fn new(dialect: D, transport: T, config: ExchangeConfig) -> Result<Self> {
        Self::with_clock(dialect, transport, config, Arc::new(SystemClock))
    }

    /// Creates an adapter on the given clock; tests drive time through it.
    pub fn with_clock(
        dialect: D,
        transport: T,
        config: ExchangeConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let codec = dialect.initial_codec()?;
        let dispatcher = Dispatcher::new(dialect.tune(config.dispatcher.clone()), clock.clone());
        let open_orders = CachedEndpoint::new(
            dialect.open_orders_request().endpoint_key(),
            D::QUOTAS.open_orders,
        );
        let balances =
            CachedEndpoint::new(dialect.balances_request().endpoint_key(), D::QUOTAS.balances);
        Ok(Self {
            dialect,
            transport,
            config,
            nonce: Nonce::with_resolution(clock.clone(), D::NONCE_RESOLUTION),
            clock,
            dispatcher,
            books: OrderBookStore::new(),
            tickers: Mutex::new(HashMap::new()),
            codec: RwLock::new(codec),
            limits: RwLock::new(Arc::new(DefaultLimits)),
            open_orders,
            balances,
        })
    }

    /// Exchange identifier.
    pub fn id(&self) -> &'static str {
        D::ID
    }

    /// Exchange display name.
    pub fn name(&self) -> &'static str {
        D::NAME
    }

    /// Adapter configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// The dispatcher pacing this exchange's endpoints.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The order-book store.
    pub fn books(&self) -> &OrderBookStore {
        &self.books
    }

    /// Exchange symbol for `pair`.
    pub fn symbol(&self, pair: &CurrencyPair) -> Result<String> {
        Ok(self.codec.read().to_symbol(pair)?)
    }

    /// Pair for an exchange symbol.
    pub fn pair(&self, symbol: &str) -> Result<CurrencyPair> {
        Ok(self.codec.read().to_pair(symbol)?)
    }

    /// Current trading limits.
    pub fn limits(&self) -> Arc<dyn ExchangeLimits> {
        self.limits.read().clone()
    }

    // ==================== Markets ====================

    /// Fetches the market listing and applies it.
    ///
    /// Exchanges with a fixed codec have no listing; this returns `Ok(0)` for them.
    pub async fn load_markets(&self) -> Result<usize> {
        let Some(request) = self.dialect.markets_request() else {
            return Ok(0);
        };
        let payload = self.transport.public(&request).await?;
        let payload = self.dialect.check_response(payload)?;
        self.apply_markets(&payload)
    }

    /// Applies a market-listing payload: new limits, and a rebuilt symbol table
    /// for table-based codecs. Format-based codecs are left as they are.
    ///
    /// The previous table stays in effect if the payload is rejected.
    pub fn apply_markets(&self, payload: &Value) -> Result<usize> {
        let listing = self
            .dialect
            .parse_markets(payload)
            .with_context(|| format!("{} market listing", D::NAME))?;
        let count = listing.markets.len();

        if let Some(table) = self.codec.write().table_mut() {
            table.rebuild(listing.markets)?;
        }
        *self.limits.write() = Arc::new(listing.limits);
        info!(exchange = D::ID, markets = count, "Loaded markets");
        Ok(count)
    }

    // ==================== Order books ====================

    /// Fetches a fresh order book for `pair` and stores it.
    ///
    /// When the endpoint is paced out or banned, the stored snapshot (if any) is
    /// returned as stale data and the store is left untouched.
    pub async fn update_order_book(
        &self,
        pair: &CurrencyPair,
        market_type: MarketType,
    ) -> Result<Dispatched<Option<Arc<OrderBookSnapshot>>>> {
        let symbol = self.symbol(pair)?;
        let depth = self.config.order_book_depth;
        let request = self.dialect.order_book_request(&symbol, depth);
        let fallback = self.books.get(pair, &market_type).ok();

        let outcome = self
            .dispatcher
            .dispatch(
                &request.endpoint_key(),
                D::QUOTAS.order_book,
                || async {
                    let payload = self.transport.public(&request).await?;
                    let payload = self.dialect.check_response(payload)?;
                    let mut snapshot = self
                        .dialect
                        .parse_order_book(&payload, self.clock.now_ms())
                        .with_context(|| format!("{} order book for {symbol}", D::NAME))?;
                    snapshot.truncate(depth);
                    Ok(Some(Arc::new(snapshot)))
                },
                fallback,
            )
            .await?;

        if let Dispatched::Fresh(Some(snapshot)) = &outcome {
            self.books.put(pair.clone(), market_type, Arc::clone(snapshot));
        }
        Ok(outcome)
    }

    /// Updates several books concurrently; each pair is paced on its own key.
    pub async fn update_order_books(
        &self,
        pairs: &[CurrencyPair],
        market_type: MarketType,
    ) -> Vec<Result<Dispatched<Option<Arc<OrderBookSnapshot>>>>> {
        join_all(
            pairs
                .iter()
                .map(|pair| self.update_order_book(pair, market_type.clone())),
        )
        .await
    }

    /// Latest stored book for `pair`; never touches the network.
    pub fn order_book(
        &self,
        pair: &CurrencyPair,
        market_type: &MarketType,
    ) -> Result<Arc<OrderBookSnapshot>> {
        self.books.get(pair, market_type)
    }

    // ==================== Tickers ====================

    /// Fetches a fresh ticker for `pair` and caches it.
    ///
    /// Paced per symbol like order books. A skipped call returns the cached
    /// ticker (if any) as stale data.
    pub async fn update_ticker(
        &self,
        pair: &CurrencyPair,
        market_type: MarketType,
    ) -> Result<Dispatched<Option<Arc<Ticker>>>> {
        let symbol = self.symbol(pair)?;
        let request = self.dialect.ticker_request(&symbol);
        let cache_key = (pair.clone(), market_type);
        let fallback = self.tickers.lock().get(&cache_key).cloned();

        let outcome = self
            .dispatcher
            .dispatch(
                &request.endpoint_key(),
                D::QUOTAS.ticker,
                || async {
                    let payload = self.transport.public(&request).await?;
                    let payload = self.dialect.check_response(payload)?;
                    let ticker = self
                        .dialect
                        .parse_ticker(&payload, &symbol, pair, self.clock.now_ms())
                        .with_context(|| format!("{} ticker for {symbol}", D::NAME))?;
                    Ok(Some(Arc::new(ticker)))
                },
                fallback,
            )
            .await?;

        if let Dispatched::Fresh(Some(ticker)) = &outcome {
            self.tickers.lock().insert(cache_key, Arc::clone(ticker));
        }
        Ok(outcome)
    }

    /// Cached ticker for `pair`; never touches the network.
    pub fn ticker(&self, pair: &CurrencyPair, market_type: &MarketType) -> Result<Arc<Ticker>> {
        self.tickers
            .lock()
            .get(&(pair.clone(), market_type.clone()))
            .cloned()
            .ok_or_else(|| {
                Error::not_found(format!("{} ticker for {pair} ({market_type})", D::NAME))
            })
    }

    /// Cached ticker for `pair`, fetching one when nothing is cached yet.
    ///
    /// Fails with `NotFound` when the fetch is skipped before any ticker was
    /// stored.
    pub async fn ticker_price(
        &self,
        pair: &CurrencyPair,
        market_type: MarketType,
    ) -> Result<Arc<Ticker>> {
        if let Ok(ticker) = self.ticker(pair, &market_type) {
            return Ok(ticker);
        }
        let label = format!("{} ticker for {pair} ({market_type})", D::NAME);
        self.update_ticker(pair, market_type)
            .await?
            .into_value()
            .ok_or_else(|| Error::not_found(label))
    }

    // ==================== Account reads ====================

    /// Open orders of the account, paced by the dispatcher.
    ///
    /// Stale results carry the last good listing, or an empty one before the
    /// first success.
    pub async fn open_orders(&self) -> Result<Dispatched<Vec<CanonicalOrder>>> {
        let request = self.dialect.open_orders_request();
        self.open_orders
            .fetch(
                &self.dispatcher,
                || async {
                    let payload = self.private(&request).await?;
                    let raws = self.dialect.parse_open_orders(&payload)?;
                    self.normalize_orders(&raws)
                },
                Vec::new(),
            )
            .await
    }

    /// Account balances, paced by the dispatcher.
    pub async fn balances(&self) -> Result<Dispatched<Balances>> {
        let request = self.dialect.balances_request();
        self.balances
            .fetch(
                &self.dispatcher,
                || async {
                    let payload = self.private(&request).await?;
                    normalize_balances(self.dialect.parse_balances(&payload)?)
                },
                Balances::new(),
            )
            .await
    }

    /// One order by id. Never served from cache.
    pub async fn order(&self, id: &str, pair: Option<&CurrencyPair>) -> Result<CanonicalOrder> {
        let symbol = pair.map(|p| self.symbol(p)).transpose()?;
        let request = self.dialect.order_request(id, symbol.as_deref())?;
        let payload = self.private(&request).await?;
        let raw = self.dialect.parse_order(&payload, id)?;
        self.normalize_order(&raw)
    }

    // ==================== Trading ====================

    /// Validates and places an order, returning the exchange's order id.
    ///
    /// Never paced or served from cache: a skipped placement must not look like
    /// success.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<String> {
        let symbol = self.symbol(&order.pair)?;
        validate_order(self.limits().as_ref(), &order.pair, order.amount, order.price)?;
        let request = self.dialect.place_order_request(order, &symbol)?;
        let payload = self.private(&request).await?;
        let id = self.dialect.parse_placed_order_id(&payload)?;
        debug!(
            exchange = D::ID,
            order_id = %id,
            pair = %order.pair,
            side = %order.side,
            "Placed order"
        );
        Ok(id)
    }

    /// Cancels an order.
    pub async fn cancel_order(&self, id: &str, pair: Option<&CurrencyPair>) -> Result<()> {
        let symbol = pair.map(|p| self.symbol(p)).transpose()?;
        let request = self.dialect.cancel_order_request(id, symbol.as_deref())?;
        self.private(&request).await?;
        debug!(exchange = D::ID, order_id = id, "Cancelled order");
        Ok(())
    }

    // ==================== Internals ====================

    async fn private(&self, request: &ExchangeRequest) -> Result<Value> {
        if !self.config.has_credentials() {
            return Err(Error::authentication(format!(
                "{} requires API credentials for {} {}",
                D::NAME,
                request.method,
                request.path
            )));
        }
        let nonce = self.nonce.next();
        if self.config.verbose {
            debug!(
                exchange = D::ID,
                method = %request.method,
                path = %request.path,
                nonce,
                "Private request"
            );
        }
        let payload = self.transport.private(request, nonce).await?;
        self.dialect.check_response(payload)
    }

    // The codec guard is released before returning, so no lock crosses an await.
    fn normalize_orders(&self, raws: &[RawOrder<D::Status>]) -> Result<Vec<CanonicalOrder>> {
        let codec = self.codec.read();
        let ctx = ExchangeContext::new(D::NAME, &codec, &D::FIELDS);
        normalize_all(raws, &ctx)
    }

    fn normalize_order(&self, raw: &RawOrder<D::Status>) -> Result<CanonicalOrder> {
        let codec = self.codec.read();
        let ctx = ExchangeContext::new(D::NAME, &codec, &D::FIELDS);
        normalize(raw, &ctx)
    }
}
