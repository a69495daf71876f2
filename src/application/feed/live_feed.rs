use crate::application::market_data::{CandleGenerator, PatternSampler};
use crate::config::FeedConfig;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{FeedEvent, Timeframe};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Starts per-connection synthetic feeds.
///
/// Every subscription gets its own RNG stream, price path and pair of timers;
/// nothing is shared between subscriptions.
pub struct LiveFeed {
    config: FeedConfig,
    sampler: PatternSampler,
    next_stream: AtomicU64,
    active: Arc<AtomicUsize>,
}

impl LiveFeed {
    pub fn new(config: FeedConfig) -> Result<Self, MarketDataError> {
        let sampler = PatternSampler::new(config.pattern_probability)?;
        Ok(Self {
            config,
            sampler,
            next_stream: AtomicU64::new(0),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Feeds started and not yet torn down.
    pub fn active_feeds(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Fresh RNG for one subscription: derived from the configured seed when
    /// there is one, from OS entropy otherwise.
    pub fn next_rng(&self) -> StdRng {
        let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn subscribe(&self, symbol: &str, timeframe: Timeframe) -> Subscription {
        self.subscribe_with_rng(symbol, timeframe, self.next_rng())
    }

    pub fn subscribe_with_rng(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        rng: StdRng,
    ) -> Subscription {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let handle = self.start(symbol, timeframe, rng, tx);

        Subscription {
            symbol: symbol.to_string(),
            timeframe,
            events: rx,
            handle,
        }
    }

    /// Queues the historical backfill on `tx`, then arms the candle and
    /// heartbeat timers. The returned handle owns both timers.
    pub fn start(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        mut rng: StdRng,
        tx: Sender<FeedEvent>,
    ) -> FeedHandle {
        let label = format!("{}@{}", symbol, timeframe);

        let base_price =
            Decimal::from_f64(150.0 + rng.random::<f64>() * 50.0).unwrap_or(Decimal::ONE_HUNDRED);
        let historical = CandleGenerator::backfill(
            base_price,
            Utc::now(),
            self.config.backfill_candles,
            timeframe.interval(),
            &mut rng,
        );
        let last_close = historical.last().map(|c| c.close).unwrap_or(base_price);

        info!(
            "LiveFeed[{}]: Sending {} historical candles, last close {}",
            label,
            historical.len(),
            last_close
        );
        deliver(&tx, FeedEvent::Historical(historical), &label);

        let candle_task = tokio::spawn(run_candle_timer(
            rng,
            last_close,
            self.sampler,
            self.config.update_interval(),
            tx.clone(),
            label.clone(),
        ));
        let heartbeat_task = tokio::spawn(run_heartbeat_timer(
            self.config.heartbeat_interval(),
            tx,
            label.clone(),
        ));

        self.active.fetch_add(1, Ordering::SeqCst);
        FeedHandle {
            label,
            candle_task: Some(candle_task),
            heartbeat_task: Some(heartbeat_task),
            active: self.active.clone(),
        }
    }
}

/// Owns the two timers of one subscription.
///
/// `shutdown` cancels both and waits until neither can run again. Dropping
/// the handle cancels them too, without waiting.
pub struct FeedHandle {
    label: String,
    candle_task: Option<JoinHandle<()>>,
    heartbeat_task: Option<JoinHandle<()>>,
    active: Arc<AtomicUsize>,
}

impl FeedHandle {
    /// True while at least one timer is still scheduled.
    pub fn is_active(&self) -> bool {
        [&self.candle_task, &self.heartbeat_task]
            .into_iter()
            .flatten()
            .any(|task| !task.is_finished())
    }

    pub async fn shutdown(mut self) {
        let tasks = [self.candle_task.take(), self.heartbeat_task.take()];
        for task in tasks.iter().flatten() {
            task.abort();
        }
        for task in tasks.into_iter().flatten() {
            // Cancelled tasks resolve to a JoinError; that is the expected outcome.
            let _ = task.await;
        }
        info!("LiveFeed[{}]: Timers stopped", self.label);
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        for task in [self.candle_task.take(), self.heartbeat_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A live feed as seen by its single consumer.
pub struct Subscription {
    symbol: String,
    timeframe: Timeframe,
    events: Receiver<FeedEvent>,
    handle: FeedHandle,
}

impl Subscription {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Next event in emission order. The backfill always comes first.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    pub async fn close(self) {
        self.handle.shutdown().await;
    }
}

async fn run_candle_timer(
    mut rng: StdRng,
    mut price: Decimal,
    sampler: PatternSampler,
    period: Duration,
    tx: Sender<FeedEvent>,
    label: String,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let now = Utc::now();
        let candle = CandleGenerator::generate(price, now, &mut rng);
        price = candle.close;
        if !deliver(&tx, FeedEvent::CandleUpdate(candle), &label) {
            break;
        }

        if let Some(pattern) = sampler.maybe_sample(&mut rng, now) {
            debug!(
                "LiveFeed[{}]: Emitting {} {} pattern",
                label, pattern.direction, pattern.pattern_type
            );
            if !deliver(&tx, FeedEvent::PatternDetected(pattern), &label) {
                break;
            }
        }
    }
    debug!("LiveFeed[{}]: Candle timer exited", label);
}

async fn run_heartbeat_timer(period: Duration, tx: Sender<FeedEvent>, label: String) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !deliver(&tx, FeedEvent::Heartbeat, &label) {
            break;
        }
    }
    debug!("LiveFeed[{}]: Heartbeat timer exited", label);
}

/// Best-effort hand-off. A full buffer drops the event; a closed one ends the caller.
fn deliver(tx: &Sender<FeedEvent>, event: FeedEvent, label: &str) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            debug!(
                "LiveFeed[{}]: Consumer lagging, dropped {} event",
                label,
                event.kind()
            );
            true
        }
        Err(TrySendError::Closed(_)) => {
            debug!("LiveFeed[{}]: Consumer gone", label);
            false
        }
    }
}
