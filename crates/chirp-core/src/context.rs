// ABOUTME: Injectable capabilities handed to the chat engine.
// ABOUTME: Random source, wall clock, store, reply source, and policy values.

use crate::config::EngineConfig;
use crate::reply::ReplySource;
use crate::store::KeyValueStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of uniform samples in [0, 1)
pub trait Entropy: Send {
    fn next_unit(&mut self) -> f64;
}

/// Entropy backed by a seeded standard RNG
pub struct StdEntropy {
    rng: StdRng,
}

impl StdEntropy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl Entropy for StdEntropy {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Entropy that replays a fixed script, then repeats a fallback value.
/// Used to pin delays, failure draws, and reply picks in tests.
pub struct ScriptedEntropy {
    values: VecDeque<f64>,
    fallback: f64,
}

const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

impl ScriptedEntropy {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.5,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }
}

impl Entropy for ScriptedEntropy {
    fn next_unit(&mut self) -> f64 {
        self.values
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(0.0, MAX_UNIT)
    }
}

/// Pick a duration uniformly from [min, max)
pub fn uniform_delay(entropy: &mut dyn Entropy, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    min + (max - min).mul_f64(entropy.next_unit())
}

/// Wall clock in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Everything the engine needs from the outside world
pub struct EngineContext {
    pub store: Arc<dyn KeyValueStore>,
    pub replies: Arc<dyn ReplySource>,
    pub entropy: Box<dyn Entropy>,
    pub clock: Arc<dyn Clock>,
    pub config: EngineConfig,
}

impl EngineContext {
    /// Context with system clock, OS-seeded entropy, and default policy
    pub fn new(store: Arc<dyn KeyValueStore>, replies: Arc<dyn ReplySource>) -> Self {
        Self {
            store,
            replies,
            entropy: Box::new(StdEntropy::new()),
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    pub fn with_entropy(mut self, entropy: impl Entropy + 'static) -> Self {
        self.entropy = Box::new(entropy);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config.validated();
        self
    }
}
