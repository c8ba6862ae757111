use std::sync::Mutex;

use argon2id_hasher::{ByteSize, CostParameters, HashError, ParametersProvider, RandomSource};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_filter(LevelFilter::WARN),
        )
        .try_init();
}

/// Parameters small enough to keep the test suite fast
#[allow(dead_code)]
pub fn cheap_parameters() -> CostParameters {
    CostParameters {
        memory: ByteSize::kib(64),
        iterations: 1,
        parallelism: 1,
        salt_length: 16,
        key_length: 32,
    }
}

/// Provider whose policy can be changed between two generations
#[allow(dead_code)]
pub struct SwitchableProvider {
    inner: Mutex<CostParameters>,
}

#[allow(dead_code)]
impl SwitchableProvider {
    pub fn new(params: CostParameters) -> Self {
        Self {
            inner: Mutex::new(params),
        }
    }

    pub fn set(&self, params: CostParameters) {
        *self.inner.lock().unwrap() = params;
    }
}

impl ParametersProvider for SwitchableProvider {
    fn cost_parameters(&self) -> CostParameters {
        *self.inner.lock().unwrap()
    }
}

#[allow(dead_code)]
pub struct FailingRandomSource;

impl RandomSource for FailingRandomSource {
    fn fill(&self, _dest: &mut [u8]) -> Result<(), HashError> {
        Err(HashError::RandomSource(rand::Error::new(
            std::io::Error::other("entropy unavailable"),
        )))
    }
}
