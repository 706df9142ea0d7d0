use async_trait::async_trait;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::config::{Config, HarnessConfig};
use crate::domain::{NewUser, StoreError, User, UserStore};
use crate::harness::{
    BatchLoader, BatchReport, HarnessError, ProgressCounter, SweepExecutor, SweepProbe,
    SweepReport, WorkOperation,
};
use crate::repo::MemoryStore;

/// Matches the original demo: one progress line per 10 swept ids per class.
const SWEEP_PROGRESS_EVERY: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub service: Arc<UserService>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let store = Arc::new(MemoryStore::new(cfg.store.latency_unit()));
        let service = Arc::new(UserService::new(store, cfg.harness.clone()));
        Self { cfg, service }
    }
}

pub struct UserService {
    store: Arc<dyn UserStore>,
    harness: HarnessConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, harness: HarnessConfig) -> Self {
        Self { store, harness }
    }

    pub async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        self.store.create(user).await
    }

    pub async fn read(&self, id: u64) -> Result<Option<User>, StoreError> {
        self.store.find(id).await
    }

    pub async fn update(&self, user: User) -> Result<User, StoreError> {
        self.store.update(user).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.store.delete(id).await
    }

    pub async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        self.store.find_all().await
    }

    pub async fn find_one_slowly(&self, latency_class: u32, id: u64) -> Result<User, StoreError> {
        self.store.find_one_slowly(latency_class, id).await
    }

    /// Picks a (latency class, id) pair within the configured sweep bounds.
    /// Pure in the rng: the same seed always yields the same probe.
    pub fn random_probe<R: Rng>(&self, rng: &mut R) -> SweepProbe {
        let latency_class = self
            .harness
            .latency_classes
            .choose(rng)
            .copied()
            .unwrap_or(1);
        let id = rng.gen_range(1..=self.harness.sweep_max_id.max(1));
        SweepProbe { latency_class, id }
    }

    /// Generates `harness.batch_total` synthetic users and creates each one
    /// concurrently. Blocks until every slot has an outcome.
    pub async fn seed_users(&self) -> Result<BatchReport, HarnessError> {
        let loader = BatchLoader::new(
            self.harness.progress_log_every,
            Some(self.harness.max_in_flight),
        );
        let op = Arc::new(CreateOp {
            store: Arc::clone(&self.store),
        });
        let progress = ProgressCounter::new(self.harness.batch_total);
        loader
            .load_batch(self.harness.batch_total, synthetic_user, op, progress)
            .await
    }

    /// Probes the slow read path across ids `1..=sweep_max_id` for every
    /// configured latency class, all at once, bounded by the sweep timeout.
    pub async fn sweep_slow_reads(&self) -> Result<SweepReport, HarnessError> {
        let executor = SweepExecutor::new(SWEEP_PROGRESS_EVERY);
        let op = Arc::new(SlowFindOp {
            store: Arc::clone(&self.store),
        });
        let submitted = self.harness.sweep_max_id * self.harness.latency_classes.len() as u64;
        let progress = ProgressCounter::new(submitted);
        executor
            .sweep(
                self.harness.sweep_max_id,
                &self.harness.latency_classes,
                op,
                self.harness.sweep_timeout(),
                progress,
            )
            .await
    }
}

/// Synthetic record factory for the batch loader. Stateless, safe to call
/// from any number of worker tasks.
pub fn synthetic_user(_slot: u64) -> anyhow::Result<NewUser> {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    Ok(NewUser { name, email })
}

struct CreateOp {
    store: Arc<dyn UserStore>,
}

#[async_trait]
impl WorkOperation<NewUser> for CreateOp {
    type Output = User;

    async fn execute(&self, input: NewUser) -> anyhow::Result<User> {
        Ok(self.store.create(input).await?)
    }
}

struct SlowFindOp {
    store: Arc<dyn UserStore>,
}

#[async_trait]
impl WorkOperation<SweepProbe> for SlowFindOp {
    type Output = User;

    async fn execute(&self, probe: SweepProbe) -> anyhow::Result<User> {
        Ok(self
            .store
            .find_one_slowly(probe.latency_class, probe.id)
            .await?)
    }
}
