//! Dataset loading and snapshot publication
//!
//! All resources read from one immutable [`Datasets`] snapshot. A reload
//! builds a complete replacement first and then swaps it in, so requests
//! in flight keep the snapshot they started with and no reader ever sees
//! a partially refreshed collection.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::resources::{
    countries::Country,
    developer::{GithubRepo, NpmPackage, Question},
    facts::Fact,
    finance::{Crypto, Stock},
    fun::MemeTemplate,
    jokes::Joke,
    quotes::Quote,
    space::{Apod, Launch, Planet},
};

/// Every collection served by the API
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub quotes: Vec<Quote>,
    pub jokes: Vec<Joke>,
    pub facts: Vec<Fact>,
    pub countries: Vec<Country>,
    pub planets: Vec<Planet>,
    pub launches: Vec<Launch>,
    pub apod: Vec<Apod>,
    pub crypto: Vec<Crypto>,
    pub stocks: Vec<Stock>,
    pub github: Vec<GithubRepo>,
    pub npm: Vec<NpmPackage>,
    pub stackoverflow: Vec<Question>,
    pub random_users: Vec<Value>,
    pub meme_templates: Vec<MemeTemplate>,
}

impl Datasets {
    /// Record count per collection, keyed by dataset file name
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("quotes", self.quotes.len()),
            ("jokes", self.jokes.len()),
            ("facts", self.facts.len()),
            ("countries", self.countries.len()),
            ("planets", self.planets.len()),
            ("spaceLaunches", self.launches.len()),
            ("apod", self.apod.len()),
            ("crypto", self.crypto.len()),
            ("stocks", self.stocks.len()),
            ("githubTrending", self.github.len()),
            ("npmTrending", self.npm.len()),
            ("stackoverflowTrending", self.stackoverflow.len()),
            ("randomUsers", self.random_users.len()),
            ("memeTemplates", self.meme_templates.len()),
        ]
    }
}

/// Where datasets come from
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Build a complete set of collections
    async fn load(&self) -> Result<Datasets>;
}

/// One JSON array file per collection in a directory
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.dir.join(format!("{name}.json"));
        let unavailable = |reason: String| Error::DataUnavailable {
            name: name.to_string(),
            reason,
        };

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| unavailable(format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| unavailable(e.to_string()))
    }
}

#[async_trait]
impl DataSource for JsonDirSource {
    async fn load(&self) -> Result<Datasets> {
        Ok(Datasets {
            quotes: self.read("quotes").await?,
            jokes: self.read("jokes").await?,
            facts: self.read("facts").await?,
            countries: self.read("countries").await?,
            planets: self.read("planets").await?,
            launches: self.read("spaceLaunches").await?,
            apod: self.read("apod").await?,
            crypto: self.read("crypto").await?,
            stocks: self.read("stocks").await?,
            github: self.read("githubTrending").await?,
            npm: self.read("npmTrending").await?,
            stackoverflow: self.read("stackoverflowTrending").await?,
            random_users: self.read("randomUsers").await?,
            meme_templates: self.read("memeTemplates").await?,
        })
    }
}

/// Holder of the current snapshot
#[derive(Clone)]
pub struct DataStore {
    source: Arc<dyn DataSource>,
    current: Arc<RwLock<Arc<Datasets>>>,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore").finish_non_exhaustive()
    }
}

impl DataStore {
    /// Perform the initial load; fails if any collection is unavailable
    pub async fn load(source: Arc<dyn DataSource>) -> Result<Self> {
        let datasets = source.load().await?;
        log_counts(&datasets);
        Ok(Self {
            source,
            current: Arc::new(RwLock::new(Arc::new(datasets))),
        })
    }

    /// The snapshot to serve the current request from
    pub async fn snapshot(&self) -> Arc<Datasets> {
        Arc::clone(&*self.current.read().await)
    }

    /// Load a fresh snapshot and publish it
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<()> {
        let datasets = self.source.load().await?;
        log_counts(&datasets);
        *self.current.write().await = Arc::new(datasets);
        Ok(())
    }

    /// Reload every `interval` until the runtime shuts down
    pub fn spawn_reload_task(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match store.reload().await {
                    Ok(()) => tracing::info!("Datasets reloaded"),
                    Err(e) => tracing::warn!(error = %e, "Dataset reload failed, keeping previous snapshot"),
                }
            }
        })
    }
}

fn log_counts(datasets: &Datasets) {
    for (name, count) in datasets.counts() {
        tracing::debug!(dataset = name, records = count, "Dataset loaded");
    }
}
