//! Bounded image prefetch pool.
//!
//! A batch is a set of tasks tracked by a `JoinSet`; at most `workers` of
//! them hold a semaphore permit at once. A job whose listing carried no image
//! URL looks it up under the same permit before downloading. Each
//! finished job is reported through an `mpsc` queue, which has exactly one
//! consumer: the UI loop. Workers never touch UI state.
//!
//! Dropping a [`PrefetchBatch`] aborts whatever is still outstanding.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::api::{CatalogClient, Target};
use super::catalog::CatalogId;
use super::images::ImageCache;

#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchJob {
    pub podcast_id: CatalogId,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchResult {
    /// Batch the job belonged to; lets the consumer drop stale results.
    pub batch: u64,
    pub podcast_id: CatalogId,
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub fetched: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.fetched + self.failed + self.cancelled
    }
}

#[derive(Clone)]
pub struct PrefetchPool {
    cache: ImageCache,
    workers: usize,
}

impl PrefetchPool {
    pub fn new(cache: ImageCache, workers: usize) -> Self {
        Self {
            cache,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Download every job's image through the cache. Jobs without a URL
    /// report `None`.
    pub fn spawn_batch(
        &self,
        batch: u64,
        jobs: Vec<PrefetchJob>,
        results: mpsc::Sender<PrefetchResult>,
    ) -> PrefetchBatch {
        let cache = self.cache.clone();
        self.spawn_with(batch, jobs, results, move |job| {
            let cache = cache.clone();
            async move {
                match job.image_url {
                    Some(url) => cache.fetch_or_none(&url).await,
                    None => None,
                }
            }
        })
    }

    /// Like [`spawn_batch`](Self::spawn_batch), but a job without a URL asks
    /// `client` for its podcast's image first.
    pub fn spawn_resolving(
        &self,
        batch: u64,
        jobs: Vec<PrefetchJob>,
        client: CatalogClient,
        target: Target,
        results: mpsc::Sender<PrefetchResult>,
    ) -> PrefetchBatch {
        let cache = self.cache.clone();
        self.spawn_with(batch, jobs, results, move |job| {
            let (cache, client) = (cache.clone(), client.clone());
            async move {
                let url = match job.image_url {
                    Some(url) => url,
                    None => client.podcast_image_url(&job.podcast_id, target).await?,
                };
                cache.fetch_or_none(&url).await
            }
        })
    }

    /// Run `fetch` for every job, `workers` at a time.
    pub fn spawn_with<F, Fut>(
        &self,
        batch: u64,
        jobs: Vec<PrefetchJob>,
        results: mpsc::Sender<PrefetchResult>,
        fetch: F,
    ) -> PrefetchBatch
    where
        F: Fn(PrefetchJob) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Option<PathBuf>> + Send + 'static,
    {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();
        debug!("prefetch batch {}: {} jobs, {} workers", batch, jobs.len(), self.workers);

        for job in jobs {
            let permits = Arc::clone(&permits);
            let results = results.clone();
            let fetch = fetch.clone();
            set.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return false;
                };
                let podcast_id = job.podcast_id.clone();
                let image = fetch(job).await;
                let ok = image.is_some();
                let result = PrefetchResult {
                    batch,
                    podcast_id,
                    image,
                };
                if results.send(result).await.is_err() {
                    debug!("prefetch batch {}: result queue closed", batch);
                }
                ok
            });
        }

        PrefetchBatch { batch, set }
    }
}

/// Handle to an in-flight batch.
pub struct PrefetchBatch {
    batch: u64,
    set: JoinSet<bool>,
}

impl PrefetchBatch {
    pub fn id(&self) -> u64 {
        self.batch
    }

    /// Outstanding tasks.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn abort(&mut self) {
        self.set.abort_all();
    }

    /// Wait for every task in the batch to finish.
    pub async fn join(mut self) -> BatchReport {
        let mut report = BatchReport::default();
        while let Some(outcome) = self.set.join_next().await {
            match outcome {
                Ok(true) => report.fetched += 1,
                Ok(false) => report.failed += 1,
                Err(e) if e.is_cancelled() => report.cancelled += 1,
                Err(e) => {
                    warn!("prefetch batch {}: task panicked: {}", self.batch, e);
                    report.failed += 1;
                }
            }
        }
        debug!("prefetch batch {} done: {:?}", self.batch, report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn pool(workers: usize) -> PrefetchPool {
        let cache = ImageCache::new(std::env::temp_dir(), reqwest::Client::new());
        PrefetchPool::new(cache, workers)
    }

    fn jobs(n: usize) -> Vec<PrefetchJob> {
        (0..n)
            .map(|i| PrefetchJob {
                podcast_id: CatalogId::from(i as u64),
                image_url: Some(format!("http://img/{}.png", i)),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded_and_join_waits_for_all() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::channel(64);

        let (f_in, f_peak) = (in_flight.clone(), peak.clone());
        let batch = pool(3).spawn_with(1, jobs(12), tx, move |job| {
            let (in_flight, peak) = (f_in.clone(), f_peak.clone());
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                job.image_url.map(PathBuf::from)
            }
        });

        let report = batch.join().await;
        assert_eq!(report.fetched, 12);
        assert_eq!(report.total(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);

        let mut received = 0;
        while let Ok(result) = rx.try_recv() {
            assert_eq!(result.batch, 1);
            assert!(result.image.is_some());
            received += 1;
        }
        assert_eq!(received, 12);
    }

    #[tokio::test]
    async fn test_jobs_without_url_report_none() {
        let (tx, mut rx) = mpsc::channel(8);
        let job = PrefetchJob {
            podcast_id: CatalogId::from(9u64),
            image_url: None,
        };
        let batch = pool(2).spawn_batch(4, vec![job], tx);
        let report = batch.join().await;
        assert_eq!(report.failed, 1);
        let result = rx.recv().await.unwrap();
        assert_eq!(result.podcast_id.as_str(), "9");
        assert!(result.image.is_none());
    }

    #[tokio::test]
    async fn test_lookups_share_the_worker_bound() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (tx, _rx) = mpsc::channel(64);
        let unresolved: Vec<PrefetchJob> = (0..8u64)
            .map(|i| PrefetchJob {
                podcast_id: CatalogId::from(i),
                image_url: None,
            })
            .collect();

        let (f_in, f_peak) = (in_flight.clone(), peak.clone());
        let batch = pool(2).spawn_with(3, unresolved, tx, move |job| {
            let (in_flight, peak) = (f_in.clone(), f_peak.clone());
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                // Stands in for the image URL lookup.
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Some(PathBuf::from(job.podcast_id.as_str()))
            }
        });

        let report = batch.join().await;
        assert_eq!(report.fetched, 8);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abort_cancels_outstanding() {
        let (tx, _rx) = mpsc::channel(64);
        let mut batch = pool(1).spawn_with(2, jobs(5), tx, |_job| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            None
        });
        assert_eq!(batch.len(), 5);
        batch.abort();
        let report = batch.join().await;
        assert_eq!(report.cancelled, 5);
    }
}
