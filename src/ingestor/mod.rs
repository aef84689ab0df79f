//! Batch emote ingestion
//!
//! Runs the per-emote pipeline (select best variant, fetch bytes, normalize
//! when applicable, store) across a batch with a bounded number of
//! concurrent tasks. A failing emote is logged and dropped; siblings and
//! the batch itself always run to completion unless a caller-imposed
//! deadline expires first, in which case unfinished items are simply
//! omitted.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use tracing::{debug, warn};

use crate::config::IngestConfig;
use crate::errors::IngestError;
use crate::models::{EmoteMime, EmoteRecord, ImageVariant, ProcessedEmote};
use crate::selector::select_best;
use crate::storage::ContentStore;
use crate::transcode;
use crate::utils::HttpClient;
use crate::utils::naming::blob_file_name;

pub struct BatchIngestor {
    http: Arc<dyn HttpClient>,
    store: ContentStore,
    /// Bound on concurrent per-emote tasks; the sole backpressure mechanism
    concurrency: usize,
    canvas: (u32, u32),
    max_file_bytes: Option<usize>,
}

impl BatchIngestor {
    pub fn new(http: Arc<dyn HttpClient>, store: ContentStore, config: &IngestConfig) -> Self {
        Self {
            http,
            store,
            concurrency: config.concurrency.max(1),
            canvas: (config.canvas_width, config.canvas_height),
            max_file_bytes: config.max_file_bytes,
        }
    }

    /// Ingest a batch of emote records into `folder`.
    ///
    /// Result order does not match input order. The returned list contains
    /// one entry per record that made it through the whole pipeline.
    pub async fn ingest(&self, records: Vec<EmoteRecord>, folder: &str) -> Vec<ProcessedEmote> {
        self.ingest_with_deadline(records, folder, None).await
    }

    /// Like [`ingest`](Self::ingest), but abandons work still in flight
    /// when `deadline` elapses. Abandoned records are treated as failures;
    /// blob writes run to completion or not at all, so nothing is left
    /// half-written.
    pub async fn ingest_with_deadline(
        &self,
        records: Vec<EmoteRecord>,
        folder: &str,
        deadline: Option<Duration>,
    ) -> Vec<ProcessedEmote> {
        let total = records.len();
        let tasks = stream::iter(
            records
                .into_iter()
                .map(|record| self.process_one(record, folder)),
        )
        .buffer_unordered(self.concurrency);

        let results: Vec<Result<ProcessedEmote, IngestError>> = match deadline {
            None => tasks.collect().await,
            Some(limit) => {
                tasks
                    .take_until(Box::pin(tokio::time::sleep(limit)))
                    .collect()
                    .await
            }
        };

        let processed: Vec<ProcessedEmote> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(emote) => Some(emote),
                Err(err) => {
                    warn!("Dropping emote from batch: {}", err);
                    None
                }
            })
            .collect();

        debug!(
            "Batch ingest into '{}': {}/{} emotes stored",
            folder,
            processed.len(),
            total
        );
        processed
    }

    async fn process_one(
        &self,
        record: EmoteRecord,
        folder: &str,
    ) -> Result<ProcessedEmote, IngestError> {
        let variant = select_best(&record.variants)
            .cloned()
            .ok_or_else(|| IngestError::SelectionEmpty {
                emote: record.display_name.clone(),
            })?;

        let bytes = self
            .http
            .fetch_bytes(&variant.url)
            .await
            .map_err(|err| IngestError::Fetch {
                emote: record.display_name.clone(),
                message: err.to_string(),
            })?;

        let bytes = if self.should_transcode(&variant) {
            self.normalize_blocking(bytes, &record.display_name).await?
        } else {
            bytes
        };

        let file_name = blob_file_name(&record.display_name, variant.mime);
        let blob_name = format!("{folder}/{file_name}");
        let storage_url = self
            .store
            .put_if_absent(&blob_name, &bytes, variant.mime.content_type())
            .await
            .map_err(|source| IngestError::Store {
                emote: record.display_name.clone(),
                source,
            })?;

        Ok(ProcessedEmote {
            file_name,
            storage_url,
            emote_id: record.id,
            emote_name: record.display_name,
            owner: record.owner_name,
            animated: variant.animated(),
            scale: variant.scale,
            mime: variant.mime.content_type().to_string(),
        })
    }

    /// Only animated GIFs are normalized: GIF is the one animated container
    /// that can be re-encoded without changing the stored mime type. Other
    /// variants pass through unmodified.
    fn should_transcode(&self, variant: &ImageVariant) -> bool {
        variant.animated() && variant.mime == EmoteMime::Gif
    }

    /// Transcoding is CPU-bound; run it on the blocking pool so it does not
    /// stall the I/O-bound siblings.
    async fn normalize_blocking(
        &self,
        bytes: Vec<u8>,
        emote: &str,
    ) -> Result<Vec<u8>, IngestError> {
        let canvas = self.canvas;
        let max_bytes = self.max_file_bytes;
        let name = emote.to_string();
        tokio::task::spawn_blocking(move || transcode::normalize(&bytes, canvas, max_bytes))
            .await
            .map_err(|join_err| IngestError::Transcode {
                emote: name.clone(),
                source: crate::errors::TranscodeError::Decode {
                    message: format!("transcode task failed: {join_err}"),
                },
            })?
            .map_err(|source| IngestError::Transcode {
                emote: name,
                source,
            })
    }
}
