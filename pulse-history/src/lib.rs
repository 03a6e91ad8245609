//! Bounded, persisted history of past analyses.
//!
//! [`History`] keeps the list in memory, newest first, and writes it through a
//! [`HistoryStore`] on every change. The store is read exactly once, when the
//! history is opened. [`dashboard`] derives the summary views from the list.
//!
//! # Examples
//! ```
//! use pulse_analysis::AnalysisResult;
//! use pulse_common::SocialPlatform;
//! use pulse_history::{History, SqliteHistoryStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), pulse_history::HistoryError> {
//! let store = SqliteHistoryStore::connect("sqlite::memory:").await?;
//! let mut history = History::open(Box::new(store), 20).await;
//!
//! let entry = history
//!     .record(AnalysisResult::default(), SocialPlatform::Google, "   ")
//!     .await?;
//! assert_eq!(entry.post, "Default google analysis");
//! assert_eq!(history.entries().len(), 1);
//! # Ok(())
//! # }
//! ```
use chrono::{DateTime, Utc};
use pulse_analysis::AnalysisResult;
use pulse_common::SocialPlatform;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod dashboard;
pub mod store;

pub use store::{HistoryStore, SqliteHistoryStore, HISTORY_KEY};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One recorded analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub analysis: AnalysisResult,
    pub platform: SocialPlatform,
    /// The analysed input (text, URL or business name).
    pub post: String,
    pub date: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(analysis: AnalysisResult, platform: SocialPlatform, post: &str) -> Self {
        let post = post.trim();
        let post = if post.is_empty() {
            format!("Default {platform} analysis")
        } else {
            post.to_string()
        };
        Self {
            id: Uuid::new_v4(),
            analysis,
            platform,
            post,
            date: Utc::now(),
        }
    }
}

pub struct History {
    store: Box<dyn HistoryStore>,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl History {
    /// Load the persisted history. An unreadable store starts empty.
    pub async fn open(store: Box<dyn HistoryStore>, max_entries: usize) -> Self {
        let mut entries = match store.load().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "history.open.load_failed");
                Vec::new()
            }
        };
        entries.truncate(max_entries);
        tracing::debug!(entries = entries.len(), max_entries, "history.open");
        Self {
            store,
            entries,
            max_entries,
        }
    }

    /// Newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend a new entry, drop the oldest beyond the cap and persist.
    ///
    /// The in-memory list is updated even if persisting fails.
    pub async fn record(
        &mut self,
        analysis: AnalysisResult,
        platform: SocialPlatform,
        post: &str,
    ) -> Result<HistoryEntry, HistoryError> {
        let entry = HistoryEntry::new(analysis, platform, post);
        self.entries.insert(0, entry.clone());
        self.entries.truncate(self.max_entries);

        tracing::info!(
            id = %entry.id,
            platform = %platform,
            score = entry.analysis.overall_score,
            entries = self.entries.len(),
            "history.record"
        );
        self.store.save(&self.entries).await?;
        Ok(entry)
    }

    pub async fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        tracing::info!("history.clear");
        self.store.save(&self.entries).await
    }
}
