//! Thin request/response wrappers around outside services.
//!
//! None of these retry. Page-level helpers swallow failures into empty
//! values; only the search API and DataLab report transport errors.

pub mod datalab;
pub mod html;
pub mod naver_search;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PipelineResult;

pub use datalab::{estimate_volume, NaverDataLabClient, VolumeLookup, VolumeSource};
pub use html::{extract_structure, HttpPageFetcher, PageStructure};
pub use naver_search::{NaverSearchClient, OfflineSearchClient};

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blogger: String,
    #[serde(default)]
    pub postdate: String,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, display: usize) -> PipelineResult<Vec<SearchItem>>;
}

/// `fetch` returns an empty string when the page could not be retrieved.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> String;
}

/// Browser-like User-Agent for blog pages that reject bare clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
