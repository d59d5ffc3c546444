use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

use crate::config::SearchCredentials;
use crate::error::{PipelineError, PipelineResult};

const DATALAB_URL: &str = "https://openapi.naver.com/v1/datalab/search";

/// Outcome of a volume lookup. `fallback` means the caller must estimate.
#[derive(Debug, Clone, Default)]
pub struct VolumeLookup {
    pub fallback: bool,
    pub result: Option<BTreeMap<String, u64>>,
}

impl VolumeLookup {
    pub fn fallback() -> Self {
        Self {
            fallback: true,
            result: None,
        }
    }
}

#[async_trait]
pub trait VolumeSource: Send + Sync {
    async fn volumes(&self, keywords: &[String]) -> VolumeLookup;
}

/// Deterministic stand-in used whenever real volumes are unavailable.
pub fn estimate_volume(keyword: &str) -> u64 {
    keyword.chars().count() as u64 * 1000 + 300
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataLabRequest<'a> {
    start_date: &'a str,
    end_date: &'a str,
    time_unit: &'a str,
    keyword_groups: Vec<KeywordGroup<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeywordGroup<'a> {
    group_name: &'a str,
    keywords: [&'a str; 1],
}

#[derive(Deserialize)]
struct DataLabResponse {
    results: Vec<DataLabSeries>,
}

#[derive(Deserialize)]
struct DataLabSeries {
    title: String,
    #[serde(default)]
    data: Vec<DataLabPoint>,
}

#[derive(Deserialize)]
struct DataLabPoint {
    ratio: f64,
}

/// Average ratio per keyword group.
pub fn parse_datalab_volumes(body: &str) -> PipelineResult<BTreeMap<String, u64>> {
    let response: DataLabResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .map(|series| {
            let volume = if series.data.is_empty() {
                estimate_volume(&series.title)
            } else {
                let sum: f64 = series.data.iter().map(|p| p.ratio).sum();
                (sum / series.data.len() as f64) as u64
            };
            (series.title, volume)
        })
        .collect())
}

pub struct NaverDataLabClient {
    credentials: Option<SearchCredentials>,
    client: Client,
}

impl NaverDataLabClient {
    /// Without credentials every lookup reports `fallback`.
    pub fn new(credentials: Option<SearchCredentials>) -> PipelineResult<Self> {
        if credentials.is_none() {
            warn!("search credentials missing; keyword volumes will be estimated");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PipelineError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            credentials,
            client,
        })
    }

    async fn request(
        &self,
        credentials: &SearchCredentials,
        keywords: &[String],
    ) -> PipelineResult<BTreeMap<String, u64>> {
        let body = DataLabRequest {
            start_date: "2024-01-01",
            end_date: "2024-12-31",
            time_unit: "month",
            keyword_groups: keywords
                .iter()
                .map(|kw| KeywordGroup {
                    group_name: kw,
                    keywords: [kw],
                })
                .collect(),
        };
        let res = self
            .client
            .post(DATALAB_URL)
            .header("X-Naver-Client-Id", &credentials.client_id)
            .header("X-Naver-Client-Secret", &credentials.client_secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::transport("naver-datalab", e))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| PipelineError::transport("naver-datalab", e))?;
        if !status.is_success() {
            return Err(PipelineError::transport("naver-datalab", format!("{}: {}", status, text)));
        }
        parse_datalab_volumes(&text)
    }
}

#[async_trait]
impl VolumeSource for NaverDataLabClient {
    async fn volumes(&self, keywords: &[String]) -> VolumeLookup {
        let Some(credentials) = &self.credentials else {
            return VolumeLookup::fallback();
        };
        match self.request(credentials, keywords).await {
            Ok(result) => VolumeLookup {
                fallback: false,
                result: Some(result),
            },
            Err(e) => {
                warn!(error = %e, "DataLab lookup failed; estimating volumes");
                VolumeLookup::fallback()
            }
        }
    }
}
