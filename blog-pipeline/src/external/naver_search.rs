use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::{SearchClient, SearchItem};
use crate::config::SearchCredentials;
use crate::error::{PipelineError, PipelineResult};

const SEARCH_URL: &str = "https://openapi.naver.com/v1/search/blog.json";
const SERVICE: &str = "naver-search";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    bloggername: String,
    #[serde(default)]
    postdate: String,
}

/// Strip the highlight tags and the two entities the search API emits.
pub fn clean_markup(text: &str) -> String {
    text.replace("<b>", "")
        .replace("</b>", "")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Parse a blog search response body into cleaned items.
pub fn parse_search_response(body: &str) -> PipelineResult<Vec<SearchItem>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .map(|item| SearchItem {
            title: clean_markup(&item.title),
            link: item.link,
            description: clean_markup(&item.description),
            blogger: item.bloggername,
            postdate: item.postdate,
        })
        .collect())
}

pub struct NaverSearchClient {
    credentials: SearchCredentials,
    client: Client,
}

impl NaverSearchClient {
    pub fn new(credentials: SearchCredentials) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| PipelineError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            credentials,
            client,
        })
    }
}

#[async_trait]
impl SearchClient for NaverSearchClient {
    async fn search(&self, query: &str, display: usize) -> PipelineResult<Vec<SearchItem>> {
        let display = display.to_string();
        let res = self
            .client
            .get(SEARCH_URL)
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .query(&[("query", query), ("display", display.as_str()), ("sort", "sim")])
            .send()
            .await
            .map_err(|e| PipelineError::transport(SERVICE, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| PipelineError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(PipelineError::transport(
                SERVICE,
                format!("{}: {}", status, body),
            ));
        }
        parse_search_response(&body)
    }
}

/// Deterministic placeholder results for runs without search credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSearchClient;

impl OfflineSearchClient {
    pub fn results(query: &str, count: usize) -> Vec<SearchItem> {
        (1..=count)
            .map(|i| SearchItem {
                title: format!("{} 관련 블로그 포스트 {}", query, i),
                link: format!("https://example.com/blog/{}", i),
                description: format!("{}에 대한 상세 설명입니다.", query),
                blogger: format!("블로거{}", i),
                postdate: "20250114".to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchClient for OfflineSearchClient {
    async fn search(&self, query: &str, display: usize) -> PipelineResult<Vec<SearchItem>> {
        warn!(query, "offline search: returning placeholder results");
        Ok(Self::results(query, display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_markup() {
        assert_eq!(
            clean_markup("<b>겨울</b> 여행 &quot;꿀팁&quot; &amp; 준비물"),
            "겨울 여행 \"꿀팁\" & 준비물"
        );
    }

    #[test]
    fn test_parse_search_response_maps_blogger_name() {
        let body = r#"{
            "total": 2,
            "items": [
                {"title": "<b>가족</b> 여행", "link": "https://blog.naver.com/abc/1", "description": "d", "bloggername": "여행자", "postdate": "20241201"},
                {"title": "두번째", "link": "https://blog.naver.com/xyz/2"}
            ]
        }"#;
        let items = parse_search_response(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "가족 여행");
        assert_eq!(items[0].blogger, "여행자");
        assert_eq!(items[1].description, "");
    }

    #[test]
    fn test_offline_results_are_deterministic() {
        let items = OfflineSearchClient::results("겨울 여행", 3);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].title, "겨울 여행 관련 블로그 포스트 3");
        assert_eq!(items[2].link, "https://example.com/blog/3");
        assert_eq!(items, OfflineSearchClient::results("겨울 여행", 3));
    }
}
