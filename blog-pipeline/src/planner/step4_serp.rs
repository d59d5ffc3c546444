//! Step 4: Collect competing search results for the selected topic.
//!
//! Collection is partial-result tolerant. The search call itself must
//! succeed; after that, every per-result failure (fetch, parse, summary,
//! blog-home crawl) degrades that result's fields to empty values.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use blog_pipeline_sdk::{log_found, log_progress};

use crate::error::PipelineResult;
use crate::external::html::{crawl_post_list, extract_structure, naver_blog_id, PostListOrder};
use crate::external::{PageFetcher, SearchClient};
use crate::generation::GenerationMode;
use crate::planner::types::{SerpData, SerpResult};
use crate::workflow_utils::{JsonExtractor, Stage, StagePolicy, StageRequest, StageRunner};

const SUMMARY_INPUT_CHARS: usize = 3000;
const MAX_POSTS_PER_LIST: usize = 10;

#[derive(Debug, Clone)]
pub struct SerpOptions {
    pub display: usize,
    pub page_timeout: Duration,
    /// Also visit each Naver blog's home and list recent/popular posts.
    pub crawl_blog_homes: bool,
    pub blog_home_timeout: Duration,
    pub crawl_delay: Duration,
}

impl SerpOptions {
    pub fn from_policy(policy: &crate::config::PipelinePolicy, crawl_blog_homes: bool) -> Self {
        Self {
            display: policy.serp_display,
            page_timeout: Duration::from_secs(policy.page_timeout_secs),
            crawl_blog_homes,
            blog_home_timeout: Duration::from_secs(policy.blog_home_timeout_secs),
            crawl_delay: Duration::from_millis(policy.crawl_delay_ms),
        }
    }
}

pub struct PageSummaryInput {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

pub struct PageSummaryStage;

impl Stage<PageSummaryInput, PageSummary> for PageSummaryStage {
    fn name(&self) -> &'static str {
        "serp_summary"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::BestEffort
    }

    fn request(&self, input: &PageSummaryInput) -> StageRequest {
        let excerpt: String = input.text.chars().take(SUMMARY_INPUT_CHARS).collect();
        let prompt = format!(
            r#"
다음 블로그 글을 요약하고 핵심 포인트를 정리해주세요.

[제목]
{title}

[본문]
{excerpt}

[출력 형식]
JSON만 출력하세요.

{{
  "summary": "3~4문장 요약",
  "key_points": ["핵심 포인트1", "핵심 포인트2", "핵심 포인트3"]
}}
"#,
            title = input.title,
        );
        StageRequest::new(prompt, 800, GenerationMode::Fast)
    }

    fn parse(&self, _input: &PageSummaryInput, raw: &str) -> PipelineResult<PageSummary> {
        JsonExtractor::extract_as(self.name(), raw)
    }

    fn default_output(&self, _input: &PageSummaryInput) -> Option<PageSummary> {
        Some(PageSummary::default())
    }
}

pub struct SerpCollector {
    search: Arc<dyn SearchClient>,
    fetcher: Arc<dyn PageFetcher>,
    runner: StageRunner,
    options: SerpOptions,
}

impl SerpCollector {
    pub fn new(
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn PageFetcher>,
        runner: StageRunner,
        options: SerpOptions,
    ) -> Self {
        Self {
            search,
            fetcher,
            runner,
            options,
        }
    }

    pub async fn collect(&self, topic: &str, platform: &str) -> PipelineResult<SerpData> {
        let items = self.search.search(topic, self.options.display).await?;
        log_found!(items.len(), "search results");

        let total = items.len();
        let mut results = Vec::with_capacity(total);
        for (idx, item) in items.into_iter().enumerate() {
            log_progress!(idx + 1, total, "SERP pages");
            let mut result = SerpResult {
                rank: idx as u32 + 1,
                title: item.title,
                url: item.link,
                description: item.description,
                blogger: item.blogger,
                postdate: item.postdate,
                ..SerpResult::default()
            };
            self.analyze_page(&mut result).await;
            if self.options.crawl_blog_homes {
                self.crawl_blog_home(&mut result).await;
                if idx + 1 < total && !self.options.crawl_delay.is_zero() {
                    tokio::time::sleep(self.options.crawl_delay).await;
                }
            }
            results.push(result);
        }

        let total_recent_posts = results.iter().map(|r| r.recent_posts.len()).sum();
        let total_popular_posts = results.iter().map(|r| r.popular_posts.len()).sum();
        info!(results = results.len(), total_recent_posts, total_popular_posts, "SERP collected");

        Ok(SerpData {
            topic: topic.to_string(),
            platform: platform.to_string(),
            total_results: results.len(),
            total_recent_posts,
            total_popular_posts,
            serp_results: results,
        })
    }

    async fn analyze_page(&self, result: &mut SerpResult) {
        let html = self.fetcher.fetch(&result.url, self.options.page_timeout).await;
        if html.is_empty() {
            return;
        }
        let page = extract_structure(&html);
        result.h2_list = page.h2;
        result.h3_list = page.h3;
        if page.body_text.is_empty() {
            return;
        }
        result.content = page.body_text.chars().take(SUMMARY_INPUT_CHARS).collect();

        let input = PageSummaryInput {
            title: result.title.clone(),
            text: page.body_text,
        };
        match self.runner.run(&PageSummaryStage, &input).await {
            Ok(summary) => {
                result.summary = summary.summary;
                result.key_points = summary.key_points;
            }
            Err(e) => warn!(rank = result.rank, error = %e, "summary unavailable"),
        }
    }

    async fn crawl_blog_home(&self, result: &mut SerpResult) {
        let Some(blog_id) = naver_blog_id(&result.url) else {
            return;
        };
        let fetcher = self.fetcher.as_ref();
        let timeout = self.options.blog_home_timeout;
        result.recent_posts =
            crawl_post_list(fetcher, &blog_id, PostListOrder::Recent, MAX_POSTS_PER_LIST, timeout)
                .await;
        result.popular_posts =
            crawl_post_list(fetcher, &blog_id, PostListOrder::Popular, MAX_POSTS_PER_LIST, timeout)
                .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::external::{OfflineSearchClient, SearchItem};
    use crate::generation::testing::ScriptedGenerator;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> String {
            self.0.get(url).cloned().unwrap_or_default()
        }
    }

    struct FixedSearch(Vec<SearchItem>);

    #[async_trait]
    impl SearchClient for FixedSearch {
        async fn search(&self, _query: &str, display: usize) -> PipelineResult<Vec<SearchItem>> {
            Ok(self.0.iter().take(display).cloned().collect())
        }
    }

    struct DownSearch;

    #[async_trait]
    impl SearchClient for DownSearch {
        async fn search(&self, _query: &str, _display: usize) -> PipelineResult<Vec<SearchItem>> {
            Err(PipelineError::transport("naver-search", "401"))
        }
    }

    fn options(crawl: bool) -> SerpOptions {
        SerpOptions {
            display: 30,
            page_timeout: Duration::from_secs(1),
            crawl_blog_homes: crawl,
            blog_home_timeout: Duration::from_secs(1),
            crawl_delay: Duration::ZERO,
        }
    }

    fn item(title: &str, link: &str) -> SearchItem {
        SearchItem {
            title: title.to_string(),
            link: link.to_string(),
            description: String::new(),
            blogger: String::new(),
            postdate: String::new(),
        }
    }

    #[tokio::test]
    async fn test_ranks_follow_search_order_and_failures_degrade() {
        let pages = HashMap::from([(
            "https://a.example/1".to_string(),
            "<h2>준비물</h2><p>겨울 여행 준비물 이야기</p>".to_string(),
        )]);
        let generator = Arc::new(ScriptedGenerator::ok(
            "stub",
            &[r#"{"summary": "요약", "key_points": ["a", "b"]}"#],
        ));
        let collector = SerpCollector::new(
            Arc::new(FixedSearch(vec![
                item("첫 글", "https://a.example/1"),
                item("둘째 글", "https://unreachable.example/2"),
            ])),
            Arc::new(MapFetcher(pages)),
            StageRunner::new(generator),
            options(false),
        );

        let data = collector.collect("겨울 여행", "네이버 블로그").await.unwrap();
        assert_eq!(data.total_results, 2);
        assert_eq!(
            data.serp_results.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(data.serp_results[0].summary, "요약");
        assert_eq!(data.serp_results[0].h2_list, vec!["준비물"]);
        assert_eq!(data.serp_results[0].content, "겨울 여행 준비물 이야기");
        assert_eq!(data.serp_results[1].summary, "");
        assert!(data.serp_results[1].key_points.is_empty());
    }

    #[tokio::test]
    async fn test_summary_transport_failure_degrades_item() {
        let pages = HashMap::from([(
            "https://a.example/1".to_string(),
            "<p>본문</p>".to_string(),
        )]);
        let generator = Arc::new(ScriptedGenerator::new(
            "stub",
            vec![Err(PipelineError::transport("stub", "timeout"))],
        ));
        let collector = SerpCollector::new(
            Arc::new(FixedSearch(vec![item("글", "https://a.example/1")])),
            Arc::new(MapFetcher(pages)),
            StageRunner::new(generator),
            options(false),
        );
        let data = collector.collect("q", "p").await.unwrap();
        assert_eq!(data.serp_results[0].summary, "");
        assert_eq!(data.serp_results[0].content, "본문");
    }

    #[tokio::test]
    async fn test_blog_home_crawl_is_best_effort() {
        let list_url = "https://blog.naver.com/PostList.naver?blogId=abc&currentPage=1".to_string();
        let pages = HashMap::from([(
            list_url,
            r#"<a href="/abc/1">겨울 온천 여행 코스 추천</a>"#.to_string(),
        )]);
        let collector = SerpCollector::new(
            Arc::new(FixedSearch(vec![
                item("네이버 글", "https://blog.naver.com/abc/99"),
                item("외부 글", "https://example.com/blog/1"),
            ])),
            Arc::new(MapFetcher(pages)),
            StageRunner::new(Arc::new(ScriptedGenerator::ok("stub", &[]))),
            options(true),
        );
        let data = collector.collect("q", "p").await.unwrap();
        assert_eq!(data.serp_results[0].recent_posts.len(), 1);
        assert!(data.serp_results[0].popular_posts.is_empty());
        assert!(data.serp_results[1].recent_posts.is_empty());
        assert_eq!(data.total_recent_posts, 1);
        assert_eq!(data.total_popular_posts, 0);
    }

    #[tokio::test]
    async fn test_offline_search_yields_thirty_results() {
        let collector = SerpCollector::new(
            Arc::new(OfflineSearchClient),
            Arc::new(MapFetcher(HashMap::new())),
            StageRunner::new(Arc::new(ScriptedGenerator::ok("stub", &[]))),
            options(false),
        );
        let data = collector.collect("겨울 여행", "naver").await.unwrap();
        assert_eq!(data.total_results, 30);
        assert_eq!(data.serp_results[29].rank, 30);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let collector = SerpCollector::new(
            Arc::new(DownSearch),
            Arc::new(MapFetcher(HashMap::new())),
            StageRunner::new(Arc::new(ScriptedGenerator::ok("stub", &[]))),
            options(false),
        );
        let err = collector.collect("q", "p").await.unwrap_err();
        assert!(matches!(err, PipelineError::Transport { .. }));
    }
}
