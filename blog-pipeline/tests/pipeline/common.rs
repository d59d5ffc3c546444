//! Stub services and fixtures shared by the pipeline tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blog_pipeline::content::types::ToneStyleGuide;
use blog_pipeline::error::{PipelineError, PipelineResult};
use blog_pipeline::external::{PageFetcher, SearchClient, SearchItem};
use blog_pipeline::generation::{GenerationMode, TextGenerator};
use blog_pipeline::interactive::ScriptedPrompter;
use blog_pipeline::planner::step4_serp::SerpOptions;
use blog_pipeline::planner::types::{InitialPipelineResult, PLAN_CATEGORIES};
use blog_pipeline::planner::{PlannerConfig, PlannerServices};
use blog_pipeline::workflow_utils::files::{INITIAL_PIPELINE_RESULT, TONE_STYLE_GUIDE};
use blog_pipeline::workflow_utils::{write_json_atomic, StageRunner};

pub const IDEA: &str = "4인 가족 겨울 여행";

/// Replays canned replies in order; once the script runs out every call is
/// a transport failure.
pub struct StubGenerator {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(String, GenerationMode)>>,
}

impl StubGenerator {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Vec::<String>::new())
    }

    pub fn prompts(&self) -> Vec<(String, GenerationMode)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        prompt: &str,
        _max_output_tokens: u32,
        mode: GenerationMode,
    ) -> PipelineResult<String> {
        self.prompts.lock().unwrap().push((prompt.to_string(), mode));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PipelineError::transport("stub", "script exhausted"))
    }
}

/// Returns `count` numbered results regardless of the query.
pub struct StubSearch {
    pub count: usize,
}

#[async_trait]
impl SearchClient for StubSearch {
    async fn search(&self, _query: &str, display: usize) -> PipelineResult<Vec<SearchItem>> {
        Ok((1..=self.count.min(display))
            .map(|i| SearchItem {
                title: format!("겨울 가족 여행 후기 {}", i),
                link: format!("https://blog.example.com/post/{}", i),
                description: format!("설명 {}", i),
                blogger: format!("블로거{}", i),
                postdate: "20241201".to_string(),
            })
            .collect())
    }
}

/// Every page is unreachable.
pub struct UnreachableFetcher;

#[async_trait]
impl PageFetcher for UnreachableFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> String {
        String::new()
    }
}

pub fn planner_config(output_dir: &Path) -> PlannerConfig {
    PlannerConfig {
        idea: Some(IDEA.to_string()),
        refine: false,
        output_dir: output_dir.to_path_buf(),
        serp: SerpOptions {
            display: 30,
            page_timeout: Duration::from_millis(10),
            crawl_blog_homes: false,
            blog_home_timeout: Duration::from_millis(10),
            crawl_delay: Duration::ZERO,
        },
    }
}

pub fn services(generator: Arc<StubGenerator>, results: usize) -> PlannerServices {
    PlannerServices {
        runner: StageRunner::new(generator),
        search: Arc::new(StubSearch { count: results }),
        fetcher: Arc::new(UnreachableFetcher),
        prompter: Arc::new(ScriptedPrompter::default()),
    }
}

pub fn plan_json(topic: &str) -> serde_json::Value {
    let days: Vec<serde_json::Value> = (0..30u32)
        .map(|i| {
            json!({
                "day": i + 1,
                "category": PLAN_CATEGORIES[(i / 5) as usize],
                "title": format!("{} 글감 {}", topic, i + 1),
                "content_type": "가이드",
                "main_keywords": [format!("키워드{}", i + 1)]
            })
        })
        .collect();
    json!({
        "topic": topic,
        "analysis": {"primary_focus": "가족", "secondary_focus": "예산", "target_keywords": []},
        "30_days_plan": days
    })
}

/// Replies for steps 1, 2, 3 and 5 in the order the planner asks.
pub fn planning_replies() -> Vec<String> {
    let topics = json!({
        "topics": [
            {"title": "아이와 함께하는 겨울 국내 여행", "category": "국내"},
            {"title": "겨울 해외 가족 여행 예산", "category": "해외"},
            {"title": "겨울 캠핑 입문", "category": "캠핑"}
        ]
    });
    let scoring = json!({
        "scored_topics": [
            {"id": 1, "title": "아이와 함께하는 겨울 국내 여행",
             "profitability_score": 8, "scalability_score": 9, "sustainability_score": 8,
             "difficulty_score": 3, "total_score": 99},
            {"id": 2, "title": "겨울 해외 가족 여행 예산",
             "profitability_score": 9, "scalability_score": 7, "sustainability_score": 6,
             "difficulty_score": 5},
            {"id": 3, "title": "겨울 캠핑 입문",
             "profitability_score": "7", "scalability_score": 6, "sustainability_score": 7,
             "difficulty_score": 4}
        ],
        "recommendation": "국내 여행이 가장 유리합니다"
    });
    let platform = json!({
        "primary_platform": "네이버 블로그",
        "secondary_platforms": ["티스토리"],
        "platform_scores": [{"platform": "네이버 블로그", "profitability": 8}],
        "recommendation_reason": "검색 유입",
        "strategy": {"content_format": "사진 중심"}
    });
    vec![
        format!("```json\n{}\n```", topics),
        scoring.to_string(),
        format!("추천 결과입니다.\n{}", platform),
        plan_json("아이와 함께하는 겨울 국내 여행").to_string(),
    ]
}

/// Write the plan and guide that daily and batch generation read.
pub fn seed_generation_inputs(output_dir: &Path) -> InitialPipelineResult {
    let result: InitialPipelineResult = serde_json::from_value(json!({
        "user_idea": IDEA,
        "expanded_topics": {"topics": [{"title": "겨울 국내 여행"}]},
        "scored_topics": {
            "scored_topics": [{"title": "겨울 국내 여행"}],
            "selected_topic": {"title": "겨울 국내 여행"}
        },
        "platform_recommendation": {"platform": "tistory", "primary_platform": "티스토리"},
        "serp_data": {"topic": "겨울 국내 여행", "total_results": 0, "serp_results": []},
        "content_plan": plan_json("겨울 국내 여행")
    }))
    .unwrap();
    write_json_atomic(&output_dir.join(INITIAL_PIPELINE_RESULT), &result).unwrap();
    write_json_atomic(&output_dir.join(TONE_STYLE_GUIDE), &ToneStyleGuide::fallback()).unwrap();
    result
}

pub fn structure_reply() -> String {
    json!({
        "seo_title": "겨울 가족 여행 준비물",
        "meta_description": "겨울 여행 준비물 정리",
        "h1": "겨울 가족 여행 준비물 총정리",
        "sections": [{"h2": "옷차림", "h3_list": ["아이 옷"], "content_outline": "보온"}],
        "faq": [
            {"question": "Q1", "answer_outline": "A1"},
            {"question": "Q2", "answer_outline": "A2"},
            {"question": "Q3", "answer_outline": "A3"}
        ]
    })
    .to_string()
}

pub fn prose_reply() -> String {
    json!({
        "opening": "시작",
        "sections": [{
            "h2": "옷차림",
            "h3_contents": [{"h3": "아이 옷", "paragraphs": ["첫 문단", "둘째"]}]
        }],
        "closing": "끝",
        "faq": [
            {"question": "Q1", "answer": "A1"},
            {"question": "Q2", "answer": "A2"},
            {"question": "Q3", "answer": "A3"}
        ],
        "word_count": 9999,
        "keywords_used": ["겨울 여행"]
    })
    .to_string()
}

pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../templates")
}
