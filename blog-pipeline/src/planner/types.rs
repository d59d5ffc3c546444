//! Data types for the initial planning pipeline.
//!
//! 1. **Idea refinement** - optional Q&A that sharpens the raw idea
//! 2. **Topics** - expanded candidates and their scores
//! 3. **Platform** - where to publish
//! 4. **SERP** - competing posts for the selected topic
//! 5. **Content plan** - the 30-day evergreen rotation
//! 6. **Keywords** - expanded keyword metrics

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::external::html::PostLink;

// ============================================================================
// Idea Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub round: u32,
    pub question: String,
    pub answer: String,
}

/// Structured details pulled out of a refinement conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaDetails {
    pub target_audience: String,
    pub platform: String,
    pub content_angle: String,
    pub differentiation: String,
    pub sustainability: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedIdea {
    pub initial_idea: String,
    pub refined_idea: String,
    pub conversation_history: Vec<ConversationTurn>,
    pub extracted_details: IdeaDetails,
}

// ============================================================================
// Topic Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCandidate {
    #[serde(default)]
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub estimated_difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedTopics {
    #[serde(default)]
    pub original_idea: String,
    pub topics: Vec<TopicCandidate>,
}

/// Accepts integers, floats and numeric strings; anything else is 0.
pub fn lenient_score<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let score = match &value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(score.round() as i32)
}

/// Accepts either a single string or a list of strings.
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}

pub const SCORE_MIN: i32 = 0;
pub const SCORE_MAX: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTopic {
    #[serde(default)]
    pub id: u32,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub profitability_score: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub scalability_score: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub sustainability_score: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub difficulty_score: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub total_score: i32,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub recommended_platforms: Vec<String>,
}

impl ScoredTopic {
    pub fn computed_total(&self) -> i32 {
        self.profitability_score + self.scalability_score + self.sustainability_score
            - self.difficulty_score
    }

    /// Clamp every dimension into range and recompute the total.
    pub fn normalized(mut self) -> Self {
        let clamp = |v: i32| v.clamp(SCORE_MIN, SCORE_MAX);
        self.profitability_score = clamp(self.profitability_score);
        self.scalability_score = clamp(self.scalability_score);
        self.sustainability_score = clamp(self.sustainability_score);
        self.difficulty_score = clamp(self.difficulty_score);
        self.total_score = self.computed_total();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScoring {
    pub scored_topics: Vec<ScoredTopic>,
    #[serde(default)]
    pub recommendation: String,
    pub selected_topic: ScoredTopic,
}

// ============================================================================
// Platform Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Naver,
    Tistory,
    Wordpress,
    Blogger,
    Medium,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Naver,
        Platform::Tistory,
        Platform::Wordpress,
        Platform::Blogger,
        Platform::Medium,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Naver => "naver",
            Self::Tistory => "tistory",
            Self::Wordpress => "wordpress",
            Self::Blogger => "blogger",
            Self::Medium => "medium",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Naver => "네이버 블로그",
            Self::Tistory => "티스토리",
            Self::Wordpress => "워드프레스",
            Self::Blogger => "구글 블로거",
            Self::Medium => "미디엄",
        }
    }

    /// Match Korean or English platform names as a generator tends to write them.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let matches = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
        if matches(&["네이버", "naver"]) {
            Some(Self::Naver)
        } else if matches(&["티스토리", "tistory"]) {
            Some(Self::Tistory)
        } else if matches(&["워드프레스", "wordpress"]) {
            Some(Self::Wordpress)
        } else if matches(&["블로거", "blogger", "blogspot"]) {
            Some(Self::Blogger)
        } else if matches(&["미디엄", "medium"]) {
            Some(Self::Medium)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformScore {
    pub platform: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub profitability: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub traffic_potential: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub multi_use: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub seo_difficulty: i32,
    #[serde(default, deserialize_with = "lenient_score")]
    pub total_score: i32,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformStrategy {
    pub content_format: String,
    pub posting_frequency: String,
    pub monetization_method: String,
    pub multi_platform_plan: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRecommendation {
    /// Normalized primary platform
    pub platform: Platform,
    /// Primary platform as the generator wrote it
    pub primary_platform: String,
    #[serde(default)]
    pub secondary_platforms: Vec<String>,
    #[serde(default)]
    pub platform_scores: Vec<PlatformScore>,
    #[serde(default)]
    pub recommendation_reason: String,
    #[serde(default)]
    pub strategy: PlatformStrategy,
}

// ============================================================================
// SERP Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerpResult {
    pub rank: u32,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blogger: String,
    #[serde(default)]
    pub postdate: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub h2_list: Vec<String>,
    #[serde(default)]
    pub h3_list: Vec<String>,
    #[serde(default)]
    pub recent_posts: Vec<PostLink>,
    #[serde(default)]
    pub popular_posts: Vec<PostLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerpData {
    pub topic: String,
    #[serde(default)]
    pub platform: String,
    pub total_results: usize,
    #[serde(default)]
    pub total_recent_posts: usize,
    #[serde(default)]
    pub total_popular_posts: usize,
    pub serp_results: Vec<SerpResult>,
}

impl SerpData {
    pub fn titles(&self, limit: usize) -> Vec<String> {
        self.serp_results
            .iter()
            .take(limit)
            .map(|r| r.title.clone())
            .collect()
    }
}

// ============================================================================
// Content Plan Types
// ============================================================================

pub const PLAN_DAYS: usize = 30;
pub const ITEMS_PER_CATEGORY: usize = 5;
pub const PLAN_CATEGORIES: [&str; 6] = [
    "여행준비",
    "여행지추천",
    "실제사례",
    "비교리뷰",
    "문제해결",
    "일정예산",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPlanItem {
    pub day: u32,
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub main_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanAnalysis {
    pub primary_focus: String,
    #[serde(deserialize_with = "string_or_list")]
    pub secondary_focus: Vec<String>,
    pub target_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPlan {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub analysis: PlanAnalysis,
    #[serde(rename = "30_days_plan")]
    pub days: Vec<ContentPlanItem>,
}

impl ContentPlan {
    pub fn item(&self, day: u32) -> Option<&ContentPlanItem> {
        self.days.iter().find(|item| item.day == day)
    }

    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.days {
            *counts.entry(item.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}

// ============================================================================
// Keyword Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeOrigin {
    Datalab,
    Estimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetric {
    pub keyword: String,
    pub volume: u64,
    pub difficulty: u32,
    pub cluster: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordExpansion {
    pub seed: String,
    pub keywords: Vec<KeywordMetric>,
    pub clusters: BTreeMap<String, Vec<String>>,
    pub volume_source: VolumeOrigin,
}

// ============================================================================
// Pipeline Result
// ============================================================================

/// Everything the initial pipeline produces, persisted as one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialPipelineResult {
    pub user_idea: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_idea_result: Option<RefinedIdea>,
    pub expanded_topics: ExpandedTopics,
    pub scored_topics: TopicScoring,
    pub platform_recommendation: PlatformRecommendation,
    pub serp_data: SerpData,
    pub content_plan: ContentPlan,
    #[serde(default)]
    pub generated_at: String,
}
