//! Step 3: Recommend a publishing platform for the selected topic.

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::generation::GenerationMode;
use crate::planner::types::{Platform, PlatformRecommendation, PlatformScore, PlatformStrategy, ScoredTopic};
use crate::workflow_utils::{JsonExtractor, Stage, StageRequest};

#[derive(Deserialize)]
struct RawRecommendation {
    #[serde(default)]
    primary_platform: String,
    #[serde(default)]
    secondary_platforms: Vec<String>,
    #[serde(default)]
    platform_scores: Vec<PlatformScore>,
    #[serde(default)]
    recommendation_reason: String,
    #[serde(default)]
    strategy: PlatformStrategy,
}

pub struct PlatformRecommendationStage;

impl Stage<ScoredTopic, PlatformRecommendation> for PlatformRecommendationStage {
    fn name(&self) -> &'static str {
        "platform_recommender"
    }

    fn request(&self, topic: &ScoredTopic) -> StageRequest {
        let topic_json = serde_json::to_string_pretty(topic).unwrap_or_default();
        let platforms = Platform::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p.display_name()))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            r#"
다음 블로그 주제에 가장 적합한 블로그 플랫폼을 추천해주세요.

[선정된 주제]
{topic_json}

[플랫폼 옵션]
{platforms}

[평가 기준]
1. 수익성: 광고, 제휴, RPM
2. 트래픽 확보 용이성
3. 1source multi use 가능성
4. SEO 난이도
5. 초기 비용 및 운영 난이도

[출력 형식]
JSON만 출력하세요. primary_platform은 위 플랫폼 옵션 중 하나여야 합니다.

{{
  "primary_platform": "메인 추천 플랫폼명",
  "secondary_platforms": ["보조 추천 플랫폼1", "보조 추천 플랫폼2"],
  "platform_scores": [
    {{
      "platform": "네이버 블로그",
      "profitability": 8,
      "traffic_potential": 9,
      "multi_use": 6,
      "seo_difficulty": 3,
      "total_score": 26,
      "pros": ["장점1"],
      "cons": ["단점1"]
    }}
  ],
  "recommendation_reason": "메인 플랫폼 추천 이유 (200-250자)",
  "strategy": {{
    "content_format": "추천 콘텐츠 형식",
    "posting_frequency": "권장 포스팅 빈도",
    "monetization_method": "수익화 방법",
    "multi_platform_plan": "다중 플랫폼 활용 전략"
  }}
}}
"#
        );
        StageRequest::new(prompt, 2000, GenerationMode::Fast)
    }

    fn parse(&self, _topic: &ScoredTopic, raw: &str) -> PipelineResult<PlatformRecommendation> {
        let parsed: RawRecommendation = JsonExtractor::extract_as(self.name(), raw)?;
        let platform = Platform::from_name(&parsed.primary_platform).ok_or_else(|| {
            PipelineError::validation(
                self.name(),
                format!("unknown primary platform '{}'", parsed.primary_platform),
            )
        })?;

        Ok(PlatformRecommendation {
            platform,
            primary_platform: parsed.primary_platform,
            secondary_platforms: parsed.secondary_platforms,
            platform_scores: parsed.platform_scores,
            recommendation_reason: parsed.recommendation_reason,
            strategy: parsed.strategy,
        })
    }
}
