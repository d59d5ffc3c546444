//! Step 5: Build the 30-day evergreen content rotation.

use std::collections::BTreeSet;

use crate::error::{PipelineError, PipelineResult};
use crate::generation::GenerationMode;
use crate::planner::types::{ContentPlan, SerpData, ITEMS_PER_CATEGORY, PLAN_CATEGORIES, PLAN_DAYS};
use crate::workflow_utils::{JsonExtractor, Stage, StageRequest};

const MAX_REFERENCE_TITLES: usize = 30;
const STAGE_NAME: &str = "content_planner";

/// Check plan cardinalities and return the items sorted by day.
///
/// A plan is valid when it has exactly 30 items covering days 1..=30 once
/// each, five items in each of the six categories, and at least one keyword
/// per item.
pub fn validate_plan(mut plan: ContentPlan) -> PipelineResult<ContentPlan> {
    let fail = |message: String| PipelineError::validation(STAGE_NAME, message);

    if plan.days.len() != PLAN_DAYS {
        return Err(fail(format!(
            "expected {} plan items, got {}",
            PLAN_DAYS,
            plan.days.len()
        )));
    }

    let days: BTreeSet<u32> = plan.days.iter().map(|item| item.day).collect();
    let expected: BTreeSet<u32> = (1..=PLAN_DAYS as u32).collect();
    if days != expected {
        let missing: Vec<u32> = expected.difference(&days).copied().collect();
        return Err(fail(format!("days must be exactly 1..={}, missing {:?}", PLAN_DAYS, missing)));
    }

    let counts = plan.category_counts();
    if let Some(unknown) = counts.keys().find(|c| !PLAN_CATEGORIES.contains(&c.as_str())) {
        return Err(fail(format!("unknown category '{}'", unknown)));
    }
    for category in PLAN_CATEGORIES {
        let count = counts.get(category).copied().unwrap_or(0);
        if count != ITEMS_PER_CATEGORY {
            return Err(fail(format!(
                "category '{}' has {} items, expected {}",
                category, count, ITEMS_PER_CATEGORY
            )));
        }
    }

    for item in &mut plan.days {
        item.main_keywords.retain(|k| !k.trim().is_empty());
        if item.main_keywords.is_empty() {
            return Err(fail(format!("day {} has no keywords", item.day)));
        }
    }

    plan.days.sort_by_key(|item| item.day);
    Ok(plan)
}

pub struct ContentPlanningStage;

impl Stage<SerpData, ContentPlan> for ContentPlanningStage {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn request(&self, serp: &SerpData) -> StageRequest {
        let titles = serp.titles(MAX_REFERENCE_TITLES);
        let titles_text = if titles.is_empty() {
            "(참고할 검색 결과 없음)".to_string()
        } else {
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{}. {}", i + 1, t))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let categories = PLAN_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} - {}개", i + 1, c, ITEMS_PER_CATEGORY))
            .collect::<Vec<_>>()
            .join("\n");
        let topic = &serp.topic;

        let prompt = format!(
            r#"
다음 주제로 Evergreen 콘텐츠 중심 {days}일 로테이션을 만드세요.

[주제]
{topic}

[SERP 참고용]
{titles_text}

[중요 원칙]
1. SERP는 참고만 하고 패턴을 그대로 따라하지 마세요
2. 다음 달에도 재사용 가능한 Evergreen 콘텐츠 중심
3. 특정 지역이나 계절에 편중되지 않게 분산
4. 수익형 콘텐츠(리뷰, 비교, 템플릿) 필수 포함

[카테고리별 생성 개수 (총 {days}개)]
{categories}

[출력 형식]
JSON만 출력하세요. category 값은 위 카테고리명을 그대로 사용하세요.

{{
  "topic": "{topic}",
  "analysis": {{
    "primary_focus": "메인 주제",
    "secondary_focus": ["서브 주제"],
    "target_keywords": ["키워드1", "키워드2", "키워드3"]
  }},
  "30_days_plan": [
    {{
      "day": 1,
      "category": "여행준비",
      "title": "글감 제목 (40-60자)",
      "content_type": "체크리스트",
      "main_keywords": ["키워드1", "키워드2"]
    }}
  ]
}}

[필수 체크]
- day는 1부터 {days}까지 한 번씩
- 각 카테고리 정확히 {per}개씩
- 모든 항목에 main_keywords 1개 이상
"#,
            days = PLAN_DAYS,
            per = ITEMS_PER_CATEGORY,
        );
        StageRequest::new(prompt, 4000, GenerationMode::Creative)
    }

    fn parse(&self, serp: &SerpData, raw: &str) -> PipelineResult<ContentPlan> {
        let mut plan: ContentPlan = JsonExtractor::extract_as(self.name(), raw)?;
        if plan.topic.trim().is_empty() {
            plan.topic = serp.topic.clone();
        }
        validate_plan(plan)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::planner::types::{ContentPlan, ContentPlanItem, PlanAnalysis, PLAN_CATEGORIES};

    /// A valid 30-item plan, categories in blocks of five, days shuffled by
    /// `rotate`.
    pub fn valid_plan(topic: &str, rotate: u32) -> ContentPlan {
        let days = (0..30u32)
            .map(|i| {
                let day = (i + rotate) % 30 + 1;
                ContentPlanItem {
                    day,
                    category: PLAN_CATEGORIES[(i / 5) as usize].to_string(),
                    title: format!("{} 글감 {}", topic, day),
                    content_type: "가이드".to_string(),
                    main_keywords: vec![format!("키워드{}", day)],
                }
            })
            .collect();
        ContentPlan {
            topic: topic.to_string(),
            analysis: PlanAnalysis::default(),
            days,
        }
    }
}
