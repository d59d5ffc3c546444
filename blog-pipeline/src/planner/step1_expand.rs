//! Step 1: Expand an idea into 6-12 topic candidates.

use crate::error::{PipelineError, PipelineResult};
use crate::generation::GenerationMode;
use crate::planner::types::ExpandedTopics;
use crate::workflow_utils::{JsonExtractor, Stage, StageRequest};

pub const MIN_TOPICS: usize = 6;
pub const MAX_TOPICS: usize = 12;

pub struct IdeaExpansionStage;

impl Stage<String, ExpandedTopics> for IdeaExpansionStage {
    fn name(&self) -> &'static str {
        "idea_expander"
    }

    fn request(&self, idea: &String) -> StageRequest {
        let prompt = format!(
            r#"
다음 아이디어를 분석하여 블로그 주제로 확장해주세요.

[입력 아이디어]
{idea}

[요구사항]
1. 입력 아이디어를 {min}~{max}개의 구체적인 블로그 주제로 확장
2. 각 주제는 검색 가능하고 콘텐츠 생산이 가능해야 함
3. 다양한 각도에서 접근 (HOW-TO, 비교, 리뷰, 가이드, 팁 등)

[출력 형식]
JSON만 출력하세요. 다른 텍스트는 포함하지 마세요.

{{
  "original_idea": "입력된 원본 아이디어",
  "topics": [
    {{
      "id": 1,
      "title": "주제 제목 (40-60자)",
      "description": "주제 설명 (80-120자)",
      "category": "카테고리 (예: HOW-TO, 비교분석, 초보자가이드, 전문가팁 등)",
      "target_audience": "타겟 독자층",
      "estimated_difficulty": "난이도 (쉬움/보통/어려움)"
    }}
  ]
}}
"#,
            idea = idea,
            min = MIN_TOPICS,
            max = MAX_TOPICS,
        );
        StageRequest::new(prompt, 2000, GenerationMode::Fast)
    }

    fn parse(&self, idea: &String, raw: &str) -> PipelineResult<ExpandedTopics> {
        let mut expanded: ExpandedTopics = JsonExtractor::extract_as(self.name(), raw)?;
        expanded.topics.retain(|t| !t.title.trim().is_empty());
        if expanded.topics.is_empty() {
            return Err(PipelineError::validation(self.name(), "no topics returned"));
        }
        if expanded.original_idea.trim().is_empty() {
            expanded.original_idea = idea.clone();
        }
        for (idx, topic) in expanded.topics.iter_mut().enumerate() {
            if topic.id == 0 {
                topic.id = idx as u32 + 1;
            }
        }
        if !(MIN_TOPICS..=MAX_TOPICS).contains(&expanded.topics.len()) {
            tracing::warn!(
                count = expanded.topics.len(),
                "topic count outside requested range"
            );
        }
        Ok(expanded)
    }
}
