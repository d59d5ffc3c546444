//! Per-day outline generation (first of the two content stages).

use crate::content::types::{ContentStructure, ToneStyleGuide};
use crate::error::PipelineResult;
use crate::generation::GenerationMode;
use crate::planner::types::ContentPlanItem;
use crate::workflow_utils::{JsonExtractor, Stage, StagePolicy, StageRequest};

const MAX_PROMPT_KEYWORDS: usize = 10;

pub struct StructureInput<'a> {
    pub item: &'a ContentPlanItem,
    /// Plan keywords plus any trend keywords, already deduplicated.
    pub keywords: &'a [String],
    pub guide: &'a ToneStyleGuide,
}

pub struct StructureStage;

impl<'a> Stage<StructureInput<'a>, ContentStructure> for StructureStage {
    fn name(&self) -> &'static str {
        "structure_generator"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::BestEffort
    }

    fn request(&self, input: &StructureInput<'a>) -> StageRequest {
        let item = input.item;
        let keywords = input
            .keywords
            .iter()
            .take(MAX_PROMPT_KEYWORDS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            r#"당신은 SEO 최적화 블로그 글 구조 설계 전문가입니다.
주어진 주제에 대해 검색 엔진 최적화된 글 구조를 생성하세요.

# 글 정보
- Day: {day}
- 제목: {title}
- 카테고리: {category}
- 키워드: {keywords}

# 구조 생성 규칙
- H2 개수: {h2_count}개
- H2당 H3: {h3_per_h2}개
- 표(Table) 1개: 비교/요약용
- 리스트 1개: 체크리스트/단계별
- FAQ 정확히 3개: 실제 검색 의도 기반

# 출력 형식 (JSON)
{{
  "seo_title": "48~58자, 키워드 앞배치, 숫자 포함",
  "meta_description": "110~150자, 행동 유도 포함",
  "h1": "메인 제목",
  "sections": [
    {{"h2": "H2 제목", "h3_list": ["H3-1", "H3-2"], "content_outline": "섹션 내용 개요"}}
  ],
  "table": {{"title": "표 제목", "headers": ["열1", "열2"], "rows": [["값1", "값2"]], "insert_after_section": 2}},
  "checklist": {{"title": "체크리스트 제목", "items": ["항목1", "항목2"], "insert_after_section": 3}},
  "faq": [
    {{"question": "질문1", "answer_outline": "답변 개요"}},
    {{"question": "질문2", "answer_outline": "답변 개요"}},
    {{"question": "질문3", "answer_outline": "답변 개요"}}
  ],
  "internal_links": [{{"anchor_text": "관련 글", "target_day": 5, "insert_after_section": 1}}],
  "image_prompts": [{{"position": "thumbnail", "prompt": "이미지 프롬프트", "alt_text": "ALT 텍스트"}}]
}}

JSON만 출력하세요."#,
            day = item.day,
            title = item.title,
            category = item.category,
            h2_count = input.guide.h2_count(),
            h3_per_h2 = input.guide.h3_per_h2(),
        );
        StageRequest::new(prompt, 2000, GenerationMode::Fast)
    }

    fn parse(&self, input: &StructureInput<'a>, raw: &str) -> PipelineResult<ContentStructure> {
        let mut structure: ContentStructure = JsonExtractor::extract_as(self.name(), raw)?;
        structure.validate(self.name())?;
        for section in &mut structure.sections {
            section.h3_list.retain(|h3| !h3.trim().is_empty());
        }
        if structure.h1.trim().is_empty() {
            structure.h1 = input.item.title.clone();
        }
        if structure.seo_title.trim().is_empty() {
            structure.seo_title = input.item.title.clone();
        }
        Ok(structure)
    }

    fn default_output(&self, input: &StructureInput<'a>) -> Option<ContentStructure> {
        Some(ContentStructure::fallback(
            &input.item.title,
            input.guide.h2_count(),
            input.guide.h3_per_h2(),
        ))
    }
}
