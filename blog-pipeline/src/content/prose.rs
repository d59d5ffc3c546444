//! Per-day prose generation (second of the two content stages).
//!
//! The reply's `full_text` and `full_text_length` are never trusted; both
//! are recomputed from the written sections, for defaults too.

use crate::content::types::{ContentStructure, FinishedPost, ToneStyleGuide, DEFAULT_H2_EMOJI};
use crate::error::PipelineResult;
use crate::generation::GenerationMode;
use crate::planner::types::ContentPlanItem;
use crate::workflow_utils::{JsonExtractor, Stage, StagePolicy, StageRequest};

pub struct ProseInput<'a> {
    pub item: &'a ContentPlanItem,
    pub structure: &'a ContentStructure,
    pub guide: &'a ToneStyleGuide,
}

pub struct ProseStage;

fn sections_detail(structure: &ContentStructure) -> String {
    let mut detail = String::new();
    for (idx, section) in structure.sections.iter().enumerate() {
        detail.push_str(&format!("\n섹션 {}: {}\n", idx + 1, section.h2));
        for (h3_idx, h3) in section.h3_list.iter().enumerate() {
            detail.push_str(&format!("- H3-{}: {}\n", h3_idx + 1, h3));
        }
    }
    detail
}

impl<'a> Stage<ProseInput<'a>, FinishedPost> for ProseStage {
    fn name(&self) -> &'static str {
        "prose_writer"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::BestEffort
    }

    fn request(&self, input: &ProseInput<'a>) -> StageRequest {
        let item = input.item;
        let guide = input.guide;
        let structure = input.structure;
        let opening_example = match guide.structure_template.opening.example.as_str() {
            "" => "작년 겨울, 아이들과 여행 준비하다가 고생했던 기억 있으신가요?",
            example => example,
        };
        let closing_example = guide
            .structure_template
            .closing
            .cta_examples
            .first()
            .map(String::as_str)
            .unwrap_or("오늘 소개한 방법으로 준비하시면 즐거운 시간 되실 거예요!");
        let faq_questions = structure
            .faq
            .iter()
            .map(|f| format!("- {}", f.question))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            r#"당신은 한국 블로그 SEO 전문 작가입니다.
아래 지침을 정확히 따라 블로그 글을 작성하세요.

## 작성할 글 정보
- Day: {day}
- 제목: {title}
- 카테고리: {category}
- 톤: {personality}, {voice}
- 목표 글자 수: {optimal}자

## 작성 지침
1. 오프닝 (80~120자): 개인 경험으로 시작하여 공감 유도. 예시: "{opening_example}"
2. 본문: 아래 모든 섹션과 H3를 빠짐없이 작성. 각 H3마다 3개 단락 (80~140자/단락)
{sections}
3. 표: "{table_title}" 내용을 HTML <table>로 작성
4. 체크리스트: "{checklist_title}" 내용을 HTML <ul><li>로 작성
5. FAQ 3개: 아래 질문에 2~3문장으로 답변
{faq_questions}
6. 마무리 (60~100자): 요약 1문장 + 행동 유도 1문장. 예시: "{closing_example}"

## 출력 형식 (JSON)
{{
  "day": {day},
  "title": "{title}",
  "seo_title": "{seo_title}",
  "meta_description": "{meta_description}",
  "h1": "{h1}",
  "opening": "오프닝 텍스트",
  "sections": [
    {{
      "h2": "섹션 H2",
      "h2_emoji": "{emoji}",
      "h3_contents": [{{"h3": "H3 제목", "paragraphs": ["단락1", "단락2", "단락3"]}}]
    }}
  ],
  "table_html": "<table>...</table>",
  "checklist_html": "<ul><li>✅ 항목1</li></ul>",
  "faq": [{{"question": "질문", "answer": "답변"}}],
  "closing": "마무리 텍스트",
  "word_count": {optimal},
  "keywords_used": ["키워드1", "키워드2"]
}}

## JSON 출력 규칙
- 모든 문자열은 한 줄로 작성 (줄바꿈 금지)
- 따옴표는 작은따옴표(')로 대체
- 유효한 JSON만 출력"#,
            day = item.day,
            title = item.title,
            category = item.category,
            personality = guide.tone_guide.personality,
            voice = guide.tone_guide.voice,
            optimal = guide.optimal_length(),
            sections = sections_detail(structure),
            table_title = structure.table.title,
            checklist_title = structure.checklist.title,
            seo_title = structure.seo_title,
            meta_description = structure.meta_description,
            h1 = structure.h1,
            emoji = DEFAULT_H2_EMOJI,
        );
        StageRequest::new(prompt, 4000, GenerationMode::Creative)
    }

    fn parse(&self, input: &ProseInput<'a>, raw: &str) -> PipelineResult<FinishedPost> {
        let mut post: FinishedPost = JsonExtractor::extract_as(self.name(), raw)?;
        post.validate(self.name())?;

        let item = input.item;
        let structure = input.structure;
        post.day = item.day;
        if post.title.trim().is_empty() {
            post.title = item.title.clone();
        }
        if post.seo_title.trim().is_empty() {
            post.seo_title = structure.seo_title.clone();
        }
        if post.meta_description.trim().is_empty() {
            post.meta_description = structure.meta_description.clone();
        }
        if post.h1.trim().is_empty() {
            post.h1 = structure.h1.clone();
        }
        if post.internal_links.is_empty() {
            post.internal_links = structure.internal_links.clone();
        }
        for section in &mut post.sections {
            if section.h2_emoji.is_empty() {
                section.h2_emoji = DEFAULT_H2_EMOJI.to_string();
            }
        }
        post.recompute_full_text();
        Ok(post)
    }

    fn default_output(&self, input: &ProseInput<'a>) -> Option<FinishedPost> {
        Some(FinishedPost::fallback(
            input.item.day,
            &input.item.title,
            input.structure,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ContentPlanItem {
        ContentPlanItem {
            day: 7,
            category: "문제해결".into(),
            title: "겨울 여행 중 아이가 아플 때 대처법".into(),
            content_type: "가이드".into(),
            main_keywords: vec!["아이 발열".into()],
        }
    }

    #[test]
    fn test_prompt_lists_every_outline_heading() {
        let structure = ContentStructure::fallback("t", 2, 2);
        let guide = ToneStyleGuide::fallback();
        let item = item();
        let req = ProseStage.request(&ProseInput {
            item: &item,
            structure: &structure,
            guide: &guide,
        });
        for section in &structure.sections {
            assert!(req.prompt.contains(&section.h2));
            for h3 in &section.h3_list {
                assert!(req.prompt.contains(h3.as_str()));
            }
        }
        assert_eq!(req.mode, GenerationMode::Creative);
        assert_eq!(req.max_output_tokens, 4000);
    }

    #[test]
    fn test_parse_recomputes_length_and_fills_from_plan() {
        let structure = ContentStructure::fallback("아이 발열", 1, 1);
        let guide = ToneStyleGuide::fallback();
        let item = item();
        let raw = r#"```json
{"day": 99, "opening": "오프닝", "closing": "마무리",
 "sections": [{"h2": "섹션", "h3_contents": [{"h3": "h", "paragraphs": ["a", "b"]}]}],
 "faq": [{"question": "q1", "answer": "a1"}, {"question": "q2", "answer": "a2"},
         {"question": "q3", "answer": "a3"}],
 "word_count": 2500, "full_text_length": "2500자"}
```"#;
        let post = ProseStage
            .parse(
                &ProseInput {
                    item: &item,
                    structure: &structure,
                    guide: &guide,
                },
                raw,
            )
            .unwrap();
        assert_eq!(post.day, 7);
        assert_eq!(post.title, item.title);
        assert_eq!(post.full_text, "오프닝a b마무리");
        assert_eq!(post.full_text_length, 9);
        assert_eq!(post.word_count, 2500);
        assert_eq!(post.sections[0].h2_emoji, DEFAULT_H2_EMOJI);
    }

    #[test]
    fn test_empty_sections_rejected() {
        let structure = ContentStructure::fallback("t", 1, 1);
        let guide = ToneStyleGuide::fallback();
        let item = item();
        let input = ProseInput {
            item: &item,
            structure: &structure,
            guide: &guide,
        };
        assert!(ProseStage.parse(&input, r#"{"sections": []}"#).is_err());
        let fallback = ProseStage.default_output(&input).unwrap();
        assert_eq!(fallback.full_text_length, fallback.full_text.chars().count());
    }

    #[test]
    fn test_missing_faq_answers_fall_back() {
        let structure = ContentStructure::fallback("t", 1, 1);
        let guide = ToneStyleGuide::fallback();
        let item = item();
        let input = ProseInput {
            item: &item,
            structure: &structure,
            guide: &guide,
        };
        let raw = r#"{"faq": [], "sections": [{"h2": "s", "h3_contents": [{"h3": "h", "paragraphs": ["p"]}]}]}"#;
        let err = ProseStage.parse(&input, raw).unwrap_err();
        assert!(err.is_output_error());
        assert_eq!(ProseStage.default_output(&input).unwrap().faq.len(), 3);
    }
}
