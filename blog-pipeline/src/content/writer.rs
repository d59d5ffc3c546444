//! Two-stage generation of one day's post: outline, then prose.

use tracing::info;

use crate::content::prose::{ProseInput, ProseStage};
use crate::content::structure::{StructureInput, StructureStage};
use crate::content::types::{ContentStructure, FinishedPost, ToneStyleGuide};
use crate::error::PipelineResult;
use crate::planner::types::ContentPlanItem;
use crate::workflow_utils::StageRunner;

/// `base` followed by the entries of `extra` it does not already contain.
pub fn merge_keywords(base: &[String], extra: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(base.len() + extra.len());
    for keyword in base.iter().chain(extra) {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !merged.iter().any(|k| k == keyword) {
            merged.push(keyword.to_string());
        }
    }
    merged
}

#[derive(Debug, Clone)]
pub struct DayOutcome {
    pub post: FinishedPost,
    pub structure: ContentStructure,
    pub structure_default: bool,
    pub prose_default: bool,
}

impl DayOutcome {
    pub fn used_default(&self) -> bool {
        self.structure_default || self.prose_default
    }
}

#[derive(Clone)]
pub struct DayWriter {
    runner: StageRunner,
}

impl DayWriter {
    pub fn new(runner: StageRunner) -> Self {
        Self { runner }
    }

    /// Only transport failures escape; malformed replies become defaults.
    pub async fn write(
        &self,
        item: &ContentPlanItem,
        guide: &ToneStyleGuide,
        extra_keywords: &[String],
    ) -> PipelineResult<DayOutcome> {
        let keywords = merge_keywords(&item.main_keywords, extra_keywords);

        let structure_outcome = self
            .runner
            .run_with_outcome(
                &StructureStage,
                &StructureInput {
                    item,
                    keywords: &keywords,
                    guide,
                },
            )
            .await?;
        let structure = structure_outcome.output;
        info!(
            day = item.day,
            sections = structure.sections.len(),
            default = structure_outcome.used_default,
            "outline ready"
        );

        let prose_outcome = self
            .runner
            .run_with_outcome(
                &ProseStage,
                &ProseInput {
                    item,
                    structure: &structure,
                    guide,
                },
            )
            .await?;
        let mut post = prose_outcome.output;
        if post.keywords_used.is_empty() {
            post.keywords_used = keywords;
        }
        info!(
            day = item.day,
            chars = post.full_text_length,
            default = prose_outcome.used_default,
            "post written"
        );

        Ok(DayOutcome {
            post,
            structure,
            structure_default: structure_outcome.used_default,
            prose_default: prose_outcome.used_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::generation::testing::ScriptedGenerator;
    use crate::generation::GenerationMode;
    use std::sync::Arc;

    fn item() -> ContentPlanItem {
        ContentPlanItem {
            day: 2,
            category: "여행지추천".into(),
            title: "아이와 가기 좋은 겨울 여행지 7곳".into(),
            content_type: "리스트".into(),
            main_keywords: vec!["겨울 여행지".into(), "가족 여행".into()],
        }
    }

    const OUTLINE: &str = r#"{"seo_title": "겨울 여행지 7곳", "h1": "겨울 여행지",
        "sections": [{"h2": "강원도", "h3_list": ["평창", "속초"]}],
        "faq": [{"question": "q1"}, {"question": "q2"}, {"question": "q3"}]}"#;

    const PROSE: &str = r#"{"opening": "안녕", "closing": "끝",
        "sections": [{"h2": "강원도", "h3_contents": [{"h3": "평창", "paragraphs": ["눈"]}]}],
        "faq": [{"question": "q1", "answer": "a1"}, {"question": "q2", "answer": "a2"},
                {"question": "q3", "answer": "a3"}]}"#;

    #[test]
    fn test_merge_keywords_dedupes_in_order() {
        let base = vec!["겨울 여행".to_string(), "가족".to_string()];
        let extra = vec!["가족".to_string(), " ".to_string(), "연말 할인".to_string()];
        assert_eq!(
            merge_keywords(&base, &extra),
            vec!["겨울 여행", "가족", "연말 할인"]
        );
    }

    #[tokio::test]
    async fn test_write_runs_structure_then_prose() {
        let generator = Arc::new(ScriptedGenerator::ok("stub", &[OUTLINE, PROSE]));
        let writer = DayWriter::new(StageRunner::new(generator.clone()));
        let outcome = writer
            .write(&item(), &ToneStyleGuide::fallback(), &["연말 할인".to_string()])
            .await
            .unwrap();

        assert!(!outcome.used_default());
        assert_eq!(outcome.post.day, 2);
        assert_eq!(outcome.post.full_text, "안녕눈끝");
        assert_eq!(
            outcome.post.keywords_used,
            vec!["겨울 여행지", "가족 여행", "연말 할인"]
        );
        assert_eq!(
            generator.modes(),
            vec![GenerationMode::Fast, GenerationMode::Creative]
        );
    }

    #[tokio::test]
    async fn test_malformed_replies_use_defaults() {
        let generator = Arc::new(ScriptedGenerator::ok("stub", &["개요 없음", "{ 깨짐"]));
        let writer = DayWriter::new(StageRunner::new(generator));
        let outcome = writer
            .write(&item(), &ToneStyleGuide::fallback(), &[])
            .await
            .unwrap();
        assert!(outcome.structure_default);
        assert!(outcome.prose_default);
        assert_eq!(outcome.post.sections.len(), 6);
        assert_eq!(
            outcome.post.full_text_length,
            outcome.post.full_text.chars().count()
        );
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let generator = Arc::new(ScriptedGenerator::new(
            "stub",
            vec![Err(PipelineError::transport("stub", "connection reset"))],
        ));
        let writer = DayWriter::new(StageRunner::new(generator));
        let err = writer
            .write(&item(), &ToneStyleGuide::fallback(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transport { .. }));
    }
}
