//! Step 2: Score topic candidates and pick the best one.
//!
//! Scores are clamped and totals recomputed before selection, so the
//! generator's own arithmetic never decides the winner. Ties go to the
//! candidate that appears first.

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::generation::GenerationMode;
use crate::planner::types::{ScoredTopic, TopicCandidate, TopicScoring};
use crate::workflow_utils::{JsonExtractor, Stage, StageRequest};

/// Index of the highest total; the first maximum wins.
pub fn select_best(topics: &[ScoredTopic]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (idx, topic) in topics.iter().enumerate() {
        let total = topic.computed_total();
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((idx, total)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[derive(Deserialize)]
struct RawScoring {
    #[serde(default)]
    scored_topics: Vec<ScoredTopic>,
    #[serde(default)]
    recommendation: String,
}

pub struct TopicScoringStage;

impl Stage<Vec<TopicCandidate>, TopicScoring> for TopicScoringStage {
    fn name(&self) -> &'static str {
        "topic_scorer"
    }

    fn request(&self, topics: &Vec<TopicCandidate>) -> StageRequest {
        let topics_json = serde_json::to_string_pretty(topics).unwrap_or_default();
        let prompt = format!(
            r#"
다음 블로그 주제 후보들을 분석하여 점수를 매기고 최적의 주제를 추천해주세요.

[주제 후보들]
{topics_json}

[평가 기준]
1. 수익성 (0-10점): 광고 수익, 제휴 마케팅, 트래픽 잠재력, 키워드 검색량
2. 확장성 (0-10점): 1source multi use, 시리즈물 제작, 관련 주제 확장
3. 지속가능성 (0-10점): 시즌과 무관한 검색, 업데이트 용이성, 낮은 경쟁 강도
4. 생산 난이도 (0-10점, 낮을수록 좋음): 제작 난이도, 전문성 요구, 자료 수집

[출력 형식]
JSON만 출력하세요.

{{
  "scored_topics": [
    {{
      "id": 1,
      "title": "주제 제목",
      "profitability_score": 8,
      "scalability_score": 7,
      "sustainability_score": 9,
      "difficulty_score": 6,
      "total_score": 18,
      "reasoning": "점수 근거 설명 (100-150자)",
      "recommended_platforms": ["네이버", "티스토리"]
    }}
  ],
  "recommendation": "최고 점수를 받은 주제에 대한 추천 이유 (150-200자)"
}}

total_score = profitability + scalability + sustainability - difficulty
"#
        );
        StageRequest::new(prompt, 2000, GenerationMode::Fast)
    }

    fn parse(&self, candidates: &Vec<TopicCandidate>, raw: &str) -> PipelineResult<TopicScoring> {
        if candidates.is_empty() {
            return Err(PipelineError::validation(self.name(), "no candidates to score"));
        }
        let parsed: RawScoring = JsonExtractor::extract_as(self.name(), raw)?;
        let scored_topics: Vec<ScoredTopic> = parsed
            .scored_topics
            .into_iter()
            .map(ScoredTopic::normalized)
            .collect();

        let best = select_best(&scored_topics)
            .ok_or_else(|| PipelineError::validation(self.name(), "no scored topics returned"))?;
        let selected_topic = scored_topics[best].clone();
        tracing::info!(title = %selected_topic.title, total = selected_topic.total_score, "topic selected");

        Ok(TopicScoring {
            scored_topics,
            recommendation: parsed.recommendation,
            selected_topic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(title: &str, p: i32, s: i32, u: i32, d: i32) -> ScoredTopic {
        ScoredTopic {
            id: 0,
            title: title.to_string(),
            profitability_score: p,
            scalability_score: s,
            sustainability_score: u,
            difficulty_score: d,
            total_score: 0,
            reasoning: String::new(),
            recommended_platforms: vec![],
        }
    }

    fn candidates() -> Vec<TopicCandidate> {
        vec![TopicCandidate {
            id: 1,
            title: "t".into(),
            description: String::new(),
            category: String::new(),
            target_audience: String::new(),
            estimated_difficulty: String::new(),
        }]
    }

    #[test]
    fn test_select_best_prefers_first_on_tie() {
        let topics = vec![
            topic("a", 5, 5, 5, 5),
            topic("b", 9, 9, 9, 7),
            topic("c", 8, 8, 8, 4),
        ];
        assert_eq!(select_best(&topics), Some(1));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_generator_totals_are_ignored() {
        let raw = r#"{"scored_topics": [
            {"title": "claimed winner", "profitability_score": 5, "scalability_score": 5,
             "sustainability_score": 5, "difficulty_score": 5, "total_score": 40},
            {"title": "actual winner", "profitability_score": 9, "scalability_score": 8,
             "sustainability_score": 9, "difficulty_score": 2, "total_score": 1}
        ], "recommendation": "r"}"#;
        let scoring = TopicScoringStage.parse(&candidates(), raw).unwrap();
        assert_eq!(scoring.selected_topic.title, "actual winner");
        assert_eq!(scoring.selected_topic.total_score, 24);
        for t in &scoring.scored_topics {
            assert_eq!(
                t.total_score,
                t.profitability_score + t.scalability_score + t.sustainability_score
                    - t.difficulty_score
            );
        }
    }

    #[test]
    fn test_out_of_range_scores_are_clamped_before_selection() {
        let raw = r#"{"scored_topics": [
            {"title": "inflated", "profitability_score": 50, "scalability_score": 0,
             "sustainability_score": 0, "difficulty_score": 0},
            {"title": "steady", "profitability_score": 6, "scalability_score": 6,
             "sustainability_score": 6, "difficulty_score": 1}
        ]}"#;
        let scoring = TopicScoringStage.parse(&candidates(), raw).unwrap();
        assert_eq!(scoring.scored_topics[0].profitability_score, 10);
        assert_eq!(scoring.selected_topic.title, "steady");
    }

    #[test]
    fn test_empty_scores_fail() {
        let err = TopicScoringStage
            .parse(&candidates(), r#"{"scored_topics": []}"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));

        let err = TopicScoringStage
            .parse(&vec![], r#"{"scored_topics": []}"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
    }
}
