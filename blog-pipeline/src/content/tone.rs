//! Tone/style derivation from competing posts.
//!
//! Always two generator calls: an analysis of sampled posts, then a guide
//! built from that analysis after user overrides are merged in. Both are
//! best-effort and fall back to fixed defaults.

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::generation::GenerationMode;
use crate::content::types::{ToneAnalysis, ToneStyleGuide};
use crate::planner::types::SerpData;
use crate::workflow_utils::{JsonExtractor, Stage, StagePolicy, StageRequest, StageRunner};

pub const MAX_SAMPLE_POSTS: usize = 10;
pub const MIN_SAMPLE_CHARS: usize = 100;
pub const SAMPLE_EXCERPT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePost {
    pub title: String,
    pub content: String,
}

/// Up to ten posts with more than 100 characters of body text, each cut to
/// its first 2000 characters.
pub fn sample_posts(serp: &SerpData) -> Vec<SamplePost> {
    serp.serp_results
        .iter()
        .filter(|r| r.content.chars().count() > MIN_SAMPLE_CHARS)
        .take(MAX_SAMPLE_POSTS)
        .map(|r| SamplePost {
            title: r.title.clone(),
            content: r.content.chars().take(SAMPLE_EXCERPT_CHARS).collect(),
        })
        .collect()
}

/// User preferences that win over the analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToneOverrides {
    pub tone: Option<String>,
    pub formality: Option<String>,
    pub length: Option<String>,
}

impl ToneOverrides {
    pub fn is_empty(&self) -> bool {
        self.tone.is_none() && self.formality.is_none() && self.length.is_none()
    }

    pub fn apply(&self, analysis: &mut ToneAnalysis) {
        if let Some(tone) = &self.tone {
            analysis.tone.personality = tone.clone();
        }
        if let Some(formality) = &self.formality {
            analysis.tone.formality = formality.clone();
        }
        if let Some(length) = &self.length {
            analysis.recommended_length = length.clone();
        }
    }
}

pub struct ToneAnalysisStage;

impl Stage<Vec<SamplePost>, ToneAnalysis> for ToneAnalysisStage {
    fn name(&self) -> &'static str {
        "tone_analysis"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::BestEffort
    }

    fn request(&self, posts: &Vec<SamplePost>) -> StageRequest {
        let analysis_text = if posts.is_empty() {
            "(분석할 본문 없음: 일반적인 상위 노출 블로그 글 패턴을 기준으로 분석)".to_string()
        } else {
            posts
                .iter()
                .enumerate()
                .map(|(i, p)| format!("[글 {}]\n제목: {}\n내용:\n{}", i + 1, p.title, p.content))
                .collect::<Vec<_>>()
                .join("\n\n---\n\n")
        };
        let prompt = format!(
            r#"당신은 블로그 문체 분석 전문가입니다.
상위 노출 글들을 분석하여 성공적인 문체 패턴을 추출하세요.

# 분석 대상 글 ({count}개)
{analysis_text}

# 분석 항목
1. 전반적인 톤: 친근함/전문성, 격식체/구어체, 시점
2. 문장 스타일: 문장 길이, 단락 구성, 이모지 사용 빈도
3. 구조적 패턴: 오프닝, 본론, 마무리
4. SEO 패턴: 소제목(H2/H3) 개수, 표/리스트 사용
5. 가독성 요소: 강조 방법, 여백, 구분 요소

# 출력 형식 (JSON)
{{
  "tone": {{"personality": "친근하고 공감하는", "formality": "구어체", "voice": "1인칭"}},
  "sentence_style": {{"length": "보통(20~40자)", "paragraph_sentences": 3, "emoji_usage": "보통"}},
  "structure": {{"opening_pattern": "개인 경험 공감", "body_pattern": "리스트형", "closing_pattern": "행동 유도(CTA)"}},
  "seo_elements": {{"h2_count": 6, "h3_count": 12, "keyword_density": "2-3%", "table_usage": true, "list_usage": true}},
  "readability": {{"emphasis_method": "굵게", "spacing": "보통", "visual_separators": "이모지"}},
  "recommended_length": "1500~2000자",
  "key_success_factors": ["요인1", "요인2", "요인3"]
}}

JSON만 출력하세요."#,
            count = posts.len(),
        );
        StageRequest::new(prompt, 2000, GenerationMode::Analytical)
    }

    fn parse(&self, _posts: &Vec<SamplePost>, raw: &str) -> PipelineResult<ToneAnalysis> {
        JsonExtractor::extract_as(self.name(), raw)
    }

    fn default_output(&self, _posts: &Vec<SamplePost>) -> Option<ToneAnalysis> {
        Some(ToneAnalysis::fallback())
    }
}

pub struct ToneGuideStage;

impl Stage<ToneAnalysis, ToneStyleGuide> for ToneGuideStage {
    fn name(&self) -> &'static str {
        "tone_guide"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::BestEffort
    }

    fn request(&self, analysis: &ToneAnalysis) -> StageRequest {
        let analysis_json = serde_json::to_string_pretty(analysis).unwrap_or_default();
        let prompt = format!(
            r#"당신은 블로그 글쓰기 가이드 전문가입니다.
상위 글 분석 결과를 바탕으로 실제 글쓰기에 사용할 구체적인 가이드를 생성하세요.

# 분석 결과
{analysis_json}

# 생성할 가이드 (JSON 형식)
{{
  "tone_guide": {{
    "personality": "친근하고 공감하는",
    "voice": "1인칭 ('저', '제가') 사용",
    "formality": "구어체 중심",
    "examples": ["❌ 나쁜 예: ...", "✅ 좋은 예: ..."]
  }},
  "structure_template": {{
    "opening": {{"pattern": "개인 경험 → 공감 → 문제 제기", "length": "80~120자", "example": "예시 오프닝 문장"}},
    "body": {{"pattern": "배경 → 핵심 정보 → 활용법", "section_count": 6, "h2_pattern": "질문형", "h3_pattern": "구체적 소주제", "paragraph_rule": "80~140자 단락"}},
    "closing": {{"pattern": "요약 → 행동 유도", "length": "60~100자", "cta_examples": ["예시 CTA 문장"]}}
  }},
  "writing_rules": {{"sentence_length": "20~40자", "emoji_usage": "섹션별 1개", "emphasis": "핵심 키워드만 굵게"}},
  "seo_rules": {{
    "title_format": "48~58자, 키워드 앞배치",
    "h2_count": 6,
    "h3_per_h2": 2,
    "keyword_placement": "첫 단락, 각 H2 시작, 마지막 단락",
    "internal_links": "본문 3~5개",
    "table_usage": "비교/요약 시 1개",
    "faq_count": 3
  }},
  "content_length": {{"min": 1500, "max": 2000, "optimal": 1800}},
  "visual_elements": {{"thumbnail": "...", "section_images": "...", "alt_text_pattern": "..."}},
  "monetization_hints": {{"affiliate_section": "...", "cta_placement": "...", "product_mention": "..."}}
}}

JSON만 출력하세요."#
        );
        StageRequest::new(prompt, 2500, GenerationMode::Creative)
    }

    fn parse(&self, _analysis: &ToneAnalysis, raw: &str) -> PipelineResult<ToneStyleGuide> {
        let guide: ToneStyleGuide = JsonExtractor::extract_as(self.name(), raw)?;
        Ok(guide.normalized())
    }

    fn default_output(&self, _analysis: &ToneAnalysis) -> Option<ToneStyleGuide> {
        Some(ToneStyleGuide::fallback())
    }
}

/// Analysis (after overrides) and the guide derived from it.
#[derive(Debug, Clone)]
pub struct ToneDerivation {
    pub analysis: ToneAnalysis,
    pub guide: ToneStyleGuide,
    pub used_default_analysis: bool,
    pub used_default_guide: bool,
}

pub async fn derive_tone_guide(
    runner: &StageRunner,
    serp: &SerpData,
    overrides: &ToneOverrides,
) -> PipelineResult<ToneDerivation> {
    let posts = sample_posts(serp);
    tracing::info!(samples = posts.len(), "analyzing competing posts");

    let analysis_outcome = runner.run_with_outcome(&ToneAnalysisStage, &posts).await?;
    let mut analysis = analysis_outcome.output;
    overrides.apply(&mut analysis);

    let guide_outcome = runner.run_with_outcome(&ToneGuideStage, &analysis).await?;
    let mut guide = guide_outcome.output;
    guide.meta.generated_at = chrono::Local::now().format("%Y-%m-%d").to_string();
    guide.meta.based_on_serp = !posts.is_empty();

    Ok(ToneDerivation {
        analysis,
        guide,
        used_default_analysis: analysis_outcome.used_default,
        used_default_guide: guide_outcome.used_default,
    })
}
