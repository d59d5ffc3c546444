//! Data types for tone derivation and per-day content generation.
//!
//! Generator replies are deserialized leniently: every field has a default
//! and counts accept numbers or numeric strings. Structural rules (FAQ count,
//! heading presence) are enforced separately by `validate` methods so a
//! stage can decide whether to fall back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{PipelineError, PipelineResult};

pub const DEFAULT_H2_COUNT: u32 = 6;
pub const DEFAULT_H3_PER_H2: u32 = 2;
pub const DEFAULT_FAQ_COUNT: u32 = 3;
pub const DEFAULT_OPTIMAL_LENGTH: u32 = 1800;
pub const REQUIRED_FAQ_COUNT: usize = 3;

pub const DEFAULT_OPENING: &str = "이 글에서는 중요한 정보를 소개합니다.";
pub const DEFAULT_CLOSING: &str = "도움이 되셨기를 바랍니다!";
pub const DEFAULT_H2_EMOJI: &str = "📌";

/// Numbers, numeric strings and ranges like `"5-7"` (first bound); anything
/// else, including negatives, becomes 0.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0).round(),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };
    Ok(if count > 0.0 { count as u32 } else { 0 })
}

/// [`lenient_count`] for lengths.
pub fn lenient_length<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_count(deserializer).map(|n| n as usize)
}

/// `true`/`false`, or a non-empty string.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => !s.trim().is_empty() && s.trim() != "false",
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        _ => false,
    })
}

fn or_default(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

// ============================================================================
// Tone Analysis Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneTraits {
    pub personality: String,
    pub formality: String,
    pub voice: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceStyle {
    pub length: String,
    #[serde(deserialize_with = "lenient_count")]
    pub paragraph_sentences: u32,
    pub emoji_usage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructurePattern {
    pub opening_pattern: String,
    pub body_pattern: String,
    pub closing_pattern: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoElements {
    #[serde(deserialize_with = "lenient_count")]
    pub h2_count: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub h3_count: u32,
    pub keyword_density: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub table_usage: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub list_usage: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Readability {
    pub emphasis_method: String,
    pub spacing: String,
    pub visual_separators: String,
}

/// Writing patterns observed in competing posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneAnalysis {
    pub tone: ToneTraits,
    pub sentence_style: SentenceStyle,
    pub structure: StructurePattern,
    pub seo_elements: SeoElements,
    pub readability: Readability,
    pub recommended_length: String,
    pub key_success_factors: Vec<String>,
}

impl ToneAnalysis {
    /// Analysis used when the generator's reply is unusable.
    pub fn fallback() -> Self {
        Self {
            tone: ToneTraits {
                personality: "친근하고 공감하는".into(),
                formality: "구어체".into(),
                voice: "1인칭".into(),
            },
            sentence_style: SentenceStyle {
                length: "보통(20~40자)".into(),
                paragraph_sentences: 3,
                emoji_usage: "보통".into(),
            },
            structure: StructurePattern {
                opening_pattern: "개인 경험 공감".into(),
                body_pattern: "리스트형".into(),
                closing_pattern: "행동 유도(CTA)".into(),
            },
            seo_elements: SeoElements {
                h2_count: DEFAULT_H2_COUNT,
                h3_count: 12,
                keyword_density: "2-3%".into(),
                table_usage: true,
                list_usage: true,
            },
            readability: Readability {
                emphasis_method: "굵게".into(),
                spacing: "보통".into(),
                visual_separators: "이모지".into(),
            },
            recommended_length: "1500~2000자".into(),
            key_success_factors: vec![
                "개인 경험 기반 공감".into(),
                "실용적 정보 제공".into(),
                "시각적 가독성".into(),
            ],
        }
    }
}

// ============================================================================
// Tone Style Guide Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneGuide {
    pub personality: String,
    pub voice: String,
    pub formality: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningTemplate {
    pub pattern: String,
    pub length: String,
    pub example: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTemplate {
    pub pattern: String,
    #[serde(deserialize_with = "lenient_count")]
    pub section_count: u32,
    pub h2_pattern: String,
    pub h3_pattern: String,
    pub paragraph_rule: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosingTemplate {
    pub pattern: String,
    pub length: String,
    pub cta_examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureTemplate {
    pub opening: OpeningTemplate,
    pub body: BodyTemplate,
    pub closing: ClosingTemplate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoRules {
    pub title_format: String,
    #[serde(deserialize_with = "lenient_count")]
    pub h2_count: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub h3_per_h2: u32,
    pub keyword_placement: String,
    pub internal_links: String,
    pub table_usage: String,
    #[serde(deserialize_with = "lenient_count")]
    pub faq_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLength {
    #[serde(deserialize_with = "lenient_count")]
    pub min: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub max: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub optimal: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideMeta {
    pub generated_at: String,
    pub based_on_serp: bool,
    pub analysis_version: String,
}

/// Rules every generated post follows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneStyleGuide {
    pub tone_guide: ToneGuide,
    pub structure_template: StructureTemplate,
    pub writing_rules: BTreeMap<String, Value>,
    pub seo_rules: SeoRules,
    pub content_length: ContentLength,
    pub visual_elements: BTreeMap<String, Value>,
    pub monetization_hints: BTreeMap<String, Value>,
    #[serde(rename = "_meta")]
    pub meta: GuideMeta,
}

impl ToneStyleGuide {
    /// Replace zero counts with their defaults.
    pub fn normalized(mut self) -> Self {
        let rules = &mut self.seo_rules;
        rules.h2_count = or_default(rules.h2_count, DEFAULT_H2_COUNT);
        rules.h3_per_h2 = or_default(rules.h3_per_h2, DEFAULT_H3_PER_H2);
        rules.faq_count = or_default(rules.faq_count, DEFAULT_FAQ_COUNT);
        self.content_length.optimal =
            or_default(self.content_length.optimal, DEFAULT_OPTIMAL_LENGTH);
        self.structure_template.body.section_count =
            or_default(self.structure_template.body.section_count, rules.h2_count);
        self
    }

    pub fn h2_count(&self) -> u32 {
        or_default(self.seo_rules.h2_count, DEFAULT_H2_COUNT)
    }

    pub fn h3_per_h2(&self) -> u32 {
        or_default(self.seo_rules.h3_per_h2, DEFAULT_H3_PER_H2)
    }

    pub fn optimal_length(&self) -> u32 {
        or_default(self.content_length.optimal, DEFAULT_OPTIMAL_LENGTH)
    }

    /// Guide used when the generator's reply is unusable.
    pub fn fallback() -> Self {
        let text = |pairs: &[(&str, &str)]| -> BTreeMap<String, Value> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect()
        };
        Self {
            tone_guide: ToneGuide {
                personality: "친근하고 공감하는".into(),
                voice: "1인칭 ('저', '제가') 사용".into(),
                formality: "구어체 중심".into(),
                examples: vec![
                    "❌ 나쁜 예: 여행 계획을 수립하십시오.".into(),
                    "✅ 좋은 예: 저도 처음엔 막막했는데요, 이렇게 해보니 훨씬 쉬웠어요!".into(),
                ],
            },
            structure_template: StructureTemplate {
                opening: OpeningTemplate {
                    pattern: "개인 경험 → 공감 → 문제 제기".into(),
                    length: "80~120자".into(),
                    example: "작년 여름, 아이들과 여행을 갔다가 준비 부족으로 고생한 적 있으신가요?"
                        .into(),
                },
                body: BodyTemplate {
                    pattern: "리스트형 + 경험담".into(),
                    section_count: DEFAULT_H2_COUNT,
                    h2_pattern: "질문형/숫자형".into(),
                    h3_pattern: "구체적 소주제".into(),
                    paragraph_rule: "80~140자, 3~4문장".into(),
                },
                closing: ClosingTemplate {
                    pattern: "요약 → CTA".into(),
                    length: "60~100자".into(),
                    cta_examples: vec![
                        "오늘 소개한 방법으로 준비하시면 분명 즐거운 추억 만드실 거예요!".into(),
                        "다음 글에서는 실제 후기를 공유할게요. 궁금하시죠?".into(),
                    ],
                },
            },
            writing_rules: text(&[
                ("sentence_length", "20~40자"),
                ("paragraph_spacing", "2~3줄마다 공백"),
                ("emoji_usage", "섹션별 1개"),
                ("emphasis", "핵심 키워드만 굵게"),
                ("list_format", "• 형식"),
            ]),
            seo_rules: SeoRules {
                title_format: "48~58자, 키워드 앞배치".into(),
                h2_count: DEFAULT_H2_COUNT,
                h3_per_h2: DEFAULT_H3_PER_H2,
                keyword_placement: "첫 단락, 각 H2, 마지막 단락".into(),
                internal_links: "3~5개".into(),
                table_usage: "비교/요약 시 1개".into(),
                faq_count: DEFAULT_FAQ_COUNT,
            },
            content_length: ContentLength {
                min: 1500,
                max: 2000,
                optimal: DEFAULT_OPTIMAL_LENGTH,
            },
            visual_elements: text(&[
                ("thumbnail", "밝고 따뜻한 색감"),
                ("section_images", "3~5개"),
                ("alt_text_pattern", "키워드 + 구체적 설명"),
            ]),
            monetization_hints: text(&[
                ("affiliate_section", "본문 중간"),
                ("cta_placement", "오프닝 하단, 마무리"),
                ("product_mention", "자연스럽게 경험담"),
            ]),
            meta: GuideMeta {
                generated_at: String::new(),
                based_on_serp: false,
                analysis_version: "1.0".into(),
            },
        }
    }
}

// ============================================================================
// Content Structure Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSection {
    pub h2: String,
    pub h3_list: Vec<String>,
    pub content_outline: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePlan {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    #[serde(deserialize_with = "lenient_count")]
    pub insert_after_section: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistPlan {
    pub title: String,
    pub items: Vec<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub insert_after_section: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqStub {
    pub question: String,
    pub answer_outline: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalLink {
    pub anchor_text: String,
    #[serde(deserialize_with = "lenient_count")]
    pub target_day: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub insert_after_section: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePrompt {
    pub position: String,
    pub prompt: String,
    pub alt_text: String,
}

/// Outline produced by the structure stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStructure {
    pub seo_title: String,
    pub meta_description: String,
    pub h1: String,
    pub sections: Vec<OutlineSection>,
    pub table: TablePlan,
    pub checklist: ChecklistPlan,
    pub faq: Vec<FaqStub>,
    pub internal_links: Vec<InternalLink>,
    pub image_prompts: Vec<ImagePrompt>,
}

impl ContentStructure {
    pub fn validate(&self, stage: &str) -> PipelineResult<()> {
        if self.faq.len() != REQUIRED_FAQ_COUNT {
            return Err(PipelineError::validation(
                stage,
                format!("expected {} FAQ entries, got {}", REQUIRED_FAQ_COUNT, self.faq.len()),
            ));
        }
        if self.sections.is_empty() {
            return Err(PipelineError::validation(stage, "outline has no sections"));
        }
        if let Some((idx, _)) = self
            .sections
            .iter()
            .enumerate()
            .find(|(_, s)| s.h3_list.iter().all(|h3| h3.trim().is_empty()))
        {
            return Err(PipelineError::validation(
                stage,
                format!("section {} has no h3 headings", idx + 1),
            ));
        }
        Ok(())
    }

    /// Outline used when the generator's reply is unusable.
    pub fn fallback(title: &str, h2_count: u32, h3_per_h2: u32) -> Self {
        let h2_count = or_default(h2_count, DEFAULT_H2_COUNT);
        let h3_per_h2 = or_default(h3_per_h2, DEFAULT_H3_PER_H2);
        Self {
            seo_title: title.chars().take(55).collect(),
            meta_description: format!("{}에 대한 완벽한 가이드입니다. 지금 바로 확인하세요!", title),
            h1: title.to_string(),
            sections: (1..=h2_count)
                .map(|i| OutlineSection {
                    h2: format!("섹션 {}", i),
                    h3_list: (1..=h3_per_h2).map(|j| format!("소주제 {}-{}", i, j)).collect(),
                    content_outline: "내용 개요".to_string(),
                })
                .collect(),
            table: TablePlan {
                title: "비교표".into(),
                headers: vec!["항목".into(), "내용".into()],
                rows: vec![
                    vec!["예시1".into(), "설명1".into()],
                    vec!["예시2".into(), "설명2".into()],
                ],
                insert_after_section: 2,
            },
            checklist: ChecklistPlan {
                title: "체크리스트".into(),
                items: vec!["항목1".into(), "항목2".into(), "항목3".into()],
                insert_after_section: 3,
            },
            faq: (1..=REQUIRED_FAQ_COUNT)
                .map(|i| FaqStub {
                    question: format!("질문{}", i),
                    answer_outline: "답변".into(),
                })
                .collect(),
            internal_links: Vec::new(),
            image_prompts: vec![ImagePrompt {
                position: "thumbnail".into(),
                prompt: "밝고 따뜻한 이미지".into(),
                alt_text: title.to_string(),
            }],
        }
    }
}

// ============================================================================
// Finished Post Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct H3Content {
    pub h3: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSection {
    pub h2: String,
    pub h2_emoji: String,
    pub h3_contents: Vec<H3Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// One fully written post, persisted as `content/dayNN_content.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishedPost {
    #[serde(deserialize_with = "lenient_count")]
    pub day: u32,
    pub title: String,
    pub seo_title: String,
    pub meta_description: String,
    pub h1: String,
    pub opening: String,
    pub sections: Vec<PostSection>,
    pub table_html: String,
    pub checklist_html: String,
    pub faq: Vec<FaqEntry>,
    pub closing: String,
    pub internal_links: Vec<InternalLink>,
    /// As reported by the generator; never used for length checks.
    #[serde(deserialize_with = "lenient_count")]
    pub word_count: u32,
    pub keywords_used: Vec<String>,
    pub full_text: String,
    /// Always recomputed from `full_text`.
    #[serde(deserialize_with = "lenient_length")]
    pub full_text_length: usize,
}

impl FinishedPost {
    pub fn validate(&self, stage: &str) -> PipelineResult<()> {
        if self.sections.is_empty() {
            return Err(PipelineError::validation(stage, "post has no sections"));
        }
        if self
            .sections
            .iter()
            .all(|s| s.h3_contents.iter().all(|h3| h3.paragraphs.is_empty()))
        {
            return Err(PipelineError::validation(stage, "post has no paragraphs"));
        }
        if self.faq.len() != REQUIRED_FAQ_COUNT {
            return Err(PipelineError::validation(
                stage,
                format!("expected {} FAQ answers, got {}", REQUIRED_FAQ_COUNT, self.faq.len()),
            ));
        }
        Ok(())
    }

    /// Opening, then every h3's paragraphs joined by a space, then closing.
    pub fn assemble_full_text(&self) -> String {
        let mut text = self.opening.clone();
        for section in &self.sections {
            for h3 in &section.h3_contents {
                text.push_str(&h3.paragraphs.join(" "));
            }
        }
        text.push_str(&self.closing);
        text
    }

    pub fn recompute_full_text(&mut self) {
        self.full_text = self.assemble_full_text();
        self.full_text_length = self.full_text.chars().count();
    }

    /// Placeholder post that still follows the outline's headings.
    pub fn fallback(day: u32, title: &str, structure: &ContentStructure) -> Self {
        let or_title = |s: &str| {
            if s.trim().is_empty() {
                title.to_string()
            } else {
                s.to_string()
            }
        };
        let mut post = Self {
            day,
            title: title.to_string(),
            seo_title: or_title(&structure.seo_title),
            meta_description: structure.meta_description.clone(),
            h1: or_title(&structure.h1),
            opening: DEFAULT_OPENING.to_string(),
            sections: structure
                .sections
                .iter()
                .map(|section| PostSection {
                    h2: section.h2.clone(),
                    h2_emoji: DEFAULT_H2_EMOJI.to_string(),
                    h3_contents: section
                        .h3_list
                        .iter()
                        .map(|h3| H3Content {
                            h3: h3.clone(),
                            paragraphs: vec![
                                "내용을 작성 중입니다.".to_string(),
                                "자세한 내용은 곧 업데이트됩니다.".to_string(),
                            ],
                        })
                        .collect(),
                })
                .collect(),
            table_html: "<table><tr><td>내용</td></tr></table>".to_string(),
            checklist_html: "<ul><li>항목1</li></ul>".to_string(),
            faq: structure
                .faq
                .iter()
                .map(|stub| FaqEntry {
                    question: stub.question.clone(),
                    answer: stub.answer_outline.clone(),
                })
                .collect(),
            closing: DEFAULT_CLOSING.to_string(),
            internal_links: Vec::new(),
            word_count: 0,
            keywords_used: Vec::new(),
            full_text: String::new(),
            full_text_length: 0,
        };
        post.recompute_full_text();
        post
    }
}
