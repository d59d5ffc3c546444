//! Step 0 (optional): Sharpen a raw idea through a short Q&A.
//!
//! Up to five rounds, one question area per round. The user can stop at any
//! time with a stop word; after round three the generator is asked whether
//! enough is known. Synthesis and detail extraction always run afterwards.

use std::sync::Arc;
use tracing::info;

use blog_pipeline_sdk::{log_info, log_warning};

use crate::error::{PipelineError, PipelineResult};
use crate::generation::{GenerationMode, TextGenerator};
use crate::interactive::Prompter;
use crate::planner::types::{ConversationTurn, IdeaDetails, RefinedIdea};
use crate::workflow_utils::{JsonExtractor, Stage, StagePolicy, StageRequest, StageRunner};

pub const MAX_ROUNDS: u32 = 5;
pub const MIN_ROUNDS_BEFORE_CHECK: u32 = 3;
pub const STOP_WORDS: [&str; 6] = ["충분", "충분해", "그만", "완료", "done", "skip"];

const QUESTION_AREAS: [&str; 5] = [
    "타겟 독자와 목적",
    "수익성 극대화를 위한 최적 플랫폼",
    "30일 로테이션 가능한 에버그린 소주제 및 글감 방향성",
    "차별화 포인트와 경쟁 우위",
    "장기 지속 가능성",
];

pub fn is_stop_word(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    STOP_WORDS.contains(&answer.as_str())
}

fn format_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return "없음".to_string();
    }
    history
        .iter()
        .map(|turn| format!("Q{r}: {}\nA{r}: {}", turn.question, turn.answer, r = turn.round))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct DetailInput<'a> {
    pub refined_idea: &'a str,
    pub history: &'a [ConversationTurn],
}

pub struct IdeaDetailStage;

impl<'a> Stage<DetailInput<'a>, IdeaDetails> for IdeaDetailStage {
    fn name(&self) -> &'static str {
        "idea_details"
    }

    fn policy(&self) -> StagePolicy {
        StagePolicy::BestEffort
    }

    fn request(&self, input: &DetailInput<'a>) -> StageRequest {
        let prompt = format!(
            r#"
다음 정교화된 아이디어에서 구조화된 정보를 추출하세요.

[정교화된 아이디어]
{idea}

[대화 내용]
{history}

[출력 형식]
JSON만 출력하세요.

{{
  "target_audience": "타겟 독자 (구체적으로)",
  "platform": "메인 플랫폼",
  "content_angle": "콘텐츠 방향성",
  "differentiation": "차별화 포인트",
  "sustainability": "장기 활용 전략"
}}
"#,
            idea = input.refined_idea,
            history = format_history(input.history),
        );
        StageRequest::new(prompt, 1000, GenerationMode::Analytical)
    }

    fn parse(&self, _input: &DetailInput<'a>, raw: &str) -> PipelineResult<IdeaDetails> {
        JsonExtractor::extract_as(self.name(), raw)
    }

    fn default_output(&self, _input: &DetailInput<'a>) -> Option<IdeaDetails> {
        Some(IdeaDetails {
            platform: "네이버 블로그".to_string(),
            ..IdeaDetails::default()
        })
    }
}

pub struct IdeaRefiner {
    runner: StageRunner,
    prompter: Arc<dyn Prompter>,
}

impl IdeaRefiner {
    pub fn new(runner: StageRunner, prompter: Arc<dyn Prompter>) -> Self {
        Self { runner, prompter }
    }

    fn generator(&self) -> &Arc<dyn TextGenerator> {
        self.runner.generator()
    }

    pub async fn refine(&self, initial_idea: &str) -> PipelineResult<RefinedIdea> {
        let initial_idea = initial_idea.trim();
        if initial_idea.is_empty() {
            return Err(PipelineError::validation("idea_refiner", "idea is empty"));
        }

        let mut history: Vec<ConversationTurn> = Vec::new();
        let mut context = initial_idea.to_string();

        for round in 1..=MAX_ROUNDS {
            log_info!("--- 질문 {}/{} ---", round, MAX_ROUNDS);
            let question = self.next_question(&context, round, &history).await?;
            let answer = self.prompter.ask(&format!("\n🤖 {}\n👤 답변: ", question))?;

            if is_stop_word(&answer) {
                log_info!("대화를 종료합니다.");
                break;
            }
            if answer.is_empty() {
                log_warning!("답변이 비어 있습니다. 충분하다면 '충분'이라고 입력하세요.");
                continue;
            }

            context = format!("{}\n\nQ: {}\nA: {}", context, question, answer);
            history.push(ConversationTurn {
                round,
                question,
                answer,
            });

            if round >= MIN_ROUNDS_BEFORE_CHECK && self.is_sufficient(&context).await? {
                info!(rounds = round, "refinement has enough information");
                break;
            }
        }

        let refined_idea = self.synthesize(initial_idea, &history).await?;
        let extracted_details = self
            .runner
            .run(
                &IdeaDetailStage,
                &DetailInput {
                    refined_idea: &refined_idea,
                    history: &history,
                },
            )
            .await?;

        Ok(RefinedIdea {
            initial_idea: initial_idea.to_string(),
            refined_idea,
            conversation_history: history,
            extracted_details,
        })
    }

    async fn next_question(
        &self,
        context: &str,
        round: u32,
        history: &[ConversationTurn],
    ) -> PipelineResult<String> {
        let area = QUESTION_AREAS
            .get(round as usize - 1)
            .copied()
            .unwrap_or("추가 세부사항");
        let prompt = format!(
            r#"당신은 블로그 기획 전문가입니다.
사용자가 제시한 아이디어를 구체화하기 위해 질문을 생성하세요.

현재 컨텍스트:
{context}

현재 라운드: {round}
질문 영역: {area}

이전 대화 기록:
{history}

아이디어를 더 구체화할 수 있는 1개의 핵심 질문만 출력하세요 (설명 없이):"#,
            history = format_history(history),
        );
        let question = self
            .generator()
            .generate(&prompt, 300, GenerationMode::Fast)
            .await?;
        Ok(question.trim().to_string())
    }

    async fn is_sufficient(&self, context: &str) -> PipelineResult<bool> {
        let prompt = format!(
            r#"다음 대화 내용을 분석하여 블로그 아이디어를 구체화하기에 충분한 정보가 모였는지 판단하세요.

대화 컨텍스트:
{context}

판단 기준:
1. 타겟 독자가 명확한가?
2. 해결하려는 문제가 구체적인가?
3. 차별화 포인트가 있는가?
4. 콘텐츠 방향성이 명확한가?

충분하면 "YES", 더 필요하면 "NO"만 답하세요:"#
        );
        let reply = self
            .generator()
            .generate(&prompt, 10, GenerationMode::Fast)
            .await?;
        Ok(reply.to_uppercase().contains("YES"))
    }

    async fn synthesize(
        &self,
        initial_idea: &str,
        history: &[ConversationTurn],
    ) -> PipelineResult<String> {
        let prompt = format!(
            r#"당신은 블로그 기획 전문가입니다.
사용자의 초기 아이디어와 대화 내용을 종합하여 정교화된 아이디어를 작성하세요.

초기 아이디어: {initial_idea}

대화 내용:
{history}

다음 항목을 포함하세요:
[블로그 주제] [타겟 독자] [추천 플랫폼] [30일 에버그린 콘텐츠 전략] [차별화 포인트] [수익화 전략]"#,
            history = format_history(history),
        );
        let refined = self
            .generator()
            .generate(&prompt, 1000, GenerationMode::Creative)
            .await?;
        let refined = refined.trim();
        Ok(if refined.is_empty() {
            initial_idea.to_string()
        } else {
            refined.to_string()
        })
    }
}
