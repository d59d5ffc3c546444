//! Keyword expansion: long-tail keywords with volume, difficulty and cluster.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::external::{estimate_volume, VolumeSource};
use crate::generation::GenerationMode;
use crate::planner::types::{KeywordExpansion, KeywordMetric, VolumeOrigin};
use crate::workflow_utils::{JsonExtractor, Stage, StageRequest, StageRunner};

pub const CLUSTER_AUTOMATION: &str = "자동화";
pub const CLUSTER_OPERATIONS: &str = "운영";
pub const CLUSTER_AI: &str = "AI";
pub const CLUSTER_OTHER: &str = "기타";

/// `min(100, max(1, chars * 5))`
pub fn keyword_difficulty(keyword: &str) -> u32 {
    (keyword.chars().count() as u32 * 5).clamp(1, 100)
}

pub fn keyword_cluster(keyword: &str) -> &'static str {
    if keyword.contains("자동") {
        CLUSTER_AUTOMATION
    } else if keyword.contains("운영") {
        CLUSTER_OPERATIONS
    } else if keyword.contains("AI") || keyword.contains("GPT") {
        CLUSTER_AI
    } else {
        CLUSTER_OTHER
    }
}

#[derive(Deserialize)]
struct RawKeywords {
    #[serde(default)]
    expanded_keywords: Vec<String>,
}

pub struct KeywordExpansionStage;

impl Stage<String, Vec<String>> for KeywordExpansionStage {
    fn name(&self) -> &'static str {
        "keyword_expander"
    }

    fn request(&self, seed: &String) -> StageRequest {
        let prompt = format!(
            r#"
다음 키워드를 기반으로 LSI/롱테일 키워드를 생성해주세요.

[입력 키워드]
{seed}

[조건]
1. 총 개수 20~40개
2. 중복 제거
3. JSON 외 텍스트 금지

[출력 형식]
{{
  "expanded_keywords": ["키워드1", "키워드2"]
}}
"#
        );
        StageRequest::new(prompt, 2000, GenerationMode::Fast)
    }

    fn parse(&self, _seed: &String, raw: &str) -> PipelineResult<Vec<String>> {
        let parsed: RawKeywords = JsonExtractor::extract_as(self.name(), raw)?;
        let mut seen = HashSet::new();
        let keywords: Vec<String> = parsed
            .expanded_keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();
        if keywords.is_empty() {
            return Err(PipelineError::validation(self.name(), "no keywords returned"));
        }
        Ok(keywords)
    }
}

/// Expand `seed`, then attach volumes, difficulty and clusters.
pub async fn expand_keywords(
    runner: &StageRunner,
    volumes: &dyn VolumeSource,
    seed: &str,
) -> PipelineResult<KeywordExpansion> {
    let seed = seed.trim().to_string();
    if seed.is_empty() {
        return Err(PipelineError::validation("keyword_expander", "seed keyword is empty"));
    }
    let expanded = runner.run(&KeywordExpansionStage, &seed).await?;

    let lookup = volumes.volumes(&expanded).await;
    let (looked_up, volume_source) = match lookup.result {
        Some(found) if !lookup.fallback => (found, VolumeOrigin::Datalab),
        _ => (BTreeMap::new(), VolumeOrigin::Estimate),
    };

    let mut clusters: BTreeMap<String, Vec<String>> = [
        CLUSTER_AUTOMATION,
        CLUSTER_OPERATIONS,
        CLUSTER_AI,
        CLUSTER_OTHER,
    ]
    .into_iter()
    .map(|name| (name.to_string(), Vec::new()))
    .collect();

    let keywords = expanded
        .into_iter()
        .map(|keyword| {
            let cluster = keyword_cluster(&keyword);
            clusters
                .entry(cluster.to_string())
                .or_default()
                .push(keyword.clone());
            KeywordMetric {
                volume: looked_up
                    .get(&keyword)
                    .copied()
                    .unwrap_or_else(|| estimate_volume(&keyword)),
                difficulty: keyword_difficulty(&keyword),
                cluster: cluster.to_string(),
                keyword,
            }
        })
        .collect::<Vec<_>>();

    info!(seed = %seed, count = keywords.len(), source = ?volume_source, "keywords expanded");
    Ok(KeywordExpansion {
        seed,
        keywords,
        clusters,
        volume_source,
    })
}
