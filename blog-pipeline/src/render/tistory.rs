use super::rules::{apply_rules, TransformRule};
use super::PlatformRenderer;

pub struct TistoryRenderer;

const NOTE_RULES: &[TransformRule] = &[TransformRule::BoxBlocks {
    marker: "📌",
    class: "content-box",
}];

pub fn rules() -> Vec<TransformRule> {
    vec![
        TransformRule::replace("<pre><code>", "<pre class=\"code-block\"><code>"),
        TransformRule::WhenContains {
            markers: &["📌", "NOTE"],
            rules: NOTE_RULES,
        },
        TransformRule::Wrap {
            prefix: "<div class=\"tt-article-useless-p-margin\">",
            suffix: "</div>",
        },
    ]
}

impl PlatformRenderer for TistoryRenderer {
    fn platform(&self) -> &'static str {
        "tistory"
    }

    fn template_name(&self) -> Option<&'static str> {
        Some("tistory_template.html")
    }

    fn transform(&self, content: &str) -> String {
        apply_rules(content, &rules())
    }
}
