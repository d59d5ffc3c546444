use super::rules::{apply_rules, TransformRule};
use super::PlatformRenderer;

pub struct NaverRenderer;

const TIP_RULES: &[TransformRule] = &[TransformRule::BoxBlocks {
    marker: "💡",
    class: "tip-box",
}];

pub fn rules() -> Vec<TransformRule> {
    vec![
        TransformRule::replace("<strong>", "<span class=\"highlight\"><strong>"),
        TransformRule::replace("</strong>", "</strong></span>"),
        TransformRule::WhenContains {
            markers: &["💡", "TIP"],
            rules: TIP_RULES,
        },
    ]
}

impl PlatformRenderer for NaverRenderer {
    fn platform(&self) -> &'static str {
        "naver"
    }

    fn template_name(&self) -> Option<&'static str> {
        Some("naver_template.html")
    }

    fn transform(&self, content: &str) -> String {
        apply_rules(content, &rules())
    }
}
