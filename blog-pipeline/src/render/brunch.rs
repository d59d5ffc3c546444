//! HTML to Markdown for brunch.

use regex::Regex;
use std::sync::LazyLock;

use super::rules::{apply_rules, TransformRule};
use super::PlatformRenderer;

static ANCHOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"<a\b[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).ok());
static IMAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"<img\b[^>]*?src="([^"]*)"[^>]*>"#).ok());

pub struct BrunchRenderer;

pub fn rules() -> Vec<TransformRule> {
    vec![
        TransformRule::replace("<h2>", "\n## "),
        TransformRule::replace("</h2>", "\n"),
        TransformRule::replace("<h3>", "\n### "),
        TransformRule::replace("</h3>", "\n"),
        TransformRule::replace("<strong>", "**"),
        TransformRule::replace("</strong>", "**"),
        TransformRule::replace("<em>", "*"),
        TransformRule::replace("</em>", "*"),
        TransformRule::Pattern {
            regex: &ANCHOR,
            replace: "[$2]($1)",
        },
        TransformRule::Pattern {
            regex: &IMAGE,
            replace: "![]($1)",
        },
        TransformRule::replace("<ul>", "\n"),
        TransformRule::replace("</ul>", "\n"),
        TransformRule::replace("<li>", "- "),
        TransformRule::replace("</li>", "\n"),
        // Blocks are already blank-line separated.
        TransformRule::replace("<p>", ""),
        TransformRule::replace("</p>", "\n"),
    ]
}

impl PlatformRenderer for BrunchRenderer {
    fn platform(&self) -> &'static str {
        "brunch"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn template_name(&self) -> Option<&'static str> {
        Some("brunch_template.md")
    }

    fn transform(&self, content: &str) -> String {
        apply_rules(content, &rules())
    }
}
