use regex::Regex;
use std::sync::LazyLock;

use super::rules::{apply_rules, TransformRule};
use super::PlatformRenderer;

static IMG_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<img\b[^>]*>").ok());

pub struct WordPressRenderer;

pub fn rules() -> Vec<TransformRule> {
    vec![
        TransformRule::Pattern {
            regex: &IMG_TAG,
            replace: "<div class=\"wp-block-image\">$0</div>",
        },
        TransformRule::replace("<blockquote>", "<blockquote class=\"wp-block-quote\">"),
        TransformRule::replace("<p>", "<p class=\"wp-block-paragraph\">"),
    ]
}

impl PlatformRenderer for WordPressRenderer {
    fn platform(&self) -> &'static str {
        "wordpress"
    }

    fn template_name(&self) -> Option<&'static str> {
        Some("wordpress_template.html")
    }

    fn transform(&self, content: &str) -> String {
        apply_rules(content, &rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_image_tags_are_wrapped() {
        let out = WordPressRenderer.transform("<img src=\"a.png\" alt=\"a\"/><br/><hr />");
        assert_eq!(
            out,
            "<div class=\"wp-block-image\"><img src=\"a.png\" alt=\"a\"/></div><br/><hr />"
        );
    }

    #[test]
    fn test_unclosed_image_tag_is_wrapped() {
        let out = WordPressRenderer.transform("<img src=\"b.jpg\">");
        assert_eq!(out, "<div class=\"wp-block-image\"><img src=\"b.jpg\"></div>");
    }

    #[test]
    fn test_quote_and_paragraph_classes() {
        let out = WordPressRenderer.transform("<blockquote><p>인용</p></blockquote>");
        assert_eq!(
            out,
            "<blockquote class=\"wp-block-quote\"><p class=\"wp-block-paragraph\">인용</p></blockquote>"
        );
    }
}
