//! Ordered rewrite rules shared by the platform transforms.

use regex::Regex;
use std::sync::LazyLock;

/// Rendered post bodies separate blocks with a blank line.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Literal find/replace over the whole content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceRule {
    pub find: &'static str,
    pub replace: &'static str,
}

impl ReplaceRule {
    pub const fn new(find: &'static str, replace: &'static str) -> Self {
        Self { find, replace }
    }

    pub fn apply(&self, content: &str) -> String {
        content.replace(self.find, self.replace)
    }
}

#[derive(Debug, Clone)]
pub enum TransformRule {
    Replace(ReplaceRule),
    /// Inner rules run only when the content contains one of the markers,
    /// compared case-insensitively.
    WhenContains {
        markers: &'static [&'static str],
        rules: &'static [TransformRule],
    },
    /// Every block containing `marker` is wrapped in `<div class="{class}">`;
    /// the box closes at the end of that block.
    BoxBlocks {
        marker: &'static str,
        class: &'static str,
    },
    /// `$0`/`$1` style replacement for tags a literal rule cannot match.
    Pattern {
        regex: &'static LazyLock<Option<Regex>>,
        replace: &'static str,
    },
    Wrap {
        prefix: &'static str,
        suffix: &'static str,
    },
}

impl TransformRule {
    pub const fn replace(find: &'static str, replace: &'static str) -> Self {
        Self::Replace(ReplaceRule::new(find, replace))
    }

    pub fn apply(&self, content: &str) -> String {
        match self {
            Self::Replace(rule) => rule.apply(content),
            Self::WhenContains { markers, rules } => {
                let upper = content.to_uppercase();
                if markers.iter().any(|m| upper.contains(&m.to_uppercase())) {
                    apply_rules(content, rules)
                } else {
                    content.to_string()
                }
            }
            Self::BoxBlocks { marker, class } => content
                .split(BLOCK_SEPARATOR)
                .map(|block| {
                    if block.contains(marker) {
                        format!("<div class=\"{}\">{}</div>", class, block)
                    } else {
                        block.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR),
            Self::Pattern { regex, replace } => match LazyLock::force(regex) {
                Some(re) => re.replace_all(content, *replace).into_owned(),
                None => content.to_string(),
            },
            Self::Wrap { prefix, suffix } => format!("{}{}{}", prefix, content, suffix),
        }
    }
}

pub fn apply_rules(content: &str, rules: &[TransformRule]) -> String {
    rules
        .iter()
        .fold(content.to_string(), |acc, rule| rule.apply(&acc))
}
