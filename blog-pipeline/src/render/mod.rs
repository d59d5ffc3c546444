//! Platform-specific rendering of finished posts.
//!
//! ## Module Structure
//!
//! - `rules` - Ordered rewrite rules the transforms are built from
//! - `base` - Plain renderer and the fallback document
//! - `naver`, `tistory`, `wordpress`, `brunch` - Platform transforms
//! - `cli` - Command-line argument definitions
//! - `publish` - Loading posts and writing rendered artifacts

pub mod base;
pub mod brunch;
pub mod cli;
pub mod naver;
pub mod publish;
pub mod rules;
pub mod tistory;
pub mod wordpress;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::content::types::FinishedPost;

pub use base::{fallback_document, BaseRenderer};
pub use brunch::BrunchRenderer;
pub use naver::NaverRenderer;
pub use publish::{publish_post, run_render_post, PublishMetadata, PublishedPost};
pub use tistory::TistoryRenderer;
pub use wordpress::WordPressRenderer;

/// Platforms with a dedicated renderer.
pub const PLATFORMS: [&str; 4] = ["naver", "tistory", "wordpress", "brunch"];

const TEMPLATE_NAMES: [&str; 4] = [
    "naver_template.html",
    "tistory_template.html",
    "wordpress_template.html",
    "brunch_template.md",
];

/// Input to a renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderDocument {
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub platform: String,
    pub extension: String,
    pub markup: String,
}

/// Templates read once from disk, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, String>,
}

impl TemplateStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Missing files are skipped; renderers then use the fallback document.
    pub fn load_dir(dir: &Path) -> Self {
        let mut store = Self::default();
        for name in TEMPLATE_NAMES {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(body) => {
                    debug!(template = name, "template loaded");
                    store.templates.insert(name.to_string(), body);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "template unreadable"),
            }
        }
        store
    }

    pub fn with_template(mut self, name: &str, body: &str) -> Self {
        self.templates.insert(name.to_string(), body.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }
}

/// Single pass over the template; substituted values are never rescanned.
pub fn fill_template(template: &str, doc: &RenderDocument, content: &str) -> String {
    let tags = doc.tags.join(", ");
    let values = [
        ("{{title}}", doc.title.as_str()),
        ("{{meta_description}}", doc.meta_description.as_str()),
        ("{{content}}", content),
        ("{{tags}}", tags.as_str()),
        ("{{created_at}}", doc.created_at.as_deref().unwrap_or("")),
    ];

    let mut out = String::with_capacity(template.len() + content.len());
    let mut rest = template;
    while let Some(pos) = rest.find("{{") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match values.iter().find(|(placeholder, _)| tail.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub trait PlatformRenderer: Send + Sync {
    fn platform(&self) -> &'static str;

    fn extension(&self) -> &'static str {
        "html"
    }

    fn template_name(&self) -> Option<&'static str>;

    /// Platform rewrite of the body markup.
    fn transform(&self, content: &str) -> String;

    fn render(&self, doc: &RenderDocument, templates: &TemplateStore) -> RenderedArtifact {
        let content = self.transform(&doc.content);
        let markup = match self.template_name().and_then(|name| templates.get(name)) {
            Some(template) => fill_template(template, doc, &content),
            None => fallback_document(&doc.title, &content),
        };
        RenderedArtifact {
            platform: self.platform().to_string(),
            extension: self.extension().to_string(),
            markup,
        }
    }
}

/// Unknown names get the base renderer.
pub fn renderer_for(name: &str) -> Box<dyn PlatformRenderer> {
    match name.trim().to_lowercase().as_str() {
        "naver" => Box::new(NaverRenderer),
        "tistory" => Box::new(TistoryRenderer),
        "wordpress" => Box::new(WordPressRenderer),
        "brunch" => Box::new(BrunchRenderer),
        _ => Box::new(BaseRenderer),
    }
}

/// HTML body for a post: opening, sections, table, checklist, FAQ, closing.
pub fn post_body_html(post: &FinishedPost) -> String {
    let mut blocks = Vec::new();
    if !post.opening.is_empty() {
        blocks.push(format!("<p>{}</p>", post.opening));
    }
    for section in &post.sections {
        let heading = if section.h2_emoji.is_empty() {
            section.h2.clone()
        } else {
            format!("{} {}", section.h2_emoji, section.h2)
        };
        blocks.push(format!("<h2>{}</h2>", heading));
        for h3 in &section.h3_contents {
            blocks.push(format!("<h3>{}</h3>", h3.h3));
            blocks.extend(h3.paragraphs.iter().map(|p| format!("<p>{}</p>", p)));
        }
    }
    if !post.table_html.is_empty() {
        blocks.push(post.table_html.clone());
    }
    if !post.checklist_html.is_empty() {
        blocks.push(post.checklist_html.clone());
    }
    if !post.faq.is_empty() {
        blocks.push("<h2>자주 묻는 질문</h2>".to_string());
        for entry in &post.faq {
            blocks.push(format!("<h3>Q. {}</h3>", entry.question));
            blocks.push(format!("<p>{}</p>", entry.answer));
        }
    }
    if !post.closing.is_empty() {
        blocks.push(format!("<p>{}</p>", post.closing));
    }
    blocks.join("\n\n")
}

pub fn post_to_document(post: &FinishedPost) -> RenderDocument {
    let title = if post.seo_title.trim().is_empty() {
        post.title.clone()
    } else {
        post.seo_title.clone()
    };
    RenderDocument {
        title,
        meta_description: post.meta_description.clone(),
        content: post_body_html(post),
        tags: post.keywords_used.clone(),
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::ContentStructure;

    fn sample_doc() -> RenderDocument {
        RenderDocument {
            title: "겨울 여행 준비물".into(),
            meta_description: "준비물 총정리".into(),
            content: "<h2>📌 준비</h2>\n\n<p><strong>핫팩</strong> 💡 TIP</p>\n\n<img src=\"a.png\"/>".into(),
            tags: vec!["겨울".into(), "여행".into()],
            created_at: None,
        }
    }

    #[test]
    fn test_template_placeholders() {
        let templates = TemplateStore::empty().with_template(
            "naver_template.html",
            "<title>{{title}}</title>|{{meta_description}}|{{tags}}|{{created_at}}|{{content}}",
        );
        let doc = RenderDocument {
            content: "본문".into(),
            ..sample_doc()
        };
        let artifact = renderer_for("naver").render(&doc, &templates);
        assert_eq!(
            artifact.markup,
            "<title>겨울 여행 준비물</title>|준비물 총정리|겨울, 여행||본문"
        );
    }

    #[test]
    fn test_missing_template_uses_fallback_document() {
        let artifact = renderer_for("tistory").render(&sample_doc(), &TemplateStore::empty());
        assert!(artifact.markup.starts_with("<!DOCTYPE html>"));
        assert!(artifact.markup.contains("tt-article-useless-p-margin"));
    }

    #[test]
    fn test_unknown_platform_is_base() {
        assert_eq!(renderer_for("blogger").platform(), "base");
        assert_eq!(renderer_for("Brunch").extension(), "md");
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let templates = TemplateStore::empty()
            .with_template("wordpress_template.html", "{{title}}\n{{content}}")
            .with_template("brunch_template.md", "# {{title}}\n{{content}}");
        let doc = sample_doc();
        for platform in PLATFORMS.iter().chain(["base"].iter()) {
            let renderer = renderer_for(platform);
            let first = renderer.render(&doc, &templates);
            let second = renderer.render(&doc, &templates);
            assert_eq!(first, second, "{} output differs between runs", platform);
        }
    }

    #[test]
    fn test_post_document_uses_seo_title_and_keywords() {
        let structure = ContentStructure::fallback("제목", 1, 1);
        let mut post = FinishedPost::fallback(1, "제목", &structure);
        post.seo_title = "SEO 제목".into();
        post.keywords_used = vec!["키워드".into()];
        let doc = post_to_document(&post);
        assert_eq!(doc.title, "SEO 제목");
        assert_eq!(doc.tags, vec!["키워드"]);
        assert!(doc.content.contains("<h2>📌 섹션 1</h2>"));
        assert!(doc.content.contains("<h3>Q. 질문1</h3>"));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let templates = TemplateStore::empty()
            .with_template("wordpress_template.html", "{{title}}|{{content}}|{{unknown}}|{{tags}}");
        let doc = RenderDocument {
            title: "{{content}} 제목".into(),
            content: "<p>{{tags}}</p>".into(),
            tags: vec!["겨울".into()],
            ..RenderDocument::default()
        };
        let artifact = renderer_for("wordpress").render(&doc, &templates);
        assert_eq!(
            artifact.markup,
            "{{content}} 제목|<p class=\"wp-block-paragraph\">{{tags}}</p>|{{unknown}}|겨울"
        );
    }

    #[test]
    fn test_box_markup_stays_balanced() {
        let structure = ContentStructure::fallback("겨울 여행", 6, 2);
        let mut post = FinishedPost::fallback(1, "겨울 여행", &structure);
        post.opening = "💡 TIP: 짐은 가볍게".into();
        let body = post_body_html(&post);
        for platform in ["naver", "tistory", "wordpress"] {
            let out = renderer_for(platform).transform(&body);
            assert_eq!(
                out.matches("<div").count(),
                out.matches("</div>").count(),
                "{} leaves unbalanced boxes",
                platform
            );
        }
        let tistory = renderer_for("tistory").transform(&body);
        assert!(tistory.contains("<div class=\"content-box\"><h2>📌 섹션 1</h2></div>"));
        let naver = renderer_for("naver").transform(&body);
        assert!(naver.contains("<div class=\"tip-box\"><p>💡 TIP: 짐은 가볍게</p></div>"));
    }
}
