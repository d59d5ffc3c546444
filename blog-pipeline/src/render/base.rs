use super::PlatformRenderer;

/// Plain document for platforms without a dedicated renderer.
pub struct BaseRenderer;

impl PlatformRenderer for BaseRenderer {
    fn platform(&self) -> &'static str {
        "base"
    }

    fn template_name(&self) -> Option<&'static str> {
        None
    }

    fn transform(&self, content: &str) -> String {
        content.to_string()
    }
}

/// Minimal HTML page used when no template is available.
pub fn fallback_document(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{title}</title>\n</head>\n<body>\n    <h1>{title}</h1>\n    <div>{content}</div>\n</body>\n</html>",
        title = title,
        content = content
    )
}
