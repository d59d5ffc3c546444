//! Page fetching, structural extraction and blog-home post lists.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{PageFetcher, BROWSER_USER_AGENT};
use crate::error::{PipelineError, PipelineResult};

const NAVER_BLOG_HOST: &str = "blog.naver.com";
const NAVER_BLOG_ROOT: &str = "https://blog.naver.com";
const MAX_LINK_TITLE_CHARS: usize = 100;

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> PipelineResult<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| PipelineError::Config(format!("http client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> String {
        let result = async {
            let res = self.client.get(url).timeout(timeout).send().await?;
            let body = res.error_for_status()?.text().await?;
            Ok::<_, reqwest::Error>(body)
        }
        .await;

        match result {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "page fetch failed");
                String::new()
            }
        }
    }
}

/// Text and headings pulled from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStructure {
    pub body_text: String,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect::<Vec<_>>().join("")
}

fn texts_of(doc: &Html, selector: &str) -> Vec<String> {
    match Selector::parse(selector) {
        Ok(sel) => doc.select(&sel).map(element_text).collect(),
        Err(_) => Vec::new(),
    }
}

/// Body text is every `<p>` joined with single spaces.
pub fn extract_structure(html: &str) -> PageStructure {
    if html.trim().is_empty() {
        return PageStructure::default();
    }
    let doc = Html::parse_document(html);
    PageStructure {
        body_text: texts_of(&doc, "p").join(" "),
        h2: texts_of(&doc, "h2"),
        h3: texts_of(&doc, "h3"),
    }
}

/// Blog id for a Naver blog post URL (`https://blog.naver.com/<id>/<post>`).
pub fn naver_blog_id(post_url: &str) -> Option<String> {
    let parsed = Url::parse(post_url).ok()?;
    if !parsed.host_str()?.contains(NAVER_BLOG_HOST) {
        return None;
    }
    let id = parsed.path_segments()?.find(|s| !s.is_empty())?;
    Some(id.to_string())
}

pub fn blog_home_url(blog_id: &str) -> String {
    format!("{}/{}", NAVER_BLOG_ROOT, blog_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLink {
    pub title: String,
    pub url: String,
}

/// Anchors that look like posts of `blog_id`, in document order.
pub fn extract_post_links(html: &str, blog_id: &str, max_count: usize) -> Vec<PostLink> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let own_path = format!("/{}/", blog_id);

    let mut posts = Vec::new();
    for anchor in doc.select(&anchors) {
        if posts.len() >= max_count {
            break;
        }
        let Some(href) = anchor.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        if !(href.contains("/PostView.naver") || href.contains(&own_path)) {
            continue;
        }
        let title = element_text(anchor);
        if title.chars().count() <= 5 {
            continue;
        }
        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", NAVER_BLOG_ROOT, href)
        };
        posts.push(PostLink {
            title: title.chars().take(MAX_LINK_TITLE_CHARS).collect(),
            url,
        });
    }
    posts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostListOrder {
    Recent,
    Popular,
}

pub fn post_list_url(blog_id: &str, order: PostListOrder) -> String {
    let base = format!("{}/PostList.naver?blogId={}&currentPage=1", NAVER_BLOG_ROOT, blog_id);
    match order {
        PostListOrder::Recent => base,
        PostListOrder::Popular => format!("{}&orderBy=sim", base),
    }
}

/// Up to `max_count` post links from one of the blog's post lists; empty on any failure.
pub async fn crawl_post_list(
    fetcher: &dyn PageFetcher,
    blog_id: &str,
    order: PostListOrder,
    max_count: usize,
    timeout: Duration,
) -> Vec<PostLink> {
    let html = fetcher.fetch(&post_list_url(blog_id, order), timeout).await;
    if html.is_empty() {
        return Vec::new();
    }
    let posts = extract_post_links(&html, blog_id, max_count);
    debug!(blog_id, ?order, count = posts.len(), "post list crawled");
    posts
}
