//! Server-rendered chat page.
//!
//! The page carries the whole conversation in a hidden `chat-history` field,
//! so the form action is stateless. Templates and the stylesheet are compiled
//! into the binary with `include_str!` and rendered through Tera with HTML
//! autoescaping. Assistant replies are rendered as Markdown.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

use parley_core::{Conversation, Role, Turn};

use crate::SharedState;

const INDEX_HTML: &str = include_str!("../../../frontend/index.html");
const ERROR_HTML: &str = include_str!("../../../frontend/error.html");
const STYLE_CSS: &str = include_str!("../../../frontend/style.css");

/// The compiled page templates.
pub struct Pages {
    tera: Tera,
}

#[derive(Serialize)]
struct TurnView<'a> {
    role: &'static str,
    content: &'a str,
    error: bool,
    /// Pre-rendered Markdown for assistant replies
    html: Option<String>,
}

#[derive(Serialize)]
struct PageView<'a> {
    turns: Vec<TurnView<'a>>,
    snapshot: String,
}

#[derive(Serialize)]
struct ErrorView<'a> {
    detail: &'a str,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![("index.html", INDEX_HTML), ("error.html", ERROR_HTML)])?;
        Ok(Self { tera })
    }

    /// Render the chat page for a conversation.
    pub fn chat(&self, conversation: &Conversation) -> Result<String, tera::Error> {
        let view = PageView {
            turns: conversation.iter().map(turn_view).collect(),
            snapshot: conversation.to_snapshot(),
        };
        self.tera
            .render("index.html", &Context::from_serialize(&view)?)
    }

    /// Render the error page shown when a form action cannot be processed.
    pub fn error(&self, detail: &str) -> Result<String, tera::Error> {
        self.tera
            .render("error.html", &Context::from_serialize(ErrorView { detail })?)
    }
}

fn turn_view(turn: &Turn) -> TurnView<'_> {
    let html = (turn.role() == Role::Assistant && !turn.is_error())
        .then(|| render_markdown(turn.content()));
    TurnView {
        role: turn.role().as_str(),
        content: turn.content(),
        error: turn.is_error(),
        html,
    }
}

/// Render Markdown to HTML. Raw HTML in the source is emitted as text and
/// script-capable link targets are dropped.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut out, parser);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|s| scheme.starts_with(s))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Turn a render result into a response, logging template failures.
pub(crate) fn page_response(status: StatusCode, rendered: Result<String, tera::Error>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Oops, something went wrong!").into_response()
        }
    }
}

pub(crate) async fn index_handler(State(state): State<SharedState>) -> Response {
    page_response(StatusCode::OK, state.pages.chat(&Conversation::new()))
}

pub(crate) async fn css_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_router;
    use crate::test_support::{MockProvider, test_state};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn pages() -> Pages {
        Pages::new().unwrap()
    }

    #[tokio::test]
    async fn serves_index_html() {
        let app = build_router(test_state(MockProvider::replying("unused")));

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("<!DOCTYPE html>"));
        assert!(text.contains("Ask anything"));
        assert!(text.contains("name=\"chat-history\" value=\"[]\""));
    }

    #[tokio::test]
    async fn serves_css() {
        let app = build_router(test_state(MockProvider::replying("unused")));

        let req = Request::builder()
            .uri("/static/style.css")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let ct = response.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(ct.contains("text/css"));
    }

    #[test]
    fn page_lists_turns_in_order_with_roles() {
        let conversation = Conversation::from(vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::error("rate limited"),
        ]);
        let page = pages().chat(&conversation).unwrap();

        assert!(!page.contains("Ask anything"));
        let first = page.find("message user\">first").unwrap();
        let second = page.find("message assistant\"><p>second</p>").unwrap();
        let third = page.find("message assistant error\">rate limited").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn page_escapes_content_and_snapshot() {
        let conversation = Conversation::from(vec![Turn::user("<script>\"x\"</script>")]);
        let page = pages().chat(&conversation).unwrap();

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;&quot;x&quot;&lt;"));
        // Snapshot attribute stays a single quoted value.
        assert!(page.contains("value=\"[{&quot;role&quot;:&quot;user&quot;"));
    }

    #[test]
    fn assistant_markdown_is_rendered() {
        let conversation = Conversation::from(vec![
            Turn::user("**not bold**"),
            Turn::assistant("**hi**\n\n```\nlet x = 1;\n```"),
        ]);
        let page = pages().chat(&conversation).unwrap();

        assert!(page.contains("<strong>hi</strong>"));
        assert!(page.contains("<pre><code>let x = 1;\n</code></pre>"));
        // User turns stay plain text.
        assert!(page.contains("message user\">**not bold**"));
    }

    #[test]
    fn markdown_escapes_raw_html() {
        let html = render_markdown("Hello <script>alert(1)</script>\n\n<div onclick=\"x\">block</div>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<div"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn markdown_drops_script_links() {
        let html = render_markdown("[click](javascript:alert(1)) [ok](https://example.com)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn error_turns_are_not_markdown() {
        let page = pages()
            .chat(&Conversation::from(vec![Turn::error("*oops*")]))
            .unwrap();
        assert!(page.contains("message assistant error\">*oops*"));
    }

    #[test]
    fn error_page_has_heading_and_link() {
        let page = pages().error("bad <input>").unwrap();
        assert!(page.contains("Oops, something went wrong!"));
        assert!(page.contains("bad &lt;input&gt;"));
        assert!(page.contains("href=\"/\""));
    }
}
