//! Static page rendering
//!
//! [`ArtifactBuilder::build`] turns a [`Document`] into one self-contained
//! HTML page: inline styles, an inline loader script, and no runtime
//! dependency beyond the icon stylesheet and the media the page embeds.
//!
//! Rendering is a pure function of the document. Equal documents produce
//! byte-identical pages, which keeps content ids stable across republishes.

use tracing::debug;

use crate::artifact::Artifact;
use crate::document::{Background, Document, Item, ItemContent, MAX_SPAN, MIN_SPAN};
use crate::embed::EmbedKind;
use crate::error::ArtifactResult;

const STYLES: &str = "@import url('https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css'); \
* { margin: 0; padding: 0; box-sizing: border-box; } \
body { font-family: system-ui, -apple-system, sans-serif; min-height: 100vh; padding: 2rem; position: relative; } \
.background-container { position: fixed; top: 0; left: 0; right: 0; bottom: 0; z-index: 0; overflow: hidden; } \
.background-container > div { width: 100% !important; height: 100% !important; } \
.container { position: relative; z-index: 10; max-width: 64rem; margin: 0 auto; background: white; border-radius: 0.75rem; box-shadow: 0 10px 15px -3px rgb(0 0 0 / 0.1); padding: 2rem; } \
.profile-header { display: flex; align-items: center; gap: 2rem; margin-bottom: 2rem; } \
.avatar-container { position: relative; width: 8rem; height: 8rem; flex-shrink: 0; } \
.avatar { width: 100%; height: 100%; border-radius: 9999px; background: #f4f4f5; background-position: center; background-size: cover; } \
.profile-info { flex-grow: 1; } \
.profile-name { font-size: 1.875rem; font-weight: 700; margin-bottom: 0.5rem; color: black; } \
.profile-bio { color: #4b5563; line-height: 1.5; } \
.grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; margin-bottom: 2rem; } \
.item { position: relative; height: 100%; padding: 1rem; display: flex; flex-direction: column; align-items: center; justify-content: center; text-align: center; min-height: 150px; transition: all 0.2s ease; } \
.item:hover { transform: translateY(-2px); box-shadow: 0 4px 6px -1px rgb(0 0 0 / 0.1); } \
.item.loading, .loading { animation: pulse 2s cubic-bezier(0.4, 0, 0.6, 1) infinite; } \
@keyframes pulse { 0%, 100% { opacity: 1; } 50% { opacity: .7; } } \
.social-link { width: 100%; height: 100%; display: flex; flex-direction: column; align-items: center; justify-content: center; text-decoration: none; color: inherit; } \
.platform-icon { font-size: 1.5rem; margin-bottom: 0.5rem; } \
.platform-name { font-weight: 600; margin: 0.5rem 0; } \
.username { font-size: 0.875rem; opacity: 0.8; } \
.follow-button { margin-top: 0.5rem; padding: 0.5rem 1rem; border-radius: 0.375rem; border: none; color: white; cursor: pointer; font-weight: 500; } \
.embed-placeholder { width: 100%; height: 100%; display: flex; align-items: center; justify-content: center; color: #6b7280; background-size: cover; background-position: center; border-radius: 0.5rem; min-height: 200px; text-decoration: none; } \
.embed-frame { width: 100%; height: 100%; min-height: 200px; border: 0; border-radius: 0.5rem; }";

const LOADER_SCRIPT: &str = "window.addEventListener('load', () => { \
const loadImage = (url, el) => { if (!url) return; const img = new Image(); \
img.onload = () => { el.style.backgroundImage = `url(${url})`; el.classList.remove('loading'); }; img.src = url; }; \
document.querySelectorAll('[data-image]').forEach(el => loadImage(el.dataset.image, el)); \
const bg = document.body.dataset.background; if (bg) { loadImage(bg, document.body); } });";

/// Renders documents into publishable artifacts
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactBuilder;

impl ArtifactBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render a typed document
    pub fn build(&self, document: &Document) -> Artifact {
        let html = render_page(document);
        let artifact = Artifact::html(html);
        debug!(
            items = document.items.len(),
            bytes = artifact.len(),
            digest = %artifact.short_digest(),
            "Built artifact"
        );
        artifact
    }

    /// Parse an editor snapshot and render it
    ///
    /// Fails on the first unsupported or malformed item; nothing is
    /// skipped.
    pub fn build_snapshot(&self, snapshot: &str) -> ArtifactResult<Artifact> {
        let document = Document::from_json(snapshot)?;
        Ok(self.build(&document))
    }
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Icon class for a social platform
pub fn social_icon_class(platform: &str) -> &'static str {
    match platform {
        "Twitter" => "fab fa-twitter",
        "Instagram" => "fab fa-instagram",
        "LinkedIn" => "fab fa-linkedin",
        "GitHub" => "fab fa-github",
        "YouTube" => "fab fa-youtube",
        "Dribbble" => "fab fa-dribbble",
        "Figma" => "fab fa-figma",
        _ => "fas fa-link",
    }
}

fn render_page(document: &Document) -> String {
    let profile = &document.profile;
    let mut html = String::with_capacity(STYLES.len() + 1024 * (document.items.len() + 1));

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!(
        "<title>{}&#39;s Space</title>\n",
        escape_html(&profile.name)
    ));
    html.push_str(&format!(
        "<style>{} body {{ {} }}</style>\n",
        STYLES,
        background_css(&document.background)
    ));
    if matches!(document.background, Background::Embed(_)) {
        html.push_str(
            "<script type=\"text/javascript\" async src=\"https://tenor.com/embed.js\"></script>\n",
        );
    }
    html.push_str("</head>\n");

    match &document.background {
        Background::Image(url) => html.push_str(&format!(
            "<body data-background=\"{}\">\n",
            escape_html(url)
        )),
        _ => html.push_str("<body>\n"),
    }

    // Embed markup is the user's own third-party snippet and goes in as-is
    if let Background::Embed(markup) = &document.background {
        html.push_str("<div class=\"background-container\">\n");
        html.push_str(markup);
        html.push_str("\n</div>\n");
    }

    html.push_str("<div class=\"container\">\n<div class=\"profile-header\">\n");
    html.push_str(&format!(
        "<div class=\"avatar-container\"><div class=\"avatar loading\" data-image=\"{}\"></div></div>\n",
        escape_html(&profile.avatar_url)
    ));
    html.push_str(&format!(
        "<div class=\"profile-info\"><h1 class=\"profile-name\">{}</h1><p class=\"profile-bio\">{}</p></div>\n",
        escape_html(&profile.name),
        escape_html(&profile.bio)
    ));
    html.push_str("</div>\n<div class=\"grid\">\n");

    for item in &document.items {
        html.push_str(&render_item(item));
    }

    html.push_str("</div>\n</div>\n");
    html.push_str(&format!("<script>{}</script>\n", LOADER_SCRIPT));
    html.push_str("</body>\n</html>\n");
    html
}

fn background_css(background: &Background) -> String {
    match background {
        Background::Color(color) => format!("background-color: {};", css_value(color)),
        Background::Image(_) => "background-size: cover; background-position: center;".into(),
        Background::Embed(_) => "background-color: transparent;".into(),
    }
}

/// Strip characters that could end a CSS declaration or the style element
fn css_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\''))
        .collect()
}

fn render_item(item: &Item) -> String {
    let style = &item.style;
    let item_style = format!(
        "background-color: {}; color: {}; grid-column: span {}; grid-row: span {}; border-radius: {};",
        css_value(&style.bg_color),
        css_value(&style.text_color),
        style.width.clamp(MIN_SPAN, MAX_SPAN),
        style.height.clamp(MIN_SPAN, MAX_SPAN),
        style.shape.border_radius()
    );

    let content = match &item.content {
        ItemContent::Social {
            platform,
            username,
            url,
        } => format!(
            "<a href=\"{url}\" class=\"social-link\" target=\"_blank\" rel=\"noopener\">\
<i class=\"{icon} platform-icon\"></i>\
<h3 class=\"platform-name\">{platform}</h3>\
<p class=\"username\">{username}</p>\
<button class=\"follow-button\" style=\"background-color: {button}\">Follow</button></a>",
            url = escape_html(url),
            icon = social_icon_class(platform),
            platform = escape_html(platform),
            username = escape_html(username),
            button = css_value(&style.text_color),
        ),
        ItemContent::Image { url } => format!(
            "<a href=\"{url}\" class=\"embed-placeholder loading\" data-image=\"{url}\" target=\"_blank\" rel=\"noopener\"></a>",
            url = escape_html(url),
        ),
        ItemContent::Embed { url } => render_embed(url),
        ItemContent::Text { text } => format!(
            "<p style=\"color: {}\">{}</p>",
            css_value(&style.text_color),
            escape_html(text)
        ),
    };

    format!(
        "<div class=\"item\" data-item=\"{}\" style=\"{}\">{}</div>\n",
        escape_html(&item.id),
        item_style,
        content
    )
}

fn render_embed(url: &str) -> String {
    let kind = EmbedKind::classify(url);
    match (&kind, kind.iframe_src()) {
        (EmbedKind::YouTube { .. }, Some(src)) => format!(
            "<iframe src=\"{}\" class=\"embed-frame\" \
allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" \
allowfullscreen></iframe>",
            escape_html(&src)
        ),
        (EmbedKind::Tenor { post_id }, Some(src)) => format!(
            "<div class=\"tenor-gif-embed\" data-postid=\"{}\" data-share-method=\"host\">\
<iframe src=\"{}\" class=\"embed-frame\" frameborder=\"0\" allowfullscreen></iframe></div>",
            escape_html(post_id),
            escape_html(&src)
        ),
        _ => format!(
            "<a href=\"{}\" class=\"embed-placeholder\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape_html(url),
            escape_html(url)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ItemStyle, Shape};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_icon_classes() {
        assert_eq!(social_icon_class("GitHub"), "fab fa-github");
        assert_eq!(social_icon_class("github"), "fas fa-link");
        assert_eq!(social_icon_class("Mastodon"), "fas fa-link");
    }

    #[test]
    fn test_title_and_header() {
        let artifact = ArtifactBuilder::new().build(&Document::starter("John Doe"));
        let html = artifact.as_str().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>John Doe&#39;s Space</title>"));
        assert!(html.contains("<h1 class=\"profile-name\">John Doe</h1>"));
        assert!(html.contains("fab fa-twitter"));
        assert!(html.contains("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&amp;mute=1&amp;enablejsapi=1"));
        assert!(html.contains("Welcome to my linkspace profile!"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut doc = Document::starter("<script>");
        doc.items.push(Item::new(
            "x",
            ItemContent::Text {
                text: "<img src=x onerror=alert(1)>".into(),
            },
        ));
        let artifact = ArtifactBuilder::new().build(&doc);
        let html = artifact.as_str().unwrap();
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;script&gt;&#39;s Space"));
    }

    #[test]
    fn test_item_style() {
        let item = Item::new("s", ItemContent::Text { text: "t".into() }).with_style(
            ItemStyle::default()
                .with_colors("#111", "red; } body {")
                .with_span(3, 2)
                .with_shape(Shape::Circle),
        );
        let html = render_item(&item);
        assert!(html.contains("grid-column: span 3; grid-row: span 2; border-radius: 50%;"));
        assert!(html.contains("color: red  body ;"));
    }

    #[test]
    fn test_backgrounds() {
        let mut doc = Document::starter("A");
        doc.background = Background::Embed("<div class=\"tenor-gif-embed\"></div>".into());
        let html = render_page(&doc);
        assert!(html.contains("<div class=\"background-container\">\n<div class=\"tenor-gif-embed\"></div>"));
        assert!(html.contains("https://tenor.com/embed.js"));

        doc.background = Background::Image("https://img/bg.png".into());
        let html = render_page(&doc);
        assert!(html.contains("<body data-background=\"https://img/bg.png\">"));
        assert!(!html.contains("tenor.com/embed.js"));
    }

    #[test]
    fn test_unknown_embed_is_placeholder() {
        let html = render_embed("https://vimeo.com/1");
        assert!(html.contains("embed-placeholder"));
        assert!(!html.contains("<iframe"));
    }
}
