//! Tag-level metadata rewriting.
//!
//! # Responsibilities
//! - `<title>`: replace text with the page title
//! - `<meta name|property>`: overwrite `content` for known SEO/social keys
//! - `<meta itemprop>`: overwrite `content` for name/description/image
//! - `<meta name="robots">`: force `index, follow`
//! - `<head>`: append a JSON-LD script block
//!
//! # Design Decisions
//! - Single left-to-right pass; no state kept between elements
//! - Rewriting is not idempotent on `<head>`: a second pass appends a second JSON-LD block

use lol_html::{element, HtmlRewriter, OutputSink, Settings};
use lol_html::errors::RewritingError;

use crate::config::schema::ContentKind;
use crate::metadata::types::Metadata;
use crate::rewrite::element::ElementView;
use crate::rewrite::structured_data::{script_block, structured_data};

/// Value forced onto `<meta name="robots">`.
pub const ROBOTS_CONTENT: &str = "index, follow";

/// Value written to `<meta name="twitter:card">`.
pub const TWITTER_CARD: &str = "summary_large_image";

/// `name` / `property` values of the meta tags the rewriter owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKey {
    Title,
    Description,
    Keywords,
    Image,
    OgTitle,
    OgDescription,
    OgImage,
    OgSiteName,
    OgType,
    TwitterTitle,
    TwitterDescription,
    TwitterImage,
    TwitterCard,
}

impl MetaKey {
    pub fn parse(name: &str) -> Option<Self> {
        let key = match name {
            "title" => MetaKey::Title,
            "description" => MetaKey::Description,
            "keywords" => MetaKey::Keywords,
            "image" => MetaKey::Image,
            "og:title" => MetaKey::OgTitle,
            "og:description" => MetaKey::OgDescription,
            "og:image" => MetaKey::OgImage,
            "og:site_name" => MetaKey::OgSiteName,
            "og:type" => MetaKey::OgType,
            "twitter:title" => MetaKey::TwitterTitle,
            "twitter:description" => MetaKey::TwitterDescription,
            "twitter:image" => MetaKey::TwitterImage,
            "twitter:card" => MetaKey::TwitterCard,
            _ => return None,
        };
        Some(key)
    }
}

/// `itemprop` values the rewriter owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemProp {
    Name,
    Description,
    Image,
}

impl ItemProp {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(ItemProp::Name),
            "description" => Some(ItemProp::Description),
            "image" => Some(ItemProp::Image),
            _ => None,
        }
    }
}

/// Per-response rewrite state. Holds the resolved metadata for one document.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    metadata: Metadata,
    site_name: String,
    page_url: String,
}

impl RewriteContext {
    pub fn new(metadata: Metadata, site_name: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            metadata,
            site_name: site_name.into(),
            page_url: page_url.into(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Content for a meta key.
    pub fn meta_value(&self, key: MetaKey) -> &str {
        let m = &self.metadata;
        match key {
            MetaKey::Title | MetaKey::OgTitle | MetaKey::TwitterTitle => &m.title,
            MetaKey::Description | MetaKey::OgDescription | MetaKey::TwitterDescription => {
                &m.description
            }
            MetaKey::Keywords => &m.keywords,
            MetaKey::Image | MetaKey::OgImage | MetaKey::TwitterImage => &m.image,
            MetaKey::OgSiteName => &self.site_name,
            MetaKey::OgType => match m.kind {
                Some(ContentKind::Article) => "article",
                _ => "website",
            },
            MetaKey::TwitterCard => TWITTER_CARD,
        }
    }

    /// Content for an itemprop.
    pub fn item_prop_value(&self, prop: ItemProp) -> &str {
        match prop {
            ItemProp::Name => &self.metadata.title,
            ItemProp::Description => &self.metadata.description,
            ItemProp::Image => &self.metadata.image,
        }
    }

    /// Dispatch on the tag name.
    pub fn visit(&self, el: &mut impl ElementView) {
        match el.tag().as_str() {
            "title" => self.visit_title(el),
            "meta" => self.visit_meta(el),
            "head" => self.visit_head(el),
            _ => {}
        }
    }

    pub fn visit_title(&self, el: &mut impl ElementView) {
        el.set_inner_text(&self.metadata.title);
    }

    pub fn visit_meta(&self, el: &mut impl ElementView) {
        let name = el.get_attr("name");
        let property = el.get_attr("property");
        let itemprop = el.get_attr("itemprop");

        for key in [name.as_deref(), property.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(MetaKey::parse)
        {
            el.set_attr("content", self.meta_value(key));
        }

        if let Some(prop) = itemprop.as_deref().and_then(ItemProp::parse) {
            el.set_attr("content", self.item_prop_value(prop));
        }

        if name.as_deref() == Some("robots") {
            el.set_attr("content", ROBOTS_CONTENT);
        }
    }

    pub fn visit_head(&self, el: &mut impl ElementView) {
        let data = structured_data(&self.metadata, &self.page_url);
        el.append_html(&script_block(&data));
    }
}

/// Build a streaming rewriter that applies `ctx` and writes to `sink`.
pub fn html_rewriter<'h, O: OutputSink>(ctx: &'h RewriteContext, sink: O) -> HtmlRewriter<'h, O> {
    HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("title", move |el| {
                    ctx.visit_title(el);
                    Ok(())
                }),
                element!("meta", move |el| {
                    ctx.visit_meta(el);
                    Ok(())
                }),
                element!("head", move |el| {
                    ctx.visit_head(el);
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        sink,
    )
}

/// Rewrite a complete in-memory document.
pub fn rewrite_document(ctx: &RewriteContext, html: &[u8]) -> Result<Vec<u8>, RewritingError> {
    let mut output = Vec::new();
    let mut rewriter = html_rewriter(ctx, |chunk: &[u8]| output.extend_from_slice(chunk));
    rewriter.write(html)?;
    rewriter.end()?;
    Ok(output)
}
