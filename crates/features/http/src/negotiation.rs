//! Content negotiation: picks a parser by `Content-Type` and a renderer by `Accept`.

use crate::error::{ParserError, RendererError};
use crate::json::{JsonParser, JsonRenderer};
use crate::parser::{HeaderParser, Parser, TextPlainParser, UriListParser};
use crate::renderer::{HeaderRenderer, Renderer, TextPlainRenderer, TextRenderer, UriListRenderer};
use occi_domain::constants::media;
use std::sync::Arc;

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub media_type: String,
    pub q: f32,
}

impl MediaRange {
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.media_type.ends_with("/*")
    }
}

/// Parses an `Accept` header, most preferred first.
///
/// Entries keep their order among equal `q` values. A missing or malformed
/// `q` counts as `1`.
#[must_use]
pub fn parse_accept(accept: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = accept
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';').map(str::trim);
            let media_type = parts.next().filter(|m| !m.is_empty())?.to_ascii_lowercase();
            let q = parts
                .filter_map(|p| p.split_once('='))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, value)| value.trim().parse::<f32>().ok())
                .map_or(1.0, |q| q.clamp(0.0, 1.0));
            Some(MediaRange { media_type, q })
        })
        .collect();
    ranges.sort_by(|a, b| b.q.total_cmp(&a.q));
    ranges
}

/// Media type of a `Content-Type` value, without parameters.
fn essence(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// The parser and renderer tables of a server.
#[derive(Debug, Clone)]
pub struct Codecs {
    parsers: Vec<(&'static str, Arc<dyn Parser>)>,
    default_parser: Arc<dyn Parser>,
    renderers: Vec<(&'static str, Arc<dyn Renderer>)>,
    default_renderer: Arc<dyn Renderer>,
}

impl Default for Codecs {
    fn default() -> Self {
        Self::new(Arc::new(HeaderParser), Arc::new(TextRenderer))
            .parser(media::TEXT_OCCI, Arc::new(HeaderParser))
            .parser(media::TEXT_PLAIN, Arc::new(TextPlainParser))
            .parser(media::TEXT_URI_LIST, Arc::new(UriListParser))
            .parser(media::OCCI_JSON, Arc::new(JsonParser))
            .parser(media::JSON, Arc::new(JsonParser))
            .renderer(media::TEXT_OCCI, Arc::new(HeaderRenderer))
            .renderer(media::TEXT_PLAIN, Arc::new(TextPlainRenderer))
            .renderer(media::TEXT_URI_LIST, Arc::new(UriListRenderer))
            .renderer(media::OCCI_JSON, Arc::new(JsonRenderer::new(media::OCCI_JSON)))
            .renderer(media::JSON, Arc::new(JsonRenderer::new(media::JSON)))
            .renderer(media::ANY, Arc::new(TextRenderer))
            .renderer(media::TEXT_ANY, Arc::new(TextRenderer))
    }
}

impl Codecs {
    /// Empty tables with the codecs used when a request names no media type.
    #[must_use]
    pub fn new(default_parser: Arc<dyn Parser>, default_renderer: Arc<dyn Renderer>) -> Self {
        Self { parsers: Vec::new(), default_parser, renderers: Vec::new(), default_renderer }
    }

    #[must_use]
    pub fn parser(mut self, media_type: &'static str, parser: Arc<dyn Parser>) -> Self {
        self.parsers.push((media_type, parser));
        self
    }

    /// Renderers are matched in declaration order.
    #[must_use]
    pub fn renderer(mut self, media_type: &'static str, renderer: Arc<dyn Renderer>) -> Self {
        self.renderers.push((media_type, renderer));
        self
    }

    /// # Errors
    /// [`ParserError::UnsupportedContentType`] for an unknown media type.
    pub fn select_parser(&self, content_type: Option<&str>) -> Result<&dyn Parser, ParserError> {
        let Some(content_type) = content_type.map(essence).filter(|c| !c.is_empty()) else {
            return Ok(self.default_parser.as_ref());
        };
        self.parsers
            .iter()
            .find(|(media_type, _)| *media_type == content_type)
            .map(|(_, parser)| parser.as_ref())
            .ok_or(ParserError::UnsupportedContentType { content_type })
    }

    /// Exact media types win over wildcards; within each pass the client's
    /// preference order applies. Ranges with `q=0` are never selected.
    ///
    /// # Errors
    /// [`RendererError::NoAcceptableRenderer`] when nothing matches.
    pub fn select_renderer(&self, accept: Option<&str>) -> Result<&dyn Renderer, RendererError> {
        let Some(accept) = accept.filter(|a| !a.trim().is_empty()) else {
            return Ok(self.default_renderer.as_ref());
        };
        let ranges: Vec<MediaRange> = parse_accept(accept).into_iter().filter(|r| r.q > 0.0).collect();

        let exact = ranges.iter().filter(|r| !r.is_wildcard());
        let wildcards = ranges.iter().filter(|r| r.is_wildcard());
        exact
            .chain(wildcards)
            .find_map(|range| self.renderers.iter().find(|(media_type, _)| *media_type == range.media_type))
            .map(|(_, renderer)| renderer.as_ref())
            .ok_or_else(|| RendererError::NoAcceptableRenderer { accept: accept.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_is_sorted_by_quality() {
        let ranges = parse_accept("text/plain;q=0.5, text/occi, application/occi+json;q=0.5, */*;q=0.1");
        let order: Vec<&str> = ranges.iter().map(|r| r.media_type.as_str()).collect();
        assert_eq!(order, vec!["text/occi", "text/plain", "application/occi+json", "*/*"]);
        assert!((ranges[1].q - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn parsers_follow_content_type() {
        let codecs = Codecs::default();
        assert_eq!(format!("{:?}", codecs.select_parser(None).unwrap()), "HeaderParser");
        assert_eq!(format!("{:?}", codecs.select_parser(Some("")).unwrap()), "HeaderParser");
        assert_eq!(
            format!("{:?}", codecs.select_parser(Some("text/plain; charset=utf-8")).unwrap()),
            "TextPlainParser"
        );
        let err = codecs.select_parser(Some("image/png")).unwrap_err();
        assert_eq!(err.status_code(), 415);
    }

    #[test]
    fn renderers_follow_accept() {
        let codecs = Codecs::default();
        let pick = |accept: Option<&str>| codecs.select_renderer(accept).map(|r| r.content_type());

        assert_eq!(pick(None).unwrap(), "text/plain");
        assert_eq!(pick(Some("text/occi")).unwrap(), "text/occi");
        assert_eq!(pick(Some("*/*, text/uri-list")).unwrap(), "text/uri-list");
        assert_eq!(pick(Some("application/json;q=0.2, text/occi;q=0.9")).unwrap(), "text/occi");
        assert_eq!(pick(Some("image/png, text/*")).unwrap(), "text/plain");
        assert_eq!(pick(Some("application/json")).unwrap(), "application/json");

        let err = codecs.select_renderer(Some("image/png, text/occi;q=0")).unwrap_err();
        assert_eq!(err.status_code(), 406);
    }
}
