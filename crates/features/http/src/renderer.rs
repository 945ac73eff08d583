//! Response renderers.

use crate::error::RendererError;
use crate::header::{WebHeader, render_attribute};
use occi_core::{
    ActionRepr, AttributeValue, Category, CategoryRef, DataObject, LinkRepr, RenderFlags, UrlTranslator,
};
use occi_domain::constants::headers::{ATTRIBUTE, CATEGORY, LINK, LOCATION};
use occi_domain::constants::media;
use std::fmt::Debug;

/// Line terminator of the `text/plain` and `text/uri-list` bodies.
const CRLF: &str = "\r\n";

/// What a handler hands over for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Single(DataObject),
    List(Vec<DataObject>),
}

/// A rendered response, before it becomes an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_type: &'static str,
    /// Emitted in order, after `Content-Type`.
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Rendered {
    fn body(content_type: &'static str, body: String) -> Self {
        Self { content_type, headers: Vec::new(), body }
    }
}

pub trait Renderer: Debug + Send + Sync {
    fn content_type(&self) -> &'static str;

    /// # Errors
    /// [`RendererError`] when the payload cannot be serialized.
    fn render(&self, payload: &Payload, translator: &UrlTranslator) -> Result<Rendered, RendererError>;
}

/// `text/occi`: categories, links and attributes as HTTP headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderRenderer;

impl Renderer for HeaderRenderer {
    fn content_type(&self) -> &'static str {
        media::TEXT_OCCI
    }

    fn render(&self, payload: &Payload, translator: &UrlTranslator) -> Result<Rendered, RendererError> {
        let headers = header_lines(payload, translator);
        Ok(Rendered { content_type: self.content_type(), headers, body: String::new() })
    }
}

/// `text/plain`: the `text/occi` headers written as body lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPlainRenderer;

impl Renderer for TextPlainRenderer {
    fn content_type(&self) -> &'static str {
        media::TEXT_PLAIN
    }

    fn render(&self, payload: &Payload, translator: &UrlTranslator) -> Result<Rendered, RendererError> {
        let body = header_lines(payload, translator).into_iter().fold(String::new(), |mut body, (name, value)| {
            body.push_str(name);
            body.push_str(": ");
            body.push_str(&value);
            body.push_str(CRLF);
            body
        });
        Ok(Rendered::body(self.content_type(), body))
    }
}

/// `text/uri-list`: one location per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct UriListRenderer;

impl Renderer for UriListRenderer {
    fn content_type(&self) -> &'static str {
        media::TEXT_URI_LIST
    }

    fn render(&self, payload: &Payload, _translator: &UrlTranslator) -> Result<Rendered, RendererError> {
        let objects = match payload {
            Payload::Single(object) => std::slice::from_ref(object),
            Payload::List(objects) => objects.as_slice(),
        };
        let body = objects.iter().filter_map(|o| o.location.as_deref()).fold(String::new(), |mut body, location| {
            body.push_str(location);
            body.push_str(CRLF);
            body
        });
        Ok(Rendered::body(self.content_type(), body))
    }
}

/// Fallback for `*/*`, `text/*` and requests without `Accept`: plain text
/// for a single object, a URI list for collections.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        media::TEXT_PLAIN
    }

    fn render(&self, payload: &Payload, translator: &UrlTranslator) -> Result<Rendered, RendererError> {
        match payload {
            Payload::Single(_) => TextPlainRenderer.render(payload, translator),
            Payload::List(_) => UriListRenderer.render(payload, translator),
        }
    }
}

/// Header lines for a payload: a single object's categories, links, action
/// links and attributes, or one location line per listed object.
fn header_lines(payload: &Payload, translator: &UrlTranslator) -> Vec<(&'static str, String)> {
    let object = match payload {
        Payload::List(objects) => {
            return objects.iter().filter_map(|o| o.location.clone()).map(|l| (LOCATION, l)).collect();
        },
        Payload::Single(object) => object,
    };

    let discovery = object.render_flags.contains(RenderFlags::CATEGORY_DISCOVERY);
    let mut lines = Vec::new();
    lines.extend(object.categories.iter().map(|c| (CATEGORY, render_category(c, discovery, translator))));
    lines.extend(object.links.iter().map(|l| (LINK, render_link(l))));
    lines.extend(object.actions.iter().map(|a| (LINK, render_action(a))));
    lines.extend(object.attributes.iter().map(|(name, value)| (ATTRIBUTE, render_attribute(name, value))));
    if !object.render_flags.contains(RenderFlags::RESOURCE_INSTANCE)
        && let Some(location) = &object.location
    {
        lines.push((LOCATION, location.clone()));
    }
    lines
}

/// `term; scheme="..."; class="..."`, plus the discovery parameters when
/// `discovery` is set.
pub(crate) fn render_category(category: &Category, discovery: bool, translator: &UrlTranslator) -> String {
    let mut header = WebHeader::new(category.term())
        .param("scheme", category.scheme())
        .param("class", category.class().as_ref());
    if !discovery {
        return header.render();
    }

    if let Some(title) = category.title() {
        header = header.param("title", title);
    }
    if let Some(related) = category.related() {
        header = header.param("rel", related.id());
    }
    if let Some(location) = category.location() {
        header = header.param("location", translator.url_build(location, false));
    }
    if !category.unique_attributes().is_empty() {
        let names: Vec<String> = category.unique_attributes().iter().map(|a| a.discovery_name()).collect();
        header = header.param("attributes", names.join(" "));
    }
    if !category.actions().is_empty() {
        let ids: Vec<&str> = category.actions().iter().map(|a| a.id()).collect();
        header = header.param("actions", ids.join(" "));
    }
    header.render()
}

fn render_link(link: &LinkRepr) -> String {
    let mut header = WebHeader::new(format!("<{}>", link.target_location.as_deref().unwrap_or_default()));
    if !link.target_categories.is_empty() {
        header = header.param("rel", join_ids(&link.target_categories));
    }
    if let Some(title) = &link.target_title {
        header = header.param("title", title);
    }
    if let Some(location) = &link.link_location {
        header = header.param("self", location);
    }
    if !link.link_categories.is_empty() {
        header = header.param("category", join_ids(&link.link_categories));
    }
    for (name, value) in &link.link_attributes {
        header = match value {
            AttributeValue::String(s) => header.param(name, s),
            other => header.token(name, other.to_string()),
        };
    }
    header.render()
}

fn render_action(action: &ActionRepr) -> String {
    let mut header = WebHeader::new(format!("<{}>", action.location)).param("rel", action.category.id());
    if let Some(title) = &action.title {
        header = header.param("title", title);
    }
    header.render()
}

fn join_ids(categories: &[CategoryRef]) -> String {
    categories.iter().map(|c| c.id()).collect::<Vec<_>>().join(" ")
}
