//! Request body and header parsers.
//!
//! Every parser turns a request into [`DataObject`]s: at most one object
//! carrying categories, attributes, links and actions, followed by one
//! location-only object per referenced location.

use crate::error::{HeaderError, ParserError};
use crate::header::{WebHeader, parse_attribute, parse_value, split_quoted};
use axum::http::HeaderMap;
use occi_core::{
    ActionRepr, Attribute, AttributeValue, Category, CategoryClass, CategoryRef, DataObject, LinkRepr,
    UrlTranslator, split_id,
};
use occi_domain::constants::headers::{ATTRIBUTE, CATEGORY, LINK, LOCATION};
use std::fmt::Debug;

pub trait Parser: Debug + Send + Sync {
    /// # Errors
    /// [`ParserError`] for anything the format does not accept.
    fn parse(
        &self,
        headers: &HeaderMap,
        body: &str,
        translator: &UrlTranslator,
    ) -> Result<Vec<DataObject>, ParserError>;
}

/// `text/occi`: everything travels in HTTP headers, the body is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderParser;

impl Parser for HeaderParser {
    fn parse(
        &self,
        headers: &HeaderMap,
        _body: &str,
        translator: &UrlTranslator,
    ) -> Result<Vec<DataObject>, ParserError> {
        let mut lines = Vec::new();
        for name in [CATEGORY, LINK, ATTRIBUTE, LOCATION] {
            for value in headers.get_all(name) {
                let value = value.to_str().map_err(|_| HeaderError::invalid(name, "non-ASCII value"))?;
                lines.push((name, value));
            }
        }
        parse_lines(lines, translator)
    }
}

/// `text/plain`: the same headers written as `Name: value` body lines.
///
/// Lines starting with whitespace continue the previous line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPlainParser;

impl Parser for TextPlainParser {
    fn parse(
        &self,
        _headers: &HeaderMap,
        body: &str,
        translator: &UrlTranslator,
    ) -> Result<Vec<DataObject>, ParserError> {
        let lines = unfold(body);
        let mut pairs = Vec::with_capacity(lines.len());
        for line in &lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| HeaderError::invalid("text/plain", format!("\"{line}\": expected Name: value")))?;
            pairs.push((name.trim(), value.trim()));
        }
        parse_lines(pairs, translator)
    }
}

/// `text/uri-list`: one location per line, `#` starts a comment line.
#[derive(Debug, Default, Clone, Copy)]
pub struct UriListParser;

impl Parser for UriListParser {
    fn parse(
        &self,
        _headers: &HeaderMap,
        body: &str,
        _translator: &UrlTranslator,
    ) -> Result<Vec<DataObject>, ParserError> {
        Ok(body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(DataObject::with_location)
            .collect())
    }
}

/// Joins continuation lines and drops blank ones.
pub(crate) fn unfold(body: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in body.lines() {
        if line.starts_with([' ', '\t'])
            && let Some(last) = lines.last_mut()
        {
            last.push(' ');
            last.push_str(line.trim());
            continue;
        }
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_owned());
        }
    }
    lines
}

fn parse_lines<'a>(
    lines: impl IntoIterator<Item = (&'a str, &'a str)>,
    translator: &UrlTranslator,
) -> Result<Vec<DataObject>, ParserError> {
    let mut object = DataObject::default();
    let mut locations = Vec::new();

    for (name, value) in lines {
        if name.eq_ignore_ascii_case(CATEGORY) {
            for item in split_quoted(value, ',')? {
                object.categories.push(parse_category(item, translator)?);
            }
        } else if name.eq_ignore_ascii_case(LINK) {
            for item in split_quoted(value, ',')? {
                match parse_link(item)? {
                    ParsedLink::Link(link) => object.links.push(link),
                    ParsedLink::Action(action) => object.actions.push(action),
                }
            }
        } else if name.eq_ignore_ascii_case(ATTRIBUTE) {
            for item in split_quoted(value, ',')? {
                object.attributes.push(parse_attribute(ATTRIBUTE, item)?);
            }
        } else if name.eq_ignore_ascii_case(LOCATION) {
            for item in split_quoted(value, ',')? {
                locations.push(DataObject::with_location(item));
            }
        }
    }

    let mut objects = Vec::with_capacity(locations.len() + 1);
    if object != DataObject::default() {
        objects.push(object);
    }
    objects.extend(locations);
    Ok(objects)
}

/// `term; scheme="..."; class="kind"` plus the discovery parameters
/// `title`, `rel`, `location`, `attributes` and `actions`.
///
/// Without a class, a category naming a location is a Mixin and anything
/// else an action category.
fn parse_category(value: &str, translator: &UrlTranslator) -> Result<CategoryRef, ParserError> {
    let header = WebHeader::parse(CATEGORY, value)?;
    let term = header.value.as_str();
    let scheme = header
        .get("scheme")
        .ok_or_else(|| HeaderError::invalid(CATEGORY, format!("\"{term}\": missing scheme")))?;
    let location = header.get("location");
    let class = match header.get("class") {
        Some(class) => class
            .parse::<CategoryClass>()
            .map_err(|_| HeaderError::invalid(CATEGORY, format!("\"{class}\": unknown class")))?,
        None if location.is_some() => CategoryClass::Mixin,
        None => CategoryClass::Action,
    };

    let mut builder = Category::builder(class, term, scheme);
    if let Some(title) = header.get("title") {
        builder = builder.title(title);
    }
    if let Some(rel) = header.get("rel").and_then(|rel| rel.split_whitespace().next()) {
        builder = builder.related(&stub(class, rel)?);
    }
    if let Some(location) = location {
        builder = builder.location(translator.to_id(location));
    }
    if let Some(attributes) = header.get("attributes") {
        builder = builder.attributes(attributes.split_whitespace().map(Attribute::from_discovery_name));
    }
    if let Some(actions) = header.get("actions") {
        let actions = actions
            .split_whitespace()
            .map(|id| stub(CategoryClass::Action, id))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.actions(&actions);
    }
    Ok(builder.build()?)
}

enum ParsedLink {
    Link(LinkRepr),
    Action(ActionRepr),
}

/// `<target>; rel="..."; self="..."; category="..."; title="..."; name=value...`
///
/// Targets carrying an `?action=` query describe actions instead of links.
fn parse_link(value: &str) -> Result<ParsedLink, ParserError> {
    let header = WebHeader::parse(LINK, value)?;
    let target = header
        .value
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .map(str::trim)
        .ok_or_else(|| HeaderError::invalid(LINK, format!("\"{}\": expected <target>", header.value)))?;
    let title = header.get("title").map(str::to_owned);
    let rel = header.get("rel").unwrap_or_default();

    if target.contains("?action=") {
        let id = rel
            .split_whitespace()
            .next()
            .ok_or_else(|| HeaderError::invalid(LINK, format!("\"{target}\": action link without rel")))?;
        return Ok(ParsedLink::Action(ActionRepr {
            location: target.to_owned(),
            category: stub(CategoryClass::Action, id)?,
            title,
        }));
    }

    let target_categories =
        rel.split_whitespace().map(|id| stub(CategoryClass::Kind, id)).collect::<Result<Vec<_>, _>>()?;
    let link_categories = header
        .get("category")
        .unwrap_or_default()
        .split_whitespace()
        .map(|id| stub(CategoryClass::Kind, id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut link_attributes = Vec::new();
    for param in &header.params {
        if ["rel", "self", "category", "title"].iter().any(|p| param.name.eq_ignore_ascii_case(p)) {
            continue;
        }
        let value =
            if param.quoted { AttributeValue::String(param.value.clone()) } else { parse_value(&param.value)? };
        link_attributes.push((param.name.clone(), value));
    }

    Ok(ParsedLink::Link(LinkRepr {
        target_location: Some(target.to_owned()),
        target_title: title,
        target_categories,
        link_location: header.get("self").map(str::to_owned),
        link_categories,
        link_attributes,
    }))
}

/// A reference to a category by identifier; resolved against the registry later.
fn stub(class: CategoryClass, id: &str) -> Result<CategoryRef, ParserError> {
    let (scheme, term) =
        split_id(id).ok_or_else(|| HeaderError::invalid(CATEGORY, format!("\"{id}\": not a category identifier")))?;
    Ok(Category::builder(class, term, scheme).build()?)
}
