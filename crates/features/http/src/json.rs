//! `application/occi+json` rendering and parsing.
//!
//! A rendered entity names its Kind in a singular `kind` member; discovery
//! listings use the plural `kinds`, `mixins` and `categories` members and
//! carry full definitions. Collections are wrapped as `{"collection": [...]}`.

use crate::error::{ParserError, RendererError};
use crate::parser::Parser;
use crate::renderer::{Payload, Rendered, Renderer, render_category};
use axum::http::HeaderMap;
use occi_core::{
    ActionRepr, Attribute, AttributeType, AttributeValue, Category, CategoryClass, CategoryRef, DataObject,
    LinkRepr, RenderFlags, UrlTranslator, split_id,
};
use occi_domain::constants::headers::CATEGORY;
use occi_domain::constants::media;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct JsonObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<JsonCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    kinds: Vec<JsonCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    mixins: Vec<JsonCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    categories: Vec<JsonCategory>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<JsonLink>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actions: Vec<JsonAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct JsonCategory {
    term: String,
    scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    related: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<JsonAttribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonAttribute {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default = "mutable_default")]
    mutable: bool,
}

const fn mutable_default() -> bool {
    true
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct JsonLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rel: Vec<String>,
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    category: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    attributes: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonAction {
    href: String,
    category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

#[derive(Serialize)]
struct JsonCollection<'a> {
    collection: &'a [JsonObject],
}

#[derive(Deserialize)]
struct JsonCollectionIn {
    collection: Vec<JsonObject>,
}

/// JSON renderer, announced under its configured media type.
#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    media_type: &'static str,
}

impl JsonRenderer {
    #[must_use]
    pub const fn new(media_type: &'static str) -> Self {
        Self { media_type }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new(media::OCCI_JSON)
    }
}

impl Renderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        self.media_type
    }

    fn render(&self, payload: &Payload, translator: &UrlTranslator) -> Result<Rendered, RendererError> {
        let mut headers = Vec::new();
        let body = match payload {
            Payload::Single(object) => {
                if object.render_flags.contains(RenderFlags::RESOURCE_INSTANCE) {
                    headers.extend(object.categories.iter().map(|c| (CATEGORY, render_category(c, false, translator))));
                }
                serde_json::to_string_pretty(&to_json(object, translator))?
            },
            Payload::List(objects) => {
                let collection: Vec<JsonObject> = objects.iter().map(|o| to_json(o, translator)).collect();
                serde_json::to_string_pretty(&JsonCollection { collection: &collection })?
            },
        };
        Ok(Rendered { content_type: self.media_type, headers, body })
    }
}

/// Accepts a single object or a `{"collection": [...]}` document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(
        &self,
        _headers: &HeaderMap,
        body: &str,
        translator: &UrlTranslator,
    ) -> Result<Vec<DataObject>, ParserError> {
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: Value = serde_json::from_str(body)?;
        let objects = if document.get("collection").is_some() {
            serde_json::from_value::<JsonCollectionIn>(document)?.collection
        } else {
            vec![serde_json::from_value::<JsonObject>(document)?]
        };
        objects.into_iter().map(|o| from_json(o, translator)).collect()
    }
}

// --- Rendering ---

fn to_json(object: &DataObject, translator: &UrlTranslator) -> JsonObject {
    let mut json = JsonObject {
        attributes: object.attributes.iter().map(|(name, value)| (name.clone(), value_to_json(value))).collect(),
        links: object.links.iter().map(link_to_json).collect(),
        actions: object
            .actions
            .iter()
            .map(|a| JsonAction { href: a.location.clone(), category: a.category.id().to_owned(), title: a.title.clone() })
            .collect(),
        location: object.location.clone(),
        ..JsonObject::default()
    };

    if object.render_flags.contains(RenderFlags::CATEGORY_DISCOVERY) {
        for category in &object.categories {
            let definition = definition_to_json(category, translator);
            match category.class() {
                CategoryClass::Kind => json.kinds.push(definition),
                CategoryClass::Mixin => json.mixins.push(definition),
                CategoryClass::Action => json.categories.push(definition),
            }
        }
    } else if object.render_flags.contains(RenderFlags::RESOURCE_INSTANCE) {
        for category in &object.categories {
            if category.is_kind() && json.kind.is_none() {
                json.kind = Some(reference_to_json(category));
            } else {
                json.mixins.push(reference_to_json(category));
            }
        }
    } else {
        json.categories = object.categories.iter().map(|c| reference_to_json(c)).collect();
    }
    json
}

fn reference_to_json(category: &Category) -> JsonCategory {
    JsonCategory {
        term: category.term().to_owned(),
        scheme: category.scheme().to_owned(),
        class: Some(category.class().to_string()),
        ..JsonCategory::default()
    }
}

fn definition_to_json(category: &Category, translator: &UrlTranslator) -> JsonCategory {
    JsonCategory {
        title: category.title().map(str::to_owned),
        related: category.related().map(|r| r.id().to_owned()),
        attributes: category
            .unique_attributes()
            .iter()
            .map(|a| JsonAttribute {
                name: a.name().to_owned(),
                kind: a.kind().to_string(),
                required: a.is_required(),
                mutable: a.is_mutable(),
            })
            .collect(),
        actions: category.actions().iter().map(|a| a.id().to_owned()).collect(),
        location: category.location().map(|l| translator.url_build(l, false)),
        ..reference_to_json(category)
    }
}

fn link_to_json(link: &LinkRepr) -> JsonLink {
    JsonLink {
        target: link.target_location.clone(),
        title: link.target_title.clone(),
        rel: link.target_categories.iter().map(|c| c.id().to_owned()).collect(),
        location: link.link_location.clone(),
        category: link.link_categories.iter().map(|c| c.id().to_owned()).collect(),
        attributes: link.link_attributes.iter().map(|(name, value)| (name.clone(), value_to_json(value))).collect(),
    }
}

fn value_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::String(s) => Value::String(s.clone()),
        AttributeValue::Int(i) => Value::from(*i),
        AttributeValue::Float(f) => Value::from(*f),
        AttributeValue::Bool(b) => Value::Bool(*b),
    }
}

// --- Parsing ---

fn from_json(object: JsonObject, translator: &UrlTranslator) -> Result<DataObject, ParserError> {
    let mut categories = Vec::new();
    for category in object.kind.into_iter().chain(object.kinds) {
        categories.push(category_from_json(category, Some(CategoryClass::Kind), translator)?);
    }
    for category in object.mixins {
        categories.push(category_from_json(category, Some(CategoryClass::Mixin), translator)?);
    }
    for category in object.categories {
        categories.push(category_from_json(category, None, translator)?);
    }

    let links = object.links.into_iter().map(link_from_json).collect::<Result<Vec<_>, _>>()?;
    let actions = object
        .actions
        .into_iter()
        .map(|a| {
            Ok(ActionRepr { category: stub(CategoryClass::Action, &a.category)?, location: a.href, title: a.title })
        })
        .collect::<Result<Vec<_>, ParserError>>()?;

    Ok(DataObject {
        categories,
        attributes: attributes_from_json(object.attributes)?,
        links,
        actions,
        location: object.location,
        render_flags: RenderFlags::empty(),
    })
}

/// `class` overrides the member's own `class`; without either, a category
/// with a location is a Mixin and anything else an action category.
fn category_from_json(
    json: JsonCategory,
    class: Option<CategoryClass>,
    translator: &UrlTranslator,
) -> Result<CategoryRef, ParserError> {
    let class = match (class, json.class.as_deref()) {
        (Some(class), _) => class,
        (None, Some(name)) => name
            .parse()
            .map_err(|_| ParserError::invalid(format!("\"{name}\": unknown category class")))?,
        (None, None) if json.location.is_some() => CategoryClass::Mixin,
        (None, None) => CategoryClass::Action,
    };

    let mut builder = Category::builder(class, json.term, json.scheme);
    if let Some(title) = json.title {
        builder = builder.title(title);
    }
    if let Some(related) = json.related {
        builder = builder.related(&stub(class, &related)?);
    }
    if let Some(location) = json.location {
        builder = builder.location(translator.to_id(&location));
    }
    for attribute in json.attributes {
        let kind = if attribute.kind.is_empty() {
            AttributeType::String
        } else {
            attribute
                .kind
                .parse()
                .map_err(|_| ParserError::invalid(format!("\"{}\": unknown attribute type", attribute.kind)))?
        };
        let mut definition = Attribute::new(attribute.name, kind);
        if attribute.required {
            definition = definition.required();
        }
        if !attribute.mutable {
            definition = definition.immutable();
        }
        builder = builder.attribute(definition);
    }
    let actions =
        json.actions.iter().map(|id| stub(CategoryClass::Action, id)).collect::<Result<Vec<_>, _>>()?;
    Ok(builder.actions(&actions).build()?)
}

fn link_from_json(json: JsonLink) -> Result<LinkRepr, ParserError> {
    Ok(LinkRepr {
        target_categories: json.rel.iter().map(|id| stub(CategoryClass::Kind, id)).collect::<Result<_, _>>()?,
        link_categories: json.category.iter().map(|id| stub(CategoryClass::Kind, id)).collect::<Result<_, _>>()?,
        link_attributes: attributes_from_json(json.attributes)?,
        target_location: json.target,
        target_title: json.title,
        link_location: json.location,
    })
}

fn attributes_from_json(map: Map<String, Value>) -> Result<Vec<(String, AttributeValue)>, ParserError> {
    map.into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => AttributeValue::String(s),
                Value::Bool(b) => AttributeValue::Bool(b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => AttributeValue::Int(i),
                    None => n
                        .as_f64()
                        .map(AttributeValue::Float)
                        .ok_or_else(|| ParserError::invalid(format!("\"{name}\": number out of range")))?,
                },
                _ => return Err(ParserError::invalid(format!("\"{name}\": attribute values must be scalars"))),
            };
            Ok((name, value))
        })
        .collect()
}

fn stub(class: CategoryClass, id: &str) -> Result<CategoryRef, ParserError> {
    let (scheme, term) =
        split_id(id).ok_or_else(|| ParserError::invalid(format!("\"{id}\": not a category identifier")))?;
    Ok(Category::builder(class, term, scheme).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use occi_core::builtin;

    const INFRA: &str = "http://schemas.ogf.org/occi/infrastructure#";

    fn translator() -> UrlTranslator {
        UrlTranslator::new("http://localhost:8000")
    }

    fn compute_kind() -> CategoryRef {
        Category::kind("compute", INFRA)
            .title("Compute Resource")
            .related(&builtin::resource_kind())
            .attribute(Attribute::string("occi.compute.state").immutable())
            .location("compute/")
            .build()
            .unwrap()
    }

    fn render(payload: &Payload) -> (Rendered, Value) {
        let rendered = JsonRenderer::default().render(payload, &translator()).unwrap();
        let value = serde_json::from_str(&rendered.body).unwrap();
        (rendered, value)
    }

    #[test]
    fn instances_name_a_single_kind() {
        let object = DataObject {
            categories: vec![compute_kind()],
            attributes: vec![("occi.compute.memory".to_owned(), AttributeValue::Float(2.0))],
            location: Some("http://localhost:8000/compute/1".to_owned()),
            render_flags: RenderFlags::RESOURCE_INSTANCE,
            ..DataObject::default()
        };
        let (rendered, value) = render(&Payload::Single(object));
        assert_eq!(rendered.content_type, "application/occi+json");
        assert_eq!(rendered.headers.len(), 1);
        assert_eq!(value["kind"]["term"], "compute");
        assert_eq!(value["kind"]["class"], "kind");
        assert_eq!(value["attributes"]["occi.compute.memory"], 2.0);
        assert!(value.get("kinds").is_none());
        assert!(value.get("links").is_none());
    }

    #[test]
    fn discovery_lists_definitions() {
        let (_, value) = render(&Payload::Single(DataObject::discovery(vec![
            compute_kind(),
            builtin::action_category(),
        ])));
        let kind = &value["kinds"][0];
        assert_eq!(kind["related"], "http://schemas.ogf.org/occi/core#resource");
        assert_eq!(kind["location"], "http://localhost:8000/compute/");
        assert_eq!(kind["attributes"][0]["name"], "occi.compute.state");
        assert_eq!(kind["attributes"][0]["mutable"], false);
        assert_eq!(value["categories"][0]["term"], "action");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn collections_are_wrapped() {
        let (_, value) = render(&Payload::List(vec![DataObject::with_location("http://localhost:8000/compute/1")]));
        assert_eq!(value["collection"][0]["location"], "http://localhost:8000/compute/1");
    }

    #[test]
    fn parses_entity_documents() {
        let body = r#"{
            "kind": {"term": "compute", "scheme": "http://schemas.ogf.org/occi/infrastructure#"},
            "mixins": [{"term": "tag", "scheme": "http://example.com/tags#"}],
            "attributes": {"occi.compute.hostname": "web", "occi.compute.cores": 2, "occi.compute.memory": 1.5},
            "links": [{"target": "/storage/1", "category": ["http://schemas.ogf.org/occi/infrastructure#storagelink"]}]
        }"#;
        let objects = JsonParser.parse(&HeaderMap::new(), body, &translator()).unwrap();
        let [object] = objects.as_slice() else { panic!("one object expected") };
        assert!(object.categories[0].is_kind());
        assert!(object.categories[1].is_mixin());
        assert_eq!(object.attributes[1], ("occi.compute.cores".to_owned(), AttributeValue::Int(2)));
        assert_eq!(object.attributes[2], ("occi.compute.memory".to_owned(), AttributeValue::Float(1.5)));
        assert_eq!(object.links[0].target_location.as_deref(), Some("/storage/1"));
    }

    #[test]
    fn parses_mixin_definitions_and_collections() {
        let body = r#"{"mixins": [{"term": "tag", "scheme": "http://example.com/tags#", "location": "/tag/",
            "attributes": [{"name": "owner", "type": "string", "required": true}]}]}"#;
        let objects = JsonParser.parse(&HeaderMap::new(), body, &translator()).unwrap();
        let tag = &objects[0].categories[0];
        assert_eq!(tag.location(), Some("tag/"));
        assert!(tag.attribute("owner").is_some_and(Attribute::is_required));

        let body = r#"{"collection": [{"location": "/compute/1"}, {"location": "/compute/2"}]}"#;
        let objects = JsonParser.parse(&HeaderMap::new(), body, &translator()).unwrap();
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn rejects_malformed_documents() {
        for body in ["{", r#"{"attributes": {"a": [1]}}"#, r#"{"categories": [{"term": "x", "scheme": "s#", "class": "other"}]}"#] {
            let err = JsonParser.parse(&HeaderMap::new(), body, &translator()).unwrap_err();
            assert_eq!(err.status_code(), 400, "{body}");
        }
    }
}
