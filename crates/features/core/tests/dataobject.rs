use occi_core::{
    Attribute, AttributeValue, Category, CategoryRef, CategoryRegistry, DataObject, DataObjectError, Entity,
    ImportOptions, LinkRepr, RenderFlags, UrlTranslator, builtin,
};

const SCHEME: &str = "http://example.com/occi/infrastructure#";

struct Fixture {
    registry: CategoryRegistry,
    translator: UrlTranslator,
    compute: CategoryRef,
    storage: CategoryRef,
    storage_link: CategoryRef,
    start: CategoryRef,
    tagged: CategoryRef,
}

fn fixture() -> Fixture {
    let registry = CategoryRegistry::new();
    let start = Category::action("start", "http://example.com/occi/infrastructure/compute/action#")
        .title("Start")
        .attribute(Attribute::string("method"))
        .build()
        .unwrap();
    let compute = Category::kind("compute", SCHEME)
        .related(&builtin::resource_kind())
        .attribute(Attribute::float("occi.compute.memory"))
        .attribute(Attribute::string("occi.compute.hostname").immutable())
        .action(&start)
        .location("compute/")
        .build()
        .unwrap();
    let storage = Category::kind("storage", SCHEME)
        .related(&builtin::resource_kind())
        .attribute(Attribute::float("occi.storage.size").required())
        .location("storage/")
        .build()
        .unwrap();
    let storage_link = Category::kind("storagelink", SCHEME)
        .related(&builtin::link_kind())
        .attribute(Attribute::string("occi.storagelink.deviceid").required())
        .location("link/storage/")
        .build()
        .unwrap();
    let tagged = Category::mixin("tagged", "http://example.com/tags#")
        .attribute(Attribute::string("tag"))
        .location("tagged/")
        .build()
        .unwrap();
    for category in [&compute, &storage, &storage_link, &tagged] {
        registry.register(category.clone()).unwrap();
    }
    Fixture {
        registry,
        translator: UrlTranslator::new("http://localhost:8000"),
        compute,
        storage,
        storage_link,
        start,
        tagged,
    }
}

fn resources(f: &Fixture) -> (Entity, Entity) {
    let mut disk = Entity::new(f.storage.clone()).unwrap();
    disk.set_id("storage/1");
    disk.import_attributes([("title", "disk"), ("occi.storage.size", "20")], true).unwrap();

    let mut link = Entity::new(f.storage_link.clone()).unwrap();
    link.set_id("link/storage/1");
    link.import_attributes(
        [("source", "compute/1"), ("target", "storage/1"), ("occi.storagelink.deviceid", "ide:0:0")],
        true,
    )
    .unwrap();

    let mut vm = Entity::new(f.compute.clone()).unwrap();
    vm.set_id("compute/1");
    vm.import_attributes([("occi.compute.memory", "2")], true).unwrap();
    vm.set_applicable_action(&f.start, true).unwrap();
    vm.add_link(link).unwrap();
    (vm, disk)
}

#[test]
fn exports_resource_with_links_and_actions() {
    let f = fixture();
    let (vm, disk) = resources(&f);

    let object = DataObject::load_from_entity(&vm, &f.translator, &[disk]);
    assert_eq!(object.render_flags, RenderFlags::RESOURCE_INSTANCE);
    assert_eq!(object.location.as_deref(), Some("http://localhost:8000/compute/1"));
    assert_eq!(object.categories, vec![f.compute.clone()]);
    assert_eq!(object.attributes, vec![("occi.compute.memory".to_owned(), AttributeValue::Float(2.0))]);

    let [action] = object.actions.as_slice() else { panic!("one action expected") };
    assert_eq!(action.location, "http://localhost:8000/compute/1?action=start");
    assert_eq!(action.title.as_deref(), Some("Start"));

    let [link] = object.links.as_slice() else { panic!("one link expected") };
    assert_eq!(link.target_location.as_deref(), Some("http://localhost:8000/storage/1"));
    assert_eq!(link.target_title.as_deref(), Some("disk"));
    assert_eq!(link.target_categories, vec![f.storage.clone()]);
    assert_eq!(link.link_location.as_deref(), Some("http://localhost:8000/link/storage/1"));
    assert_eq!(link.link_categories, vec![f.storage_link.clone()]);
    assert_eq!(
        link.link_attributes,
        vec![("occi.storagelink.deviceid".to_owned(), AttributeValue::from("ide:0:0"))]
    );
}

#[test]
fn exports_link_endpoints_as_locations() {
    let f = fixture();
    let (vm, _) = resources(&f);
    let link = &vm.links()[0];

    let object = DataObject::load_from_entity(link, &f.translator, &[]);
    assert!(object.attributes.contains(&(
        "source".to_owned(),
        AttributeValue::from("http://localhost:8000/compute/1")
    )));
    assert!(object.attributes.contains(&(
        "target".to_owned(),
        AttributeValue::from("http://localhost:8000/storage/1")
    )));
}

#[test]
fn imports_new_resource_with_mixin_and_link() {
    let f = fixture();
    let object = DataObject {
        categories: vec![f.compute.clone(), f.tagged.clone()],
        attributes: vec![
            ("occi.compute.memory".to_owned(), AttributeValue::from("4")),
            ("tag".to_owned(), AttributeValue::from("web")),
        ],
        links: vec![LinkRepr {
            target_location: Some("http://localhost:8000/storage/1".to_owned()),
            link_categories: vec![f.storage_link.clone()],
            link_attributes: vec![("occi.storagelink.deviceid".to_owned(), AttributeValue::from("ide:0:1"))],
            ..LinkRepr::default()
        }],
        ..DataObject::default()
    };

    let entity = object
        .save_to_entity(None, Some(&f.registry), &f.translator, ImportOptions::default())
        .unwrap();
    assert_eq!(entity.kind(), &f.compute);
    assert!(entity.has_category(&f.tagged));
    assert_eq!(entity.attribute("occi.compute.memory"), Some(&AttributeValue::Float(4.0)));

    let [link] = entity.links() else { panic!("one link expected") };
    assert_eq!(link.kind(), &f.storage_link);
    assert_eq!(link.target(), Some("storage/1"));
    assert_eq!(link.source(), None);
}

#[test]
fn imported_link_defaults_to_core_link_kind() {
    let f = fixture();
    let mut vm = Entity::new(f.compute.clone()).unwrap();
    vm.set_id("compute/9");

    let repr = LinkRepr { target_location: Some("/storage/1".to_owned()), ..LinkRepr::default() };
    let link = repr.save_as_link(&vm, Some(&f.registry), &f.translator, true).unwrap();
    assert_eq!(link.kind(), &builtin::link_kind());
    assert_eq!(link.source(), Some("compute/9"));
    assert_eq!(link.target(), Some("storage/1"));

    let err = LinkRepr::default().save_as_link(&vm, Some(&f.registry), &f.translator, true).unwrap_err();
    assert!(err.to_string().contains("link without target"));
}

#[test]
fn link_attributes_are_validated() {
    let f = fixture();
    let mut vm = Entity::new(f.compute.clone()).unwrap();
    vm.set_id("compute/9");
    let bare = LinkRepr {
        target_location: Some("/storage/1".to_owned()),
        link_categories: vec![f.storage_link.clone()],
        ..LinkRepr::default()
    };

    let err = bare.save_as_link(&vm, Some(&f.registry), &f.translator, true).unwrap_err();
    assert!(err.to_string().contains("occi.storagelink.deviceid"));
    assert_eq!(err.status_code(), 400);
    let link = bare.save_as_link(&vm, Some(&f.registry), &f.translator, false).unwrap();
    assert_eq!(link.attribute("occi.storagelink.deviceid"), None);

    let object = DataObject { categories: vec![f.compute.clone()], links: vec![bare], ..DataObject::default() };
    let err = object
        .save_to_entity(None, Some(&f.registry), &f.translator, ImportOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("occi.storagelink.deviceid"));

    let unknown = LinkRepr {
        target_location: Some("/storage/1".to_owned()),
        link_attributes: vec![("colour".to_owned(), AttributeValue::from("red"))],
        ..LinkRepr::default()
    };
    assert!(unknown.save_as_link(&vm, Some(&f.registry), &f.translator, true).is_err());
}

#[test]
fn link_target_must_be_a_resource() {
    let f = fixture();
    let vm = Entity::new(f.compute.clone()).unwrap();
    let repr = LinkRepr {
        target_location: Some("/link/storage/1".to_owned()),
        target_categories: vec![f.storage_link.clone()],
        ..LinkRepr::default()
    };
    let err = repr.save_as_link(&vm, Some(&f.registry), &f.translator, true).unwrap_err();
    assert!(err.to_string().contains("link target is not a Resource"));
}

#[test]
fn rejects_kind_problems() {
    let f = fixture();
    let two_kinds =
        DataObject { categories: vec![f.compute.clone(), f.storage.clone()], ..DataObject::default() };
    let err = two_kinds
        .save_to_entity(None, Some(&f.registry), &f.translator, ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, DataObjectError::Invalid { .. }));

    let (vm, _) = resources(&f);
    let other_kind = DataObject { categories: vec![f.storage.clone()], ..DataObject::default() };
    let err = other_kind
        .save_to_entity(Some(vm), Some(&f.registry), &f.translator, ImportOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("cannot change"));

    let unknown = Category::kind("ghost", SCHEME).build().unwrap();
    let object = DataObject { categories: vec![unknown], ..DataObject::default() };
    let err = object
        .save_to_entity(None, Some(&f.registry), &f.translator, ImportOptions::default())
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn validation_can_be_relaxed() {
    let f = fixture();
    let (vm, _) = resources(&f);
    let object = DataObject {
        attributes: vec![("occi.compute.hostname".to_owned(), AttributeValue::from("web01"))],
        ..DataObject::default()
    };

    let strict = object.save_to_entity(Some(vm.clone()), None, &f.translator, ImportOptions::default());
    assert!(strict.unwrap_err().to_string().contains("Immutable attribute"));

    let relaxed = ImportOptions { validate: false, create_links: false };
    let entity = object.save_to_entity(Some(vm), None, &f.translator, relaxed).unwrap();
    assert_eq!(entity.attribute("occi.compute.hostname"), Some(&AttributeValue::from("web01")));
}

#[test]
fn imports_actions_with_parameters() {
    let f = fixture();
    let object = DataObject {
        categories: vec![f.start.clone()],
        attributes: vec![("method".to_owned(), AttributeValue::from("graceful"))],
        ..DataObject::default()
    };
    let action = object.save_as_action(Some(&f.registry)).unwrap();
    assert_eq!(action.category(), &f.start);
    assert_eq!(action.parameter("method"), Some(&AttributeValue::from("graceful")));

    let object = DataObject {
        categories: vec![f.start.clone()],
        attributes: vec![("speed".to_owned(), AttributeValue::from("fast"))],
        ..DataObject::default()
    };
    let err = object.save_as_action(Some(&f.registry)).unwrap_err();
    assert_eq!(err.to_string(), "\"speed\": Unknown action parameter");
}
