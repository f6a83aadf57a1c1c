use std::rc::Rc;
use trellis::{
    ActionError, Attributes, BindError, Bindable, BoxError, Engine, FromValue, Options,
    TrellisError, Value,
    actions::{
        BodyProperty, CallMethod, CallParam, FactoryCreate, ObjectCreate, ObjectFactory,
        ObjectParam, SetNext, SetProperties, SetProperty, SetRoot,
    },
};

mod common;
use common::{Catalog, Config, Node, Service, close, document, empty, open, open_with, text};

fn config_rules() -> trellis::EngineBuilder {
    Engine::builder()
        .register("config", ObjectCreate::of(Config::default))
        .register("config", SetProperties::new())
        .register("config/service", ObjectCreate::of(Service::default))
        .register("config/service", SetProperties::new())
        .register("config/service", SetNext::new("add_service"))
}

#[test]
fn service_attribute_lands_in_nested_object() {
    let mut engine = config_rules().build();
    let mut body = vec![open("config")];
    body.extend(empty("service", &[("name", "x")]));
    body.push(close("config"));

    let config = engine.run(document(body)).unwrap().unwrap();
    let config = config.downcast::<Config>().unwrap();

    assert_eq!(config.services.len(), 1);
    assert_eq!(config.services[0].name, "x");
}

#[test]
fn typed_conversion_rename_and_adders() {
    let mut engine = config_rules()
        .register("config/service/alias", CallMethod::new("add_alias", 0))
        .register("config/service/port", BodyProperty::new())
        .build();

    let events = document(vec![
        open_with("config", &[("name", "prod")]),
        open_with("service", &[("name", "api"), ("log-level", "debug")]),
        open("port"),
        text(" 8443 "),
        close("port"),
        open("alias"),
        text("gateway"),
        close("alias"),
        open("alias"),
        text("edge"),
        close("alias"),
        close("service"),
        close("config"),
    ]);

    let config = engine.run(events).unwrap().unwrap();
    let config = config.downcast_ref::<Config>().unwrap();

    assert_eq!(config.name, "prod");
    assert_eq!(
        config.services,
        vec![Service {
            name: "api".into(),
            port: 8443,
            log_level: Some("debug".into()),
            aliases: vec!["gateway".into(), "edge".into()],
        }]
    );
}

#[test]
fn conversion_failures_abort_with_path() {
    let mut engine = config_rules().build();
    let mut body = vec![open("config")];
    body.extend(empty("service", &[("port", "eighty")]));
    body.push(close("config"));

    let err = engine.run(document(body)).unwrap_err();
    match err {
        TrellisError::Action { path, source, .. } => {
            assert_eq!(path, "config/service");
            assert!(matches!(source, ActionError::Bind(BindError::Conversion { expected: "u16", .. })));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_properties_are_tolerated_in_both_modes() {
    for options in [Options::empty(), Options::STRICT] {
        let mut engine = config_rules().options(options).build();
        let mut body = vec![open("config")];
        body.extend(empty("service", &[("name", "a"), ("colour", "blue")]));
        body.push(close("config"));

        let config = engine.run(document(body)).unwrap().unwrap();
        assert_eq!(config.downcast_ref::<Config>().unwrap().services.len(), 1);
    }
}

#[test]
fn skipped_fields_are_not_addressable() {
    let mut config = Config::default();
    let err = config
        .set_property("notes", Value::from("hidden"))
        .unwrap_err();
    assert!(err.is_missing_member());

    config.set_property("name", Value::from("visible")).unwrap();
    config
        .invoke("set_name", vec![Value::from("through setter")])
        .unwrap();
    assert_eq!(config.name, "through setter");
    assert_eq!(config.type_name(), "Config");
}

#[test]
fn derived_types_convert_from_object_values() {
    let value = Value::object(Service {
        name: "s".into(),
        ..Service::default()
    });
    let service = Service::from_value(value).unwrap();
    assert_eq!(service.name, "s");

    let wrong = Value::object(Catalog::default());
    assert!(Service::from_value(wrong).is_err());
}

#[test]
fn call_method_collects_parameters_from_children() {
    let mut engine = Engine::builder()
        .register("catalog", ObjectCreate::of(Catalog::default))
        .register("catalog/entry", CallMethod::new("add_entry", 2))
        .register("catalog/entry", CallParam::attribute(0, "key"))
        .register("catalog/entry/value", CallParam::body(1))
        .build();

    let events = document(vec![
        open("catalog"),
        open_with("entry", &[("key", "colour")]),
        open("value"),
        text("green"),
        close("value"),
        close("entry"),
        open_with("entry", &[("key", "size")]),
        open("value"),
        text("large"),
        close("value"),
        close("entry"),
        close("catalog"),
    ]);

    let catalog = engine.run(events).unwrap().unwrap();
    let catalog = catalog.downcast_ref::<Catalog>().unwrap();
    assert_eq!(
        catalog.entries,
        vec![
            ("colour".to_owned(), "green".to_owned()),
            ("size".to_owned(), "large".to_owned()),
        ]
    );
    assert_eq!(engine.context().params_depth(), 0);
}

#[test]
fn call_method_is_skipped_when_no_parameter_arrives() {
    let mut engine = Engine::builder()
        .register("catalog", ObjectCreate::of(Catalog::default))
        .register("catalog/entry", CallMethod::new("add_entry", 2))
        .register("catalog/entry", CallParam::attribute(0, "key"))
        .build();

    let mut body = vec![open("catalog")];
    body.extend(empty("entry", &[]));
    body.push(close("catalog"));

    let catalog = engine.run(document(body)).unwrap().unwrap();
    assert!(catalog.downcast_ref::<Catalog>().unwrap().entries.is_empty());
}

#[test]
fn arity_mismatch_is_fatal() {
    let mut engine = Engine::builder()
        .register("catalog", ObjectCreate::of(Catalog::default))
        .register("catalog/entry", CallMethod::new("add_entry", 1))
        .register("catalog/entry", ObjectParam::str(0, "only"))
        .build();

    let mut body = vec![open("catalog")];
    body.extend(empty("entry", &[]));
    body.push(close("catalog"));

    let err = engine.run(document(body)).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Action {
            source: ActionError::Bind(BindError::Arity { expected: 2, found: 1, .. }),
            ..
        }
    ));
}

#[test]
fn set_property_and_object_factory_type_override() {
    let types = Rc::new(
        ObjectFactory::new()
            .with("catalog", Catalog::default)
            .with("service", Service::default),
    );
    let mut engine = Engine::builder()
        .register("holder", ObjectCreate::of(Config::default).with_type_attribute("class", types))
        .register("holder/set", SetProperty::default())
        .build();

    let events = document(vec![
        open_with("holder", &[("class", "catalog")]),
        open_with("set", &[("name", "title"), ("value", "Spring")]),
        close("set"),
        close("holder"),
    ]);

    let root = engine.run(events).unwrap().unwrap();
    assert_eq!(root.downcast_ref::<Catalog>().unwrap().title, "Spring");
}

#[test]
fn set_root_links_deep_objects_to_the_root() {
    let mut engine = Engine::builder()
        .register("config", ObjectCreate::of(Config::default))
        .register("*/group", ObjectCreate::of(Catalog::default))
        .register("*/service", ObjectCreate::of(Service::default))
        .register("*/service", SetProperties::new())
        .register("*/service", SetRoot::new("add_service"))
        .build();

    let mut body = vec![open("config"), open("group")];
    body.extend(empty("service", &[("name", "deep")]));
    body.extend(vec![close("group"), close("config")]);

    let config = engine.run(document(body)).unwrap().unwrap();
    let config = config.downcast_ref::<Config>().unwrap();
    assert_eq!(config.services[0].name, "deep");
}

#[test]
fn ignored_factory_failures_push_nothing() {
    let factory = |attributes: &Attributes| -> Result<Box<dyn Bindable>, BoxError> {
        let port = attributes.get("port").ok_or("port is required")?.parse::<u16>()?;
        Ok(Box::new(Service {
            port,
            ..Service::default()
        }))
    };
    let mut engine = Engine::builder()
        .register("config", ObjectCreate::of(Config::default))
        .register("config/service", FactoryCreate::new(factory).ignore_create_errors(true))
        .register("config/service", SetNext::new("add_service"))
        .build();

    let mut body = vec![open("config")];
    body.extend(empty("service", &[("port", "81")]));
    body.extend(empty("service", &[]));
    body.push(close("config"));

    // The second service has no port: the factory fails, nothing is pushed,
    // and set-next finds no child to link.
    let err = engine.run(document(body)).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Action {
            source: ActionError::MissingObject("set-next"),
            ..
        }
    ));
}

#[test]
fn factory_create_failures_are_fatal_by_default() {
    let factory = |_: &Attributes| -> Result<Box<dyn Bindable>, BoxError> { Err("no".into()) };
    let mut engine = Engine::builder()
        .register("service", FactoryCreate::new(factory))
        .build();
    let err = engine.run(document(empty("service", &[]))).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Action {
            source: ActionError::Factory(_),
            ..
        }
    ));
}

#[test]
fn recursive_matches_keep_each_depth_separate() {
    let mut engine = Engine::builder()
        .register("tree", ObjectCreate::of(Node::default))
        .register("*/node", ObjectCreate::of(Node::default))
        .register("*/node", SetNext::new("add_child"))
        .register("*/node", BodyProperty::named("label"))
        .register("*/node/name", BodyProperty::new())
        .build();

    let events = document(vec![
        open("tree"),
        open("node"),
        text("top"),
        open("name"),
        text("outer"),
        close("name"),
        open("node"),
        text("leaf"),
        open("name"),
        text("inner"),
        close("name"),
        close("node"),
        close("node"),
        close("tree"),
    ]);

    let tree = engine.run(events).unwrap().unwrap();
    let tree = tree.downcast_ref::<Node>().unwrap();
    assert_eq!(
        tree.children,
        vec![Node {
            name: "outer".into(),
            label: "top".into(),
            children: vec![Node {
                name: "inner".into(),
                label: "leaf".into(),
                children: Vec::new(),
            }],
        }]
    );
    assert_eq!(engine.context().depth(), 0);
}

#[test]
fn nested_calls_collect_their_own_parameters() {
    let mut engine = Engine::builder()
        .register("catalog", ObjectCreate::of(Catalog::default))
        .register("*/entry", CallMethod::new("add_entry", 2))
        .register("*/entry", CallParam::attribute(0, "key"))
        .register("*/entry/value", CallParam::body(1))
        .build();

    let events = document(vec![
        open("catalog"),
        open_with("entry", &[("key", "outer")]),
        open_with("entry", &[("key", "inner")]),
        open("value"),
        text("in"),
        close("value"),
        close("entry"),
        open("value"),
        text("out"),
        close("value"),
        close("entry"),
        close("catalog"),
    ]);

    let catalog = engine.run(events).unwrap().unwrap();
    let catalog = catalog.downcast_ref::<Catalog>().unwrap();
    assert_eq!(
        catalog.entries,
        vec![
            ("inner".to_owned(), "in".to_owned()),
            ("outer".to_owned(), "out".to_owned()),
        ]
    );
    assert_eq!(engine.context().params_depth(), 0);
}
