#![cfg(feature = "xml")]

use trellis::{
    ActionError, Engine, Location, RunState, TrellisError,
    actions::{BodyProperty, CallMethod, ObjectCreate, SetNext, SetProperties},
    testing::{FailAt, FailingAction, HookCall, RecordingAction},
};

mod common;
use common::{Config, Service};

fn service_engine() -> Engine {
    Engine::builder()
        .register("config", ObjectCreate::of(Config::default))
        .register("config", SetProperties::new())
        .register("config/service", ObjectCreate::of(Service::default))
        .register("config/service", SetProperties::new())
        .register("config/service", SetNext::new("add_service"))
        .register("config/service/alias", CallMethod::new("add_alias", 0))
        .register("config/service/port", BodyProperty::new())
        .build()
}

#[test]
fn parses_a_document_into_objects() {
    let mut engine = service_engine();
    let xml = r#"<?xml version="1.0"?>
<!-- services -->
<config name="main">
    <service name="api" log-level="info">
        <port>8080</port>
        <alias>front</alias>
    </service>
    <service name="worker"/>
</config>"#;

    let config = engine.take_root_as::<Config>();
    assert!(config.is_none());

    let root = engine.parse_str(xml).unwrap().unwrap();
    let config = root.downcast_ref::<Config>().unwrap();
    assert_eq!(config.name, "main");
    assert_eq!(config.services.len(), 2);
    assert_eq!(config.services[0].port, 8080);
    assert_eq!(config.services[0].log_level.as_deref(), Some("info"));
    assert_eq!(config.services[0].aliases, vec!["front".to_owned()]);
    assert_eq!(config.services[1].name, "worker");
    assert_eq!(engine.state(), RunState::Finished);
}

#[test]
fn entities_and_cdata_reach_body_text() {
    let mut engine = service_engine();
    let root = trellis::xml::parse_str(
        &mut engine,
        "<config name=\"a &amp; b\"><service><alias>x &lt; y</alias><alias><![CDATA[<raw>]]></alias></service></config>",
    )
    .unwrap()
    .unwrap();

    let config = root.downcast_ref::<Config>().unwrap();
    assert_eq!(config.name, "a & b");
    assert_eq!(config.services[0].aliases, vec!["x < y".to_owned(), "<raw>".to_owned()]);
}

#[test]
fn empty_elements_open_and_close() {
    let recorder = RecordingAction::new("r");
    let mut engine = Engine::builder().register("a/b", recorder.clone()).build();

    engine.parse_str("<a><b/></a>").unwrap();

    let kinds: Vec<_> = recorder
        .calls()
        .into_iter()
        .map(|call| match call {
            HookCall::Begin(..) => "begin",
            HookCall::Body(..) => "body",
            HookCall::End(..) => "end",
            HookCall::Finish(..) => "finish",
        })
        .collect();
    assert_eq!(kinds, vec!["begin", "body", "end", "finish"]);
}

#[test]
fn prefixed_elements_resolve_their_namespace() {
    let svc = RecordingAction::new("svc");
    let other = svc.sibling("other");
    let mut engine = Engine::builder()
        .namespace_aware(true)
        .register_ns("config/service", "urn:svc", svc.clone())
        .register_ns("config/service", "urn:other", other)
        .build();

    engine
        .parse_str(
            r#"<config xmlns:s="urn:svc" xmlns="urn:default">
                 <s:service/>
               </config>"#,
        )
        .unwrap();

    let begun: Vec<_> = svc
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            HookCall::Begin(label, element) => Some(format!("{label}:{element}")),
            _ => None,
        })
        .collect();
    assert_eq!(begun, vec!["svc:service"]);
    assert!(engine.context().namespaces().is_empty());
}

#[test]
fn malformed_markup_reports_a_location() {
    let mut engine = Engine::new();
    let err = engine.parse_str("<a>\n  <b></c>\n</a>").unwrap_err();

    match err {
        TrellisError::Markup { location, .. } => {
            let location = location.unwrap();
            assert_eq!(location.line, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn action_errors_carry_the_document_location() {
    let mut engine = Engine::builder()
        .register("a/b", FailingAction::new(FailAt::Begin, "rejected"))
        .build();

    let err = engine.parse_str("<a>\n\n  <b/>\n</a>").unwrap_err();

    match err {
        TrellisError::Action {
            path,
            location,
            source: ActionError::Custom(_),
        } => {
            assert_eq!(path, "a/b");
            assert_eq!(location, Some(Location::new(3, 3)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(engine.state(), RunState::Failed);
}

#[test]
fn engine_can_parse_again_after_reset() {
    let mut engine = service_engine();
    let xml = r#"<config name="again"/>"#;

    let first = engine.parse_str(xml).unwrap().unwrap();
    engine.reset();
    let second = engine.parse_str(xml).unwrap().unwrap();

    assert_eq!(
        first.downcast_ref::<Config>(),
        second.downcast_ref::<Config>()
    );
}
