use trellis::{
    Attributes, Engine, Event, Registry, RuleSet, Rules, RulesBase, WithDefaults,
    testing::{HookCall, RecordingAction},
};

mod common;
use common::{close, document, open};

fn begun(recorder: &RecordingAction) -> Vec<(String, String)> {
    recorder
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            HookCall::Begin(label, element) => Some((label, element)),
            _ => None,
        })
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(label, element)| ((*label).to_owned(), (*element).to_owned()))
        .collect()
}

#[test]
fn exact_pattern_beats_wildcard() {
    let exact = RecordingAction::new("exact");
    let wildcard = exact.sibling("wildcard");
    let mut engine = Engine::builder()
        .register("*/item", wildcard)
        .register("list/item", exact.clone())
        .build();

    engine
        .run(document(vec![
            open("list"),
            open("item"),
            close("item"),
            open("group"),
            open("item"),
            close("item"),
            close("group"),
            close("list"),
        ]))
        .unwrap();

    assert_eq!(
        begun(&exact),
        pairs(&[("exact", "item"), ("wildcard", "item")])
    );
}

#[test]
fn longest_wildcard_suffix_wins() {
    let short = RecordingAction::new("short");
    let long = short.sibling("long");
    let mut engine = Engine::builder()
        .register("*/b", short.clone())
        .register("*/a/b", long)
        .build();

    engine
        .run(document(vec![open("a"), open("b"), close("b"), close("a")]))
        .unwrap();
    engine.reset();
    engine
        .run(document(vec![open("c"), open("b"), close("b"), close("c")]))
        .unwrap();

    assert_eq!(begun(&short), pairs(&[("long", "b"), ("short", "b")]));
}

#[test]
fn wildcard_matches_a_single_segment_path() {
    let recorder = RecordingAction::new("any");
    let mut engine = Engine::builder().register("*/b", recorder.clone()).build();

    engine.run(document(vec![open("b"), close("b")])).unwrap();

    assert_eq!(begun(&recorder), pairs(&[("any", "b")]));
}

#[test]
fn wildcard_suffix_respects_segment_boundaries() {
    let recorder = RecordingAction::new("item");
    let mut engine = Engine::builder()
        .register("*/item", recorder.clone())
        .build();

    engine
        .run(document(vec![open("list"), open("lineitem"), close("lineitem"), close("list")]))
        .unwrap();

    assert!(recorder.calls().is_empty());
}

#[test]
fn trailing_slash_is_ignored_at_registration() {
    let recorder = RecordingAction::new("r");
    let mut engine = Engine::builder().register("a/b/", recorder.clone()).build();

    engine
        .run(document(vec![open("a"), open("b"), close("b"), close("a")]))
        .unwrap();

    assert_eq!(begun(&recorder), pairs(&[("r", "b")]));
}

#[test]
fn namespace_aware_matching_filters_by_uri() {
    let any = RecordingAction::new("any");
    let svc = any.sibling("svc");
    let other = any.sibling("other");
    let mut engine = Engine::builder()
        .namespace_aware(true)
        .register("service", any.clone())
        .register_ns("service", "urn:svc", svc)
        .register_ns("service", "urn:other", other)
        .build();

    engine
        .run(vec![
            Event::StartDocument,
            Event::StartPrefixMapping {
                prefix: "s".into(),
                uri: "urn:svc".into(),
            },
            Event::StartElement {
                namespace: String::new(),
                local_name: "service".into(),
                qname: "s:service".into(),
                attributes: Attributes::new(),
            },
            Event::EndElement {
                namespace: String::new(),
                local_name: "service".into(),
                qname: "s:service".into(),
            },
            Event::EndPrefixMapping { prefix: "s".into() },
            Event::EndDocument,
        ])
        .unwrap();

    assert_eq!(
        begun(&any),
        pairs(&[("any", "service"), ("svc", "service")])
    );
}

fn element_in(uri: &str, name: &str) -> [Event; 2] {
    [
        Event::StartElement {
            namespace: uri.into(),
            local_name: name.into(),
            qname: name.into(),
            attributes: Attributes::new(),
        },
        Event::EndElement {
            namespace: uri.into(),
            local_name: name.into(),
            qname: name.into(),
        },
    ]
}

struct ServiceRules {
    recorder: RecordingAction,
}

impl RuleSet for ServiceRules {
    fn namespace(&self) -> Option<&str> {
        Some("urn:svc")
    }

    fn add_rule_instances<R: Rules>(&self, registry: &mut Registry<R>) {
        registry.register("service", self.recorder.clone());
    }
}

#[test]
fn rule_set_registrations_stay_in_the_set_namespace() {
    let svc = RecordingAction::new("svc");
    let plain = svc.sibling("plain");
    let mut engine = Engine::builder()
        .namespace_aware(true)
        .rule_set(&ServiceRules {
            recorder: svc.clone(),
        })
        .register("service", plain)
        .build();

    let mut body = element_in("urn:other", "service").to_vec();
    body.extend(element_in("urn:svc", "service"));
    engine.run(document(body)).unwrap();

    assert_eq!(
        begun(&svc),
        pairs(&[("plain", "service"), ("svc", "service"), ("plain", "service")])
    );
    let first = engine
        .registry()
        .entry(engine.registry().ids().next().unwrap())
        .unwrap();
    assert_eq!(first.registration().namespace.as_deref(), Some("urn:svc"));
    assert_eq!(engine.registry().default_namespace(), None);
}

#[test]
fn namespace_unaware_matching_uses_qualified_names() {
    let recorder = RecordingAction::new("r");
    let mut engine = Engine::builder()
        .register("s:service", recorder.clone())
        .build();

    engine
        .run(vec![
            Event::StartDocument,
            Event::StartElement {
                namespace: "urn:svc".into(),
                local_name: "service".into(),
                qname: "s:service".into(),
                attributes: Attributes::new(),
            },
            Event::EndElement {
                namespace: "urn:svc".into(),
                local_name: "service".into(),
                qname: "s:service".into(),
            },
            Event::EndDocument,
        ])
        .unwrap();

    assert_eq!(begun(&recorder), pairs(&[("r", "s:service")]));
}

#[test]
fn defaults_fire_only_for_unmatched_elements() {
    let known = RecordingAction::new("known");
    let fallback = known.sibling("fallback");
    let mut engine = Engine::builder()
        .rules(WithDefaults::new(RulesBase::new()))
        .register("a", known.clone())
        .register_default(fallback)
        .build();

    engine
        .run(document(vec![open("a"), open("b"), close("b"), close("a")]))
        .unwrap();

    assert_eq!(begun(&known), pairs(&[("known", "a"), ("fallback", "b")]));
}

#[test]
fn registry_lists_patterns() {
    let engine = Engine::builder()
        .register("a", RecordingAction::new("a"))
        .register("*/b", RecordingAction::new("b"))
        .register("*/b", RecordingAction::new("c"))
        .build();

    let mut patterns = engine.registry().rules().patterns();
    patterns.sort_unstable();
    assert_eq!(patterns, vec!["*/b", "a"]);
    assert_eq!(engine.registry().len(), 3);
}
