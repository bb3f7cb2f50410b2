//! End-to-end propagation through the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mm_core::{EntityId, Quantity};
use mm_engine::{
    Bibliography, Binding, EngineConfig, EngineError, EntitySchema, Formula, Network,
    SchemaBuilder, SelectionPolicy,
};

fn q(text: &str) -> Quantity {
    Quantity::parse(text).unwrap()
}

fn value(net: &Network, id: EntityId, attribute: &str) -> Option<f64> {
    net.get(id, attribute).unwrap().and_then(Quantity::value)
}

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-9)
}

fn identity() -> Formula {
    Formula::new("identity", |args| Ok(Some(args.get("value")?.clone())))
}

fn simple() -> EntitySchema {
    let get_x = Formula::new("get_x", |args| Ok(Some(args.get("y_var")?.sqrt()?)));
    let get_y = Formula::new("get_y", |args| Ok(Some(args.get("x_var")?.powi(2))));
    let get_z = Formula::new("get_z", |args| {
        Ok(Some(args.get("x_var")?.over(args.get("y_var")?)?))
    });
    SchemaBuilder::new("Simple")
        .guard("x", "m")
        .guard("y", "m^2")
        .guard("z", "1/m")
        .link("x", get_x, [("y_var", "y")])
        .link("y", get_y, [("x_var", "x")])
        .link("z", get_z, [("x_var", "x"), ("y_var", "y")])
        .build()
        .unwrap()
}

fn simple_with_x(net: &mut Network) -> EntityId {
    let id = net.add(simple()).unwrap();
    net.set(id, "x", q("2 m")).unwrap();
    id
}

#[test]
fn setting_x_derives_y_and_z() {
    let mut net = Network::new();
    let id = simple_with_x(&mut net);
    assert!(close(value(&net, id, "x"), 2.0));
    assert!(close(value(&net, id, "y"), 4.0));
    assert!(close(value(&net, id, "z"), 0.5));
}

#[test]
fn setting_y_flows_back_to_x() {
    let mut net = Network::new();
    let id = simple_with_x(&mut net);
    net.set(id, "y", q("9 m^2")).unwrap();
    assert!(close(value(&net, id, "y"), 9.0));
    assert!(close(value(&net, id, "x"), 3.0));
    assert!(close(value(&net, id, "z"), 1.0 / 3.0));
}

#[test]
fn writes_are_converted_to_the_guard_unit() {
    let mut net = Network::new();
    let id = net.add(simple()).unwrap();
    net.set(id, "x", q("300 cm")).unwrap();
    let x = net.get(id, "x").unwrap().unwrap();
    assert_eq!(x.unit().symbol(), "m");
    assert!(close(x.value(), 3.0));
    assert!(close(value(&net, id, "y"), 9.0));
}

#[test]
fn clone_with_overrides_is_independent() {
    let mut net = Network::new();
    let id = simple_with_x(&mut net);
    let copy = net.clone_entity(id, [("x", q("3 m"))]).unwrap();

    assert!(close(value(&net, copy, "x"), 3.0));
    assert!(close(value(&net, copy, "y"), 9.0));
    assert!(close(value(&net, copy, "z"), 1.0 / 3.0));

    assert!(close(value(&net, id, "x"), 2.0));
    assert!(close(value(&net, id, "y"), 4.0));

    net.set(id, "x", q("5 m")).unwrap();
    assert!(close(value(&net, copy, "x"), 3.0));
}

#[test]
fn cloned_network_is_a_deep_copy() {
    let mut net = Network::new();
    let id = simple_with_x(&mut net);
    let snapshot = net.clone();
    net.set(id, "x", q("4 m")).unwrap();
    assert!(close(value(&snapshot, id, "y"), 4.0));
    assert!(close(value(&net, id, "y"), 16.0));
}

#[test]
fn dimension_mismatch_is_reported_with_attribute() {
    let mut net = Network::new();
    let id = net.add(simple()).unwrap();
    let err = net.set(id, "x", q("2 s")).unwrap_err();
    match err {
        EngineError::Dimensionality { attribute, .. } => assert_eq!(attribute, "x"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(net.get(id, "x").unwrap(), None);
}

#[test]
fn reciprocal_pair_stays_consistent() {
    let recip = |input: &'static str| {
        Formula::new(format!("from_{input}"), move |args| {
            Ok(Some(args.get(input)?.recip()))
        })
    };
    let schema = SchemaBuilder::new("Density")
        .guard("density", "kg/m^3")
        .guard("specific_volume", "m^3/kg")
        .link("density", recip("specific_volume"), [("specific_volume", "specific_volume")])
        .link("specific_volume", recip("density"), [("density", "density")])
        .build()
        .unwrap();
    let mut net = Network::new();
    let id = net.add(schema).unwrap();

    net.set(id, "density", q("1000 kg/m^3")).unwrap();
    assert!(close(value(&net, id, "specific_volume"), 1e-3));

    net.set(id, "specific_volume", q("0.5 m^3/kg")).unwrap();
    assert!(close(value(&net, id, "density"), 2.0));
}

fn pair() -> EntitySchema {
    SchemaBuilder::new("Pair")
        .guard("a", "m")
        .guard("b", "m")
        .build()
        .unwrap()
}

#[test]
fn remote_bindings_propagate_across_entities() {
    let mut net = Network::new();
    let src = net.add(pair()).unwrap();
    let dst = net.add(pair()).unwrap();
    net.link(dst, "b", identity(), [("value", Binding::remote(src, "a"))])
        .unwrap();

    net.set(src, "a", q("7 m")).unwrap();
    assert!(close(value(&net, dst, "b"), 7.0));
    assert_eq!(net.get(src, "b").unwrap(), None);
}

#[test]
fn unlink_stops_propagation() {
    let mut net = Network::new();
    let src = net.add(pair()).unwrap();
    let dst = net.add(pair()).unwrap();
    net.link(dst, "b", identity(), [("value", Binding::remote(src, "a"))])
        .unwrap();
    net.unlink(dst, "b", "identity").unwrap();

    assert_eq!(net.entity(src).unwrap().observers().edge_count(), 0);
    net.set(src, "a", q("7 m")).unwrap();
    assert_eq!(net.get(dst, "b").unwrap(), None);
}

#[test]
fn failed_clone_leaves_the_network_as_it_was() {
    let capped = SchemaBuilder::new("Capped")
        .guard("a", "m")
        .guard_in("b", "m", 0.0, 10.0)
        .build()
        .unwrap();
    let mut net = Network::new();
    let src = net.add(pair()).unwrap();
    let dst = net.add(capped).unwrap();
    net.link(dst, "b", identity(), [("value", Binding::remote(src, "a"))])
        .unwrap();

    let err = net.clone_entity(dst, [("nope", q("1 m"))]).unwrap_err();
    assert!(matches!(err, EngineError::UnknownAttribute { .. }));
    assert_eq!(net.len(), 2);
    assert_eq!(net.entity(src).unwrap().observers().edge_count(), 1);

    let err = net
        .clone_entity(dst, [("a", q("1 m")), ("b", q("20 m"))])
        .unwrap_err();
    assert!(matches!(err, EngineError::OutOfRange { .. }));
    assert_eq!(net.len(), 2);
    assert_eq!(net.entity(src).unwrap().observers().edge_count(), 1);

    net.unlink(dst, "b", "identity").unwrap();
    assert_eq!(net.entity(src).unwrap().observers().edge_count(), 0);
    net.set(src, "a", q("50 m")).unwrap();

    let copy = net.clone_entity(dst, [("a", q("3 m"))]).unwrap();
    assert_eq!(net.len(), 3);
    assert!(close(value(&net, copy, "a"), 3.0));
}

#[test]
fn unlink_keeps_edges_still_read_by_rivals() {
    let mut net = Network::new();
    let id = net.add(pair()).unwrap();
    let double = Formula::new("double", |args| Ok(Some(args.get("value")?.scaled(2.0))));
    net.link(id, "b", identity(), [("value", "a")]).unwrap();
    net.link(id, "b", double, [("value", "a")]).unwrap();
    net.unlink(id, "b", "identity").unwrap();

    let names: Vec<String> = net
        .linked_transforms(id, "b")
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, ["double"]);
    net.set(id, "a", q("2 m")).unwrap();
    assert!(close(value(&net, id, "b"), 4.0));
}

#[test]
fn unchanged_values_do_not_propagate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let counted = Formula::new("counted", move |args| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(args.get("value")?.clone()))
    });
    let schema = SchemaBuilder::new("Pair")
        .guard("a", "m")
        .guard("b", "m")
        .link("b", counted, [("value", "a")])
        .build()
        .unwrap();
    let mut net = Network::new();
    let id = net.add(schema).unwrap();

    net.set(id, "a", q("2 m")).unwrap();
    net.set(id, "a", q("200 cm")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

fn rivals() -> EntitySchema {
    let from_a = Formula::new("from_a", |args| Ok(Some(args.get("a")?.clone())));
    let from_b = Formula::new("from_b", |args| Ok(Some(args.get("b")?.clone())));
    SchemaBuilder::new("Rivals")
        .guard("a", "m")
        .guard("b", "m")
        .guard("t", "m")
        .link("t", from_a, [("a", "a")])
        .link("t", from_b, [("b", "b")])
        .build()
        .unwrap()
}

fn run_rivals(policy: SelectionPolicy) -> Option<f64> {
    let config = EngineConfig {
        selection: policy,
        ..EngineConfig::default()
    };
    let mut net = Network::with_config(config);
    let id = net.add(rivals()).unwrap();
    net.set(id, "b", q("1 m")).unwrap();
    assert!(close(value(&net, id, "t"), 1.0));
    // `from_b` is untouched by this wave, so it is tried first.
    net.set(id, "a", q("5 m")).unwrap();
    value(&net, id, "t")
}

#[test]
fn first_success_keeps_least_touched_formula() {
    assert!(close(run_rivals(SelectionPolicy::FirstSuccess), 1.0));
}

#[test]
fn last_success_lets_later_formula_win() {
    assert!(close(run_rivals(SelectionPolicy::LastSuccess), 5.0));
}

fn bounded() -> EntitySchema {
    SchemaBuilder::new("Bounded")
        .guard("a", "m")
        .guard_in("b", "m", 0.0, 10.0)
        .link("b", identity(), [("value", "a")])
        .build()
        .unwrap()
}

#[test]
fn failed_wave_rolls_back() {
    let mut net = Network::new();
    let id = net.add(bounded()).unwrap();
    net.set(id, "a", q("1 m")).unwrap();

    let err = net.set(id, "a", q("20 m")).unwrap_err();
    assert!(matches!(err, EngineError::OutOfRange { ref attribute, .. } if attribute == "b"));
    assert!(close(value(&net, id, "a"), 1.0));
    assert!(close(value(&net, id, "b"), 1.0));
}

#[test]
fn failed_wave_keeps_partial_writes_without_rollback() {
    let config = EngineConfig::from_yaml_str("rollback_on_error: false").unwrap();
    let mut net = Network::with_config(config);
    let id = net.add(bounded()).unwrap();
    net.set(id, "a", q("1 m")).unwrap();

    assert!(net.set(id, "a", q("20 m")).is_err());
    assert!(close(value(&net, id, "a"), 20.0));
    assert!(close(value(&net, id, "b"), 1.0));
}

#[test]
fn formula_errors_abort_the_wave() {
    let failing = Formula::new("failing", |_| Err(EngineError::formula("failing", "negative input")));
    let schema = SchemaBuilder::new("Pair")
        .guard("a", "m")
        .guard("b", "m")
        .link("b", failing, [("value", "a")])
        .build()
        .unwrap();
    let mut net = Network::new();
    let id = net.add(schema).unwrap();
    let err = net.set(id, "a", q("1 m")).unwrap_err();
    assert!(matches!(err, EngineError::Formula { .. }));
    assert_eq!(net.get(id, "a").unwrap(), None);
}

#[test]
fn long_chains_hit_the_depth_limit() {
    let names = ["a0", "a1", "a2", "a3", "a4", "a5"];
    let mut builder = SchemaBuilder::new("Chain");
    for name in names {
        builder = builder.guard(name, "m");
    }
    for pair in names.windows(2) {
        builder = builder.link(pair[1], identity(), [("value", pair[0])]);
    }
    let schema = Arc::new(builder.build().unwrap());

    let config = EngineConfig {
        max_wave_depth: 3,
        ..EngineConfig::default()
    };
    let mut net = Network::with_config(config);
    let id = net.add(Arc::clone(&schema)).unwrap();
    let err = net.set(id, "a0", q("1 m")).unwrap_err();
    assert!(matches!(err, EngineError::WaveDepthExceeded { limit: 3, .. }));
    assert_eq!(net.get(id, "a0").unwrap(), None);
    assert_eq!(net.get(id, "a3").unwrap(), None);

    let mut deep = Network::new();
    let id = deep.add(schema).unwrap();
    deep.set(id, "a0", q("1 m")).unwrap();
    assert!(close(value(&deep, id, "a5"), 1.0));
}

#[test]
fn constants_feed_formulas() {
    let scale = Formula::new("scale", |args| {
        Ok(Some(args.get("value")?.times(args.get("factor")?)?))
    });
    let mut net = Network::new();
    let id = net.add(pair()).unwrap();
    net.link(
        id,
        "b",
        scale,
        [
            ("value", Binding::local("a")),
            ("factor", Binding::constant(3.0)),
        ],
    )
    .unwrap();
    net.set(id, "a", q("2 m")).unwrap();
    assert!(close(value(&net, id, "b"), 6.0));
}

#[test]
fn citations_reach_the_bibliography() {
    let bib = Arc::new(Bibliography::new());
    let mut net = Network::new().with_sink(bib.clone());
    let id = net.add(pair()).unwrap();
    net.set(id, "a", q("2 m").with_citation("handbook_2004")).unwrap();
    assert_eq!(bib.cited(), ["handbook_2004"]);
}

#[test]
fn entity_display_lists_known_state() {
    let schema = SchemaBuilder::new("Pair")
        .guard("a", "m")
        .guard("b", "m")
        .logistic("name")
        .build()
        .unwrap();
    let mut net = Network::new();
    let id = net.add(schema).unwrap();
    net.set_logistic(id, "name", "probe").unwrap();
    net.set(id, "b", q("2 m")).unwrap();
    assert_eq!(
        net.entity(id).unwrap().to_string(),
        "<Pair with state {name: probe, b: 2 m}>"
    );
}

#[test]
fn unknown_formula_result_leaves_target_alone() {
    let undefined = Formula::new("undefined", |args| Ok(Some(args.get("a")?.scaled(f64::NAN))));
    let schema = SchemaBuilder::new("Partial")
        .guard("a", "m")
        .guard("b", "m")
        .link("b", undefined, [("a", "a")])
        .build()
        .unwrap();
    let mut net = Network::new();
    let id = net.add(schema).unwrap();
    net.set(id, "b", q("5 m")).unwrap();
    net.set(id, "a", q("1 m")).unwrap();
    assert!(close(value(&net, id, "b"), 5.0));
}
