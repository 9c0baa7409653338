mod common;

use common::{approx, number, RecordingHost};
use serde_json::json;
use vizij_compositor_core::{
    AnimationDecl, AttributeKey, AttributeKind, CalcMode, Config, Engine, KeyPosition, Keyframes,
    SimpleSampler, Value,
};

fn decl(v: serde_json::Value) -> AnimationDecl {
    AnimationDecl::from_json(&v.to_string()).unwrap()
}

/// Register `decl` on `rect.<attr>`, activate, sample at `unit` and return the pushed value.
fn run(decl: &AnimationDecl, attr: &str, base: Option<Value>, unit: f32) -> Option<Value> {
    let mut host = match base {
        Some(v) => RecordingHost::with_base("rect", attr, v),
        None => RecordingHost::default(),
    };
    let mut engine = Engine::default();
    let key = AttributeKey::new(attr);
    let id = engine
        .register_decl(&host, "rect".into(), AttributeKind::Other, key, decl)
        .unwrap();
    engine.activate(id, 0.0);
    engine.sample_at(id, unit, 1.0, 0);
    engine.tick(unit, &mut host);
    host.current("rect", attr).cloned()
}

#[test]
fn identity_spline_tracks_unit_time() {
    let k = Keyframes::resolve(
        CalcMode::Spline,
        None,
        Some(&[0.0, 0.0, 1.0, 1.0]),
        2,
        || None,
        &Config::default(),
    )
    .unwrap();
    for i in 0..50 {
        let u = i as f32 / 50.0;
        match k.locate(u) {
            KeyPosition::Between { index: 0, fraction } => approx(fraction, u, 1e-3),
            other => panic!("unexpected {other:?} at {u}"),
        }
    }
}

#[test]
fn ease_in_out_spline_through_engine() {
    let d = decl(json!({
        "calcMode": "spline",
        "keySplines": [0.42, 0.0, 0.58, 1.0],
        "from": { "type": "Number", "data": 0.0 },
        "to": { "type": "Number", "data": 100.0 }
    }));
    let early = number(run(&d, "x", None, 0.25).as_ref());
    let mid = number(run(&d, "x", None, 0.5).as_ref());
    let late = number(run(&d, "x", None, 0.75).as_ref());
    assert!(early < 25.0, "early={early}");
    approx(mid, 50.0, 0.5);
    assert!(late > 75.0, "late={late}");
}

#[test]
fn discrete_hits_every_value_and_ends_on_last() {
    let s = SimpleSampler::new(
        vec![Value::Text("a".into()), Value::Text("b".into())],
        CalcMode::Linear,
        None,
        None,
        false,
        &Config::default(),
    )
    .unwrap();
    // Text cannot blend: linear holds the left value until the end.
    assert_eq!(s.sample(0.7, 0), Value::Text("a".into()));
    assert_eq!(s.sample(1.0, 0), Value::Text("b".into()));

    let d = decl(json!({
        "calcMode": "discrete",
        "values": [
            { "type": "Number", "data": 1.0 },
            { "type": "Number", "data": 2.0 },
            { "type": "Number", "data": 3.0 }
        ]
    }));
    approx(number(run(&d, "x", None, 0.0).as_ref()), 1.0, 0.0);
    approx(number(run(&d, "x", None, 0.5).as_ref()), 2.0, 0.0);
    approx(number(run(&d, "x", None, 1.0).as_ref()), 3.0, 0.0);
}

#[test]
fn explicit_key_times_shape_linear_timing() {
    let d = decl(json!({
        "keyTimes": [0.0, 0.8, 1.0],
        "values": [
            { "type": "Number", "data": 0.0 },
            { "type": "Number", "data": 8.0 },
            { "type": "Number", "data": 10.0 }
        ]
    }));
    approx(number(run(&d, "x", None, 0.4).as_ref()), 4.0, 1e-5);
    approx(number(run(&d, "x", None, 0.9).as_ref()), 9.0, 1e-5);
}

#[test]
fn paced_color_uses_rgb_distance() {
    let d = decl(json!({
        "calcMode": "paced",
        "values": [
            { "type": "Color", "data": [0.0, 0.0, 0.0, 1.0] },
            { "type": "Color", "data": [0.0, 0.0, 0.2, 1.0] },
            { "type": "Color", "data": [0.0, 0.0, 1.0, 1.0] }
        ]
    }));
    match run(&d, "fill", None, 0.5) {
        Some(Value::Color(c)) => approx(c[2], 0.5, 1e-5),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn paced_motion_path_reaches_arc_length_midpoint() {
    let d = decl(json!({
        "calcMode": "paced",
        "sampler": {
            "kind": "motion",
            "path": [
                { "cmd": "moveTo", "x": 0.0, "y": 0.0 },
                { "cmd": "lineTo", "x": 10.0, "y": 0.0 }
            ]
        }
    }));
    match run(&d, "motion", None, 0.5) {
        Some(Value::Motion { x, y, angle }) => {
            approx(x, 5.0, 1e-3);
            approx(y, 0.0, 1e-6);
            approx(angle, 0.0, 0.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn motion_to_animation_starts_at_current_position() {
    let d = decl(json!({
        "to": { "type": "Point", "data": [10.0, 10.0] },
        "sampler": { "kind": "motion", "rotate": "auto" }
    }));
    let base = Value::Motion {
        x: 0.0,
        y: 10.0,
        angle: 0.0,
    };
    match run(&d, "motion", Some(base), 0.5) {
        Some(Value::Motion { x, y, angle }) => {
            approx(x, 5.0, 1e-3);
            approx(y, 10.0, 1e-3);
            approx(angle, 0.0, 1e-3);
        }
        other => panic!("unexpected {other:?}"),
    }
}

fn translate(x: f32, y: f32) -> serde_json::Value {
    json!({
        "type": "Transform",
        "data": [{ "kind": "translate", "components": [x, y, 0.0] }]
    })
}

#[test]
fn paced_translate_paces_components_separately() {
    let d = decl(json!({
        "calcMode": "paced",
        "sampler": { "kind": "transform", "type": "translate" },
        "values": [
            translate(0.0, 0.0),
            translate(10.0, 0.0),
            translate(10.0, 30.0)
        ]
    }));
    match run(&d, "transform", None, 0.5) {
        Some(Value::Transform(list)) => {
            assert_eq!(list.len(), 1);
            approx(list[0].components[0], 5.0, 1e-5);
            approx(list[0].components[1], 15.0, 1e-5);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn malformed_json_declarations() {
    assert!(AnimationDecl::from_json("{ not json").is_err());

    let engine = Engine::default();
    let bad_splines = decl(json!({
        "calcMode": "spline",
        "keySplines": [0.0, 0.0, 1.0],
        "values": [
            { "type": "Number", "data": 0.0 },
            { "type": "Number", "data": 1.0 }
        ]
    }));
    let err = engine.build_animation(&bad_splines, None).unwrap_err();
    assert_eq!(err.attribute(), Some("keySplines"));

    let bad_times = decl(json!({
        "keyTimes": [0.0, 0.5],
        "values": [
            { "type": "Number", "data": 0.0 },
            { "type": "Number", "data": 1.0 }
        ]
    }));
    let err = engine.build_animation(&bad_times, None).unwrap_err();
    assert_eq!(err.attribute(), Some("keyTimes"));

    let nothing = decl(json!({ "additive": true }));
    let err = engine.build_animation(&nothing, None).unwrap_err();
    assert_eq!(err.attribute(), Some("values"));
}
