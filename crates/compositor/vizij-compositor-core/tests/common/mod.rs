#![allow(dead_code)]
use std::cell::Cell;

use hashbrown::{HashMap, HashSet};
use vizij_compositor_core::{AttributeKey, AttributeKind, TargetHost, TargetId, Value};

pub fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

pub fn number(v: Option<&Value>) -> f32 {
    match v {
        Some(Value::Number(n)) => *n,
        other => panic!("expected a number, got {other:?}"),
    }
}

fn slot(target: &TargetId, attr: &AttributeKey) -> String {
    format!("{target}.{attr}")
}

/// Host that records every pushed value and subscription change.
#[derive(Default)]
pub struct RecordingHost {
    pub base: HashMap<String, Value>,
    pub animated: HashMap<String, Value>,
    pub pushes: Vec<(String, Option<Value>)>,
    pub subscribed: HashSet<String>,
    pub base_reads: Cell<usize>,
}

impl RecordingHost {
    pub fn with_base(target: &str, attr: &str, value: Value) -> Self {
        let mut host = Self::default();
        host.base.insert(format!("{target}.{attr}"), value);
        host
    }

    pub fn set_base(&mut self, target: &str, attr: &str, value: Value) {
        self.base.insert(format!("{target}.{attr}"), value);
    }

    /// Animated value if one is applied, else the base value.
    pub fn current(&self, target: &str, attr: &str) -> Option<&Value> {
        let key = format!("{target}.{attr}");
        self.animated.get(&key).or_else(|| self.base.get(&key))
    }

    pub fn last_push(&self) -> Option<&Option<Value>> {
        self.pushes.last().map(|(_, v)| v)
    }
}

impl TargetHost for RecordingHost {
    fn base_value(
        &self,
        target: &TargetId,
        _kind: AttributeKind,
        attr: &AttributeKey,
    ) -> Option<Value> {
        self.base_reads.set(self.base_reads.get() + 1);
        self.base.get(&slot(target, attr)).cloned()
    }

    fn set_animated_value(
        &mut self,
        target: &TargetId,
        _kind: AttributeKind,
        attr: &AttributeKey,
        value: Option<&Value>,
    ) {
        let key = slot(target, attr);
        match value {
            Some(v) => {
                self.animated.insert(key.clone(), v.clone());
            }
            None => {
                self.animated.remove(&key);
            }
        }
        self.pushes.push((key, value.cloned()));
    }

    fn subscribe_base_value_changed(
        &mut self,
        target: &TargetId,
        _kind: AttributeKind,
        attr: &AttributeKey,
    ) {
        self.subscribed.insert(slot(target, attr));
    }

    fn unsubscribe_base_value_changed(
        &mut self,
        target: &TargetId,
        _kind: AttributeKind,
        attr: &AttributeKey,
    ) {
        self.subscribed.remove(&slot(target, attr));
    }
}
