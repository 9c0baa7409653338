//! Target addressing and the host contract.
//!
//! Targets live in the host's object model. The engine only keeps
//! [`SandwichKey`]s and reaches the host through [`TargetHost`] when it needs
//! a base value or has a composed value to apply.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Opaque handle of an animated object (small string key).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub String);

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        TargetId(s.to_string())
    }
}

impl From<String> for TargetId {
    fn from(s: String) -> Self {
        TargetId(s)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of an animated attribute. Each category composites independently,
/// so the same name under two kinds gets two sandwiches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    /// Document structure attributes (geometry, transforms).
    Structural,
    /// Cosmetic properties (fill, opacity, ...).
    Presentation,
    /// Anything else the host exposes (e.g. motion).
    Other,
}

/// Namespaced attribute name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey {
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
}

impl AttributeKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Identifies one sandwich: (target, kind, attribute).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SandwichKey {
    pub target: TargetId,
    pub kind: AttributeKind,
    pub attr: AttributeKey,
}

impl SandwichKey {
    pub fn new(target: TargetId, kind: AttributeKind, attr: AttributeKey) -> Self {
        Self { target, kind, attr }
    }
}

impl fmt::Display for SandwichKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}:{}", self.target, self.kind, self.attr)
    }
}

/// Host-side view of animated targets.
///
/// Adapters (document models, ECS bridges) implement this and pass it into
/// [`Engine::tick`](crate::Engine::tick). When a subscribed base value changes,
/// the host calls
/// [`Engine::notify_base_value_changed`](crate::Engine::notify_base_value_changed)
/// after the current tick returns.
pub trait TargetHost {
    /// The attribute's value in the absence of any animation.
    fn base_value(
        &self,
        target: &TargetId,
        kind: AttributeKind,
        attr: &AttributeKey,
    ) -> Option<Value>;

    /// Apply a composed value, or `None` to revert to the base value.
    fn set_animated_value(
        &mut self,
        target: &TargetId,
        kind: AttributeKind,
        attr: &AttributeKey,
        value: Option<&Value>,
    );

    /// Start reporting base-value changes for this attribute.
    fn subscribe_base_value_changed(
        &mut self,
        _target: &TargetId,
        _kind: AttributeKind,
        _attr: &AttributeKey,
    ) {
    }

    /// Stop reporting base-value changes for this attribute.
    fn unsubscribe_base_value_changed(
        &mut self,
        _target: &TargetId,
        _kind: AttributeKind,
        _attr: &AttributeKey,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_display() {
        let key = SandwichKey::new(
            "rect1".into(),
            AttributeKind::Structural,
            AttributeKey::namespaced("http://www.w3.org/1999/xlink", "href"),
        );
        assert_eq!(
            key.to_string(),
            "rect1:Structural:{http://www.w3.org/1999/xlink}href"
        );
        assert_eq!(AttributeKey::new("x").to_string(), "x");
    }

    #[test]
    fn kinds_split_sandwiches() {
        let fill = AttributeKey::new("fill");
        let a = SandwichKey::new("r".into(), AttributeKind::Structural, fill.clone());
        let b = SandwichKey::new("r".into(), AttributeKind::Presentation, fill);
        assert_ne!(a, b);
    }
}
