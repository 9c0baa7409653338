//! Sandwich storage: per-attribute doubly linked lists of animations.
//!
//! Layout of one sandwich, bottom to top: inactive animations first, then the
//! contributing (active or frozen) ones in priority order. The top therefore
//! contributes whenever anything in the sandwich does.
//!
//! Nodes live in one arena keyed by [`AnimationId`]; links are ids, so a stale
//! id is simply a failed lookup.

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::animation::Animation;
use crate::ids::AnimationId;
use crate::target::{SandwichKey, TargetHost};
use crate::value::{AnimatableValue, Value};

#[derive(Debug)]
pub(crate) struct Node {
    pub anim: Animation,
    pub key: SandwichKey,
    pub lower: Option<AnimationId>,
    pub higher: Option<AnimationId>,
}

/// Per-attribute stack bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct Sandwich {
    pub top: Option<AnimationId>,
    pub bottom: Option<AnimationId>,
    /// Push a value on the next tick even if the top is clean.
    pub should_update: bool,
    /// Whether the host is reporting base-value changes to us.
    pub listening: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SandwichStore {
    nodes: HashMap<AnimationId, Node>,
    sandwiches: IndexMap<SandwichKey, Sandwich>,
}

impl SandwichStore {
    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.nodes.get(&id).map(|n| &n.anim)
    }

    pub fn animation_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.nodes.get_mut(&id).map(|n| &mut n.anim)
    }

    pub fn key_of(&self, id: AnimationId) -> Option<&SandwichKey> {
        self.nodes.get(&id).map(|n| &n.key)
    }

    pub fn sandwich(&self, key: &SandwichKey) -> Option<&Sandwich> {
        self.sandwiches.get(key)
    }

    pub fn sandwich_mut(&mut self, key: &SandwichKey) -> Option<&mut Sandwich> {
        self.sandwiches.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SandwichKey> {
        self.sandwiches.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn sandwich_count(&self) -> usize {
        self.sandwiches.len()
    }

    pub fn any_active(&self) -> bool {
        self.nodes.values().any(|n| n.anim.active)
    }

    /// Drop a sandwich's bookkeeping. Only valid once it is empty.
    pub fn drop_sandwich(&mut self, key: &SandwichKey) {
        if let Some(sw) = self.sandwiches.get(key) {
            if sw.top.is_none() {
                self.sandwiches.shift_remove(key);
            }
        }
    }

    fn contributes(&self, id: AnimationId) -> bool {
        self.nodes.get(&id).map_or(false, |n| n.anim.contributes())
    }

    /// Insert `anim` at the top of the inactive block of `key`'s sandwich.
    pub fn insert(&mut self, id: AnimationId, key: SandwichKey, anim: Animation) {
        self.sandwiches.entry(key.clone()).or_default();
        self.nodes.insert(
            id,
            Node {
                anim,
                key: key.clone(),
                lower: None,
                higher: None,
            },
        );
        match self.lowest_contributor(&key) {
            Some(lowest) => {
                let below = self.nodes.get(&lowest).and_then(|n| n.lower);
                self.link_above(id, below);
            }
            None => {
                let top = self.sandwiches.get(&key).and_then(|s| s.top);
                self.link_above(id, top);
            }
        }
    }

    /// Unlink and return `id`'s node. The sandwich entry stays, flagged for
    /// update, so the next tick can push the new state (or "no value").
    pub fn remove(&mut self, id: AnimationId) -> Option<Node> {
        let (lower, higher, contributed) = {
            let n = self.nodes.get(&id)?;
            (n.lower, n.higher, n.anim.contributes())
        };
        self.unlink(id);
        let node = self.nodes.remove(&id)?;
        match higher {
            Some(h) => self.mark_dirty(h),
            // Removed the top: the node below takes over.
            None => {
                if let Some(l) = lower {
                    self.mark_dirty(l);
                }
            }
        }
        if let Some(sw) = self.sandwiches.get_mut(&node.key) {
            if contributed || sw.top.is_none() {
                sw.should_update = true;
            }
        }
        Some(node)
    }

    fn unlink(&mut self, id: AnimationId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let (lower, higher, key) = (node.lower, node.higher, node.key.clone());
        if let Some(l) = lower.and_then(|l| self.nodes.get_mut(&l)) {
            l.higher = higher;
        }
        if let Some(h) = higher.and_then(|h| self.nodes.get_mut(&h)) {
            h.lower = lower;
        }
        if let Some(sw) = self.sandwiches.get_mut(&key) {
            if sw.top == Some(id) {
                sw.top = lower;
            }
            if sw.bottom == Some(id) {
                sw.bottom = higher;
            }
        }
        if let Some(n) = self.nodes.get_mut(&id) {
            n.lower = None;
            n.higher = None;
        }
    }

    /// Link an unlinked `id` directly above `below`, or at the bottom if `None`.
    fn link_above(&mut self, id: AnimationId, below: Option<AnimationId>) {
        let Some(key) = self.nodes.get(&id).map(|n| n.key.clone()) else {
            return;
        };
        let higher = match below {
            Some(b) => self.nodes.get(&b).and_then(|n| n.higher),
            None => self.sandwiches.get(&key).and_then(|s| s.bottom),
        };
        if let Some(n) = self.nodes.get_mut(&id) {
            n.lower = below;
            n.higher = higher;
        }
        if let Some(b) = below.and_then(|b| self.nodes.get_mut(&b)) {
            b.higher = Some(id);
        }
        if let Some(h) = higher.and_then(|h| self.nodes.get_mut(&h)) {
            h.lower = Some(id);
        }
        if let Some(sw) = self.sandwiches.get_mut(&key) {
            if below.is_none() {
                sw.bottom = Some(id);
            }
            if higher.is_none() {
                sw.top = Some(id);
            }
        }
    }

    /// Relink `id` via `relink`, then invalidate both its old and new upper chains.
    fn relocate(&mut self, id: AnimationId, relink: impl FnOnce(&mut Self)) {
        let old_higher = self.nodes.get(&id).and_then(|n| n.higher);
        self.unlink(id);
        relink(self);
        if let Some(h) = old_higher {
            self.mark_dirty(h);
        }
        self.mark_dirty(id);
    }

    pub fn move_to_top(&mut self, id: AnimationId) {
        let Some(key) = self.key_of(id).cloned() else {
            return;
        };
        self.relocate(id, |s| {
            let top = s.sandwiches.get(&key).and_then(|sw| sw.top);
            s.link_above(id, top);
        });
    }

    pub fn move_to_bottom(&mut self, id: AnimationId) {
        self.relocate(id, |s| s.link_above(id, None));
    }

    /// Sink `id` below contributing neighbours that outrank it: a later begin
    /// time, or the same begin time and later document order.
    pub fn push_down(&mut self, id: AnimationId) {
        loop {
            let Some(node) = self.nodes.get(&id) else {
                return;
            };
            let begin = node.anim.begin_time;
            let Some(lower) = node.lower else {
                return;
            };
            let Some(l) = self.nodes.get(&lower).filter(|l| l.anim.contributes()) else {
                return;
            };
            let outranks = l.anim.begin_time > begin || (l.anim.begin_time == begin && id < lower);
            if !outranks {
                return;
            }
            let below = l.lower;
            log::trace!("sandwich: {id} sinks below {lower}");
            self.relocate(id, |s| s.link_above(id, below));
        }
    }

    /// Mark `id` dirty and propagate upward until a layer that occludes
    /// everything beneath it, or one that is already dirty.
    pub fn mark_dirty(&mut self, id: AnimationId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.anim.dirty = true;
        let mut cursor = node.higher;
        while let Some(h) = cursor {
            let Some(n) = self.nodes.get_mut(&h) else {
                break;
            };
            if n.anim.dirty || occludes(&n.anim) {
                break;
            }
            n.anim.dirty = true;
            cursor = n.higher;
        }
    }

    /// Topmost-first scan for the lowest contributing animation.
    pub fn lowest_contributor(&self, key: &SandwichKey) -> Option<AnimationId> {
        let mut cursor = self.sandwiches.get(key)?.top;
        let mut lowest = None;
        while let Some(id) = cursor {
            let node = self.nodes.get(&id)?;
            if !node.anim.contributes() {
                break;
            }
            lowest = Some(id);
            cursor = node.lower;
        }
        lowest
    }

    /// Sandwich members, bottom to top.
    pub fn order(&self, key: &SandwichKey) -> Vec<AnimationId> {
        let mut out = Vec::new();
        let mut cursor = self.sandwiches.get(key).and_then(|s| s.bottom);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.nodes.get(&id).and_then(|n| n.higher);
        }
        out
    }

    /// Composed value of `id`, recomputed through lower layers when dirty.
    pub fn composed_value(&mut self, id: AnimationId, host: &dyn TargetHost) -> Option<Value> {
        let node = self.nodes.get(&id)?;
        if !node.anim.contributes() {
            return None;
        }
        if !node.anim.dirty {
            return node.anim.composed.clone();
        }
        let lower_id = node.lower.filter(|&l| self.contributes(l));
        let mut uses_base = false;
        let lower = if occludes(&node.anim) {
            None
        } else if let Some(l) = lower_id {
            self.composed_value(l, host)
        } else {
            uses_base = true;
            let key = &node.key;
            host.base_value(&key.target, key.kind, &key.attr)
        };

        let node = self.nodes.get_mut(&id)?;
        let anim = &mut node.anim;
        let composed = match &anim.value {
            Some(v) => Some(v.interpolate(None, 0.0, lower.as_ref(), 1)),
            None => lower,
        };
        anim.uses_base_value = uses_base;
        anim.composed = composed.clone();
        anim.dirty = false;
        composed
    }
}

/// A non-additive layer with a value hides everything beneath it.
fn occludes(anim: &Animation) -> bool {
    anim.will_replace() && anim.value.is_some()
}
