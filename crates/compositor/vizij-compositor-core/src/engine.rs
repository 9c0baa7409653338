//! Engine: sandwich registry and the per-frame compositing pass.
//!
//! Methods:
//! - register / register_decl / unregister
//! - activate / deactivate / remove_fill (timing source notifications)
//! - sample_at / sample_last_value (raw value updates)
//! - tick (compose dirty sandwiches, push to the host)
//! - pause / resume, notify_base_value_changed, inspection accessors
//!
//! Calls addressed to an unknown id are ignored and logged.

use crate::animation::Animation;
use crate::config::Config;
use crate::decl::AnimationDecl;
use crate::error::Result;
use crate::ids::{AnimationId, IdAllocator};
use crate::sandwich::SandwichStore;
use crate::target::{AttributeKey, AttributeKind, SandwichKey, TargetHost, TargetId};
use crate::value::Value;

/// Registry of animation sandwiches keyed by (target, kind, attribute).
#[derive(Debug, Default)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    store: SandwichStore,
    paused: bool,
    time: f32,
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Build an animation against this engine's configuration.
    pub fn build_animation(
        &self,
        decl: &AnimationDecl,
        underlying: Option<&Value>,
    ) -> Result<Animation> {
        Animation::build(decl, underlying, &self.cfg)
    }

    /// Add `animation` to the sandwich of `(target, kind, attr)`.
    ///
    /// New animations are inactive and sit directly below the contributing
    /// block, which puts them on top when nothing is contributing yet.
    pub fn register(
        &mut self,
        target: TargetId,
        kind: AttributeKind,
        attr: AttributeKey,
        animation: Animation,
    ) -> AnimationId {
        let id = self.ids.alloc_animation();
        let key = SandwichKey::new(target, kind, attr);
        log::debug!("register {id} on {key}");
        self.store.insert(id, key, animation);
        id
    }

    /// Build from a declaration, seeding to-animations from the host's base
    /// value, and register the result.
    pub fn register_decl(
        &mut self,
        host: &dyn TargetHost,
        target: TargetId,
        kind: AttributeKind,
        attr: AttributeKey,
        decl: &AnimationDecl,
    ) -> Result<AnimationId> {
        let base = host.base_value(&target, kind, &attr);
        let animation = self.build_animation(decl, base.as_ref())?;
        Ok(self.register(target, kind, attr, animation))
    }

    /// Remove an animation and hand it back, reset to inactive.
    pub fn unregister(&mut self, id: AnimationId) -> Option<Animation> {
        let Some(node) = self.store.remove(id) else {
            log::warn!("unregister: unknown animation {id}");
            return None;
        };
        log::debug!("unregister {id} from {}", node.key);
        let mut anim = node.anim;
        anim.active = false;
        anim.frozen = false;
        anim.dirty = false;
        anim.composed = None;
        Some(anim)
    }

    /// The animation started contributing at `begin_time`.
    pub fn activate(&mut self, id: AnimationId, begin_time: f32) {
        let Some(anim) = self.store.animation_mut(id) else {
            log::warn!("activate: unknown animation {id}");
            return;
        };
        anim.active = true;
        anim.frozen = false;
        anim.begin_time = begin_time;
        log::debug!("activate {id} at {begin_time}");
        self.store.move_to_top(id);
        self.store.push_down(id);
        self.store.mark_dirty(id);
    }

    /// The animation's interval ended. With `freeze` it keeps its last value
    /// and its priority; otherwise it drops out of composition.
    pub fn deactivate(&mut self, id: AnimationId, freeze: bool) {
        let Some(anim) = self.store.animation_mut(id) else {
            log::warn!("deactivate: unknown animation {id}");
            return;
        };
        anim.active = false;
        log::debug!("deactivate {id} (freeze={freeze})");
        if freeze {
            anim.frozen = true;
            self.store.move_to_top(id);
            self.store.push_down(id);
            self.store.mark_dirty(id);
        } else {
            anim.frozen = false;
            anim.begin_time = f32::NEG_INFINITY;
            anim.clear_value();
            anim.composed = None;
            self.store.mark_dirty(id);
            self.store.move_to_bottom(id);
        }
        self.flag_update(id);
    }

    /// Revoke a fill: the animation stops contributing and loses its value.
    pub fn remove_fill(&mut self, id: AnimationId) {
        let Some(anim) = self.store.animation_mut(id) else {
            log::warn!("remove_fill: unknown animation {id}");
            return;
        };
        anim.active = false;
        anim.frozen = false;
        anim.clear_value();
        anim.composed = None;
        log::debug!("remove_fill {id}");
        self.store.mark_dirty(id);
        self.store.move_to_bottom(id);
        self.flag_update(id);
    }

    fn flag_update(&mut self, id: AnimationId) {
        let Some(key) = self.store.key_of(id).cloned() else {
            return;
        };
        if let Some(sw) = self.store.sandwich_mut(&key) {
            sw.should_update = true;
        }
    }

    /// Sample at `local_time` within a simple duration of `local_duration`.
    ///
    /// Indefinite or non-positive durations sample the start of the interval.
    pub fn sample_at(
        &mut self,
        id: AnimationId,
        local_time: f32,
        local_duration: f32,
        iteration: u32,
    ) {
        let unit_time = if local_duration.is_finite() && local_duration > 0.0 {
            (local_time / local_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.sample_unit(id, unit_time, iteration);
    }

    /// Sample the final keyframe of `iteration` (end of a repeat or fill).
    pub fn sample_last_value(&mut self, id: AnimationId, iteration: u32) {
        self.sample_unit(id, 1.0, iteration);
    }

    fn sample_unit(&mut self, id: AnimationId, unit_time: f32, iteration: u32) {
        let Some(anim) = self.store.animation_mut(id) else {
            log::warn!("sample: unknown animation {id}");
            return;
        };
        if anim.sample(unit_time, iteration) {
            self.store.mark_dirty(id);
        }
    }

    /// Compose every sandwich that needs it and push results to `host`.
    ///
    /// Returns `Some(0.0)` while any animation is active (sample again next
    /// frame) and `None` when nothing will change without an external event.
    pub fn tick(&mut self, time: f32, host: &mut dyn TargetHost) -> Option<f32> {
        if self.paused {
            return None;
        }
        self.time = time;
        let keys: Vec<SandwichKey> = self.store.keys().cloned().collect();
        for key in keys {
            let Some(sw) = self.store.sandwich(&key) else {
                continue;
            };
            let top = sw.top;
            let listening = sw.listening;
            let dirty = top
                .and_then(|t| self.store.animation(t))
                .map_or(false, Animation::is_dirty);
            if !sw.should_update && !dirty {
                continue;
            }

            let Some(top) = top else {
                if listening {
                    host.unsubscribe_base_value_changed(&key.target, key.kind, &key.attr);
                }
                log::trace!("tick {time}: {key} emptied");
                host.set_animated_value(&key.target, key.kind, &key.attr, None);
                self.store.drop_sandwich(&key);
                continue;
            };

            let value = self.store.composed_value(top, &*host);
            let wants_base = self
                .store
                .lowest_contributor(&key)
                .and_then(|id| self.store.animation(id))
                .map_or(false, Animation::uses_underlying_value);
            if wants_base != listening {
                if wants_base {
                    log::debug!("subscribe base value of {key}");
                    host.subscribe_base_value_changed(&key.target, key.kind, &key.attr);
                } else {
                    log::debug!("unsubscribe base value of {key}");
                    host.unsubscribe_base_value_changed(&key.target, key.kind, &key.attr);
                }
            }
            log::trace!("tick {time}: {key} = {value:?}");
            host.set_animated_value(&key.target, key.kind, &key.attr, value.as_ref());

            if let Some(sw) = self.store.sandwich_mut(&key) {
                sw.should_update = false;
                sw.listening = wants_base;
            }
            if let Some(anim) = self.store.animation_mut(top) {
                anim.dirty = false;
            }
        }
        self.store.any_active().then_some(0.0)
    }

    /// A subscribed base value changed. Re-seeds to-animations and schedules
    /// the sandwich for the next tick.
    pub fn notify_base_value_changed(
        &mut self,
        host: &dyn TargetHost,
        target: &TargetId,
        kind: AttributeKind,
        attr: &AttributeKey,
    ) {
        let key = SandwichKey::new(target.clone(), kind, attr.clone());
        let Some(sw) = self.store.sandwich_mut(&key) else {
            log::debug!("base value change on {key} without animations");
            return;
        };
        sw.should_update = true;
        let base = host.base_value(target, kind, attr);
        for id in self.store.order(&key) {
            let refreshed = self
                .store
                .animation_mut(id)
                .map_or(false, |a| a.refresh_underlying(base.as_ref()));
            if refreshed {
                self.store.mark_dirty(id);
            }
        }
        if let Some(lowest) = self.store.lowest_contributor(&key) {
            if self.store.animation(lowest).map_or(false, |a| a.uses_base_value) {
                self.store.mark_dirty(lowest);
            }
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time passed to the last unpaused tick.
    #[inline]
    pub fn current_time(&self) -> f32 {
        self.time
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.store.animation(id)
    }

    /// Composed value of `id` as of the last tick. Animations that are
    /// neither active nor frozen have none.
    pub fn composed_value(&self, id: AnimationId) -> Option<&Value> {
        self.store
            .animation(id)
            .filter(|a| a.contributes())
            .and_then(|a| a.composed.as_ref())
    }

    /// Members of a sandwich, bottom to top.
    pub fn sandwich_order(
        &self,
        target: &TargetId,
        kind: AttributeKind,
        attr: &AttributeKey,
    ) -> Vec<AnimationId> {
        self.store
            .order(&SandwichKey::new(target.clone(), kind, attr.clone()))
    }

    pub fn animation_count(&self) -> usize {
        self.store.len()
    }

    pub fn sandwich_count(&self) -> usize {
        self.store.sandwich_count()
    }
}
