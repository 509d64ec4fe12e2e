//! Group registry: one shared off-screen target and one leader per group key.
//!
//! A [`Group`] exists exactly while at least one window claims its key. Its
//! leader is a plain field, not an option, so "non-empty group without a
//! leader" cannot be represented. The target is created on first join and
//! disposed on last leave; it is never resized, only disposed and recreated.

use std::collections::BTreeMap;

use pane_config::CompositorConfig;
use pane_core::{RenderTargets, TargetId};

use crate::window::WindowId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    target: Option<TargetId>,
    leader: WindowId,
    /// Join order; the first remaining member inherits leadership
    members: Vec<WindowId>,
    any_visible: bool,
}

impl Group {
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn leader(&self) -> WindowId {
        self.leader
    }

    pub fn members(&self) -> &[WindowId] {
        &self.members
    }

    /// OR of every member's visibility this frame.
    pub fn any_visible(&self) -> bool {
        self.any_visible
    }
}

/// Outcome of [`GroupRegistry::leave`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leave {
    /// A non-leader left; nothing else changed.
    Member,
    /// The leader left and this member took over the existing target.
    Promoted(WindowId),
    /// The last member left; the target was disposed and the group removed.
    Disbanded,
    /// The member was not in that group. Caller bug.
    NotMember,
}

pub struct GroupRegistry {
    groups: BTreeMap<String, Group>,
    target_size: [u32; 2],
    label_prefix: String,
}

fn new_target<G: RenderTargets>(prefix: &str, size: [u32; 2], key: &str, gfx: &mut G) -> TargetId {
    let target = gfx.create_target(&format!("{prefix}{key}"), size[0], size[1]);
    tracing::debug!(group = key, target_id = target.0, "created group target");
    target
}

fn is_stale<G: RenderTargets>(target: Option<TargetId>, gfx: &G) -> bool {
    target.is_none_or(|t| !gfx.is_target_live(t))
}

impl GroupRegistry {
    pub fn new(config: &CompositorConfig) -> Self {
        Self {
            groups: BTreeMap::new(),
            target_size: [config.target_width, config.target_height],
            label_prefix: config.target_label_prefix.clone(),
        }
    }

    pub fn target_size(&self) -> [u32; 2] {
        self.target_size
    }

    /// Add `member` to `key`'s group, creating the group and its target if needed.
    ///
    /// A missing or dead target is recreated. `member` becomes leader when the
    /// group is new or `force_leader` is set.
    pub fn join<G: RenderTargets>(
        &mut self,
        key: &str,
        member: WindowId,
        force_leader: bool,
        gfx: &mut G,
    ) {
        let Self {
            groups,
            target_size,
            label_prefix,
        } = self;

        match groups.get_mut(key) {
            Some(group) => {
                if is_stale(group.target, gfx) {
                    group.target = Some(new_target(label_prefix, *target_size, key, gfx));
                }
                if !group.members.contains(&member) {
                    group.members.push(member);
                }
                if force_leader && group.leader != member {
                    tracing::info!(
                        group = key,
                        from = ?group.leader,
                        to = ?member,
                        "leadership forced"
                    );
                    group.leader = member;
                }
            }
            None => {
                let target = new_target(label_prefix, *target_size, key, gfx);
                groups.insert(
                    key.to_string(),
                    Group {
                        target: Some(target),
                        leader: member,
                        members: vec![member],
                        any_visible: false,
                    },
                );
            }
        }
        debug_assert!(self.is_consistent());
    }

    pub fn leave<G: RenderTargets>(&mut self, key: &str, member: WindowId, gfx: &mut G) -> Leave {
        let Some(group) = self.groups.get_mut(key) else {
            tracing::warn!(group = key, ?member, "leave from unknown group");
            return Leave::NotMember;
        };
        let Some(pos) = group.members.iter().position(|m| *m == member) else {
            tracing::warn!(group = key, ?member, "leave by non-member");
            return Leave::NotMember;
        };
        group.members.remove(pos);

        let outcome = if group.members.is_empty() {
            if let Some(target) = group.target {
                gfx.dispose_target(target);
            }
            self.groups.remove(key);
            tracing::debug!(group = key, "group disbanded");
            Leave::Disbanded
        } else if group.leader == member {
            group.leader = group.members[0];
            tracing::info!(group = key, from = ?member, to = ?group.leader, "leader promoted");
            Leave::Promoted(group.leader)
        } else {
            Leave::Member
        };
        debug_assert!(self.is_consistent());
        outcome
    }

    /// Hand leadership to an existing member without touching the target.
    pub fn force_leader(&mut self, key: &str, member: WindowId) -> bool {
        match self.groups.get_mut(key) {
            Some(group) if group.members.contains(&member) => {
                if group.leader != member {
                    tracing::info!(
                        group = key,
                        from = ?group.leader,
                        to = ?member,
                        "leadership forced"
                    );
                    group.leader = member;
                }
                true
            }
            _ => false,
        }
    }

    /// Device-reset hook. Only the leader recreates a dead target.
    pub fn on_target_lost<G: RenderTargets>(
        &mut self,
        key: &str,
        member: WindowId,
        gfx: &mut G,
    ) -> bool {
        let Self {
            groups,
            target_size,
            label_prefix,
        } = self;
        let Some(group) = groups.get_mut(key) else {
            return false;
        };
        if group.leader != member || !is_stale(group.target, gfx) {
            return false;
        }
        group.target = Some(new_target(label_prefix, *target_size, key, gfx));
        tracing::info!(group = key, "group target recreated after device loss");
        true
    }

    /// Make sure a live target exists, recreating it if needed.
    pub fn ensure_target<G: RenderTargets>(&mut self, key: &str, gfx: &mut G) -> Option<TargetId> {
        let Self {
            groups,
            target_size,
            label_prefix,
        } = self;
        let group = groups.get_mut(key)?;
        if is_stale(group.target, gfx) {
            group.target = Some(new_target(label_prefix, *target_size, key, gfx));
        }
        group.target
    }

    /// Scene teardown. If `member` leads its group, the target is disposed
    /// unconditionally and the group removed.
    pub fn scene_end<G: RenderTargets>(
        &mut self,
        key: &str,
        member: WindowId,
        gfx: &mut G,
    ) -> bool {
        if !self.is_leader(key, member) {
            return false;
        }
        if let Some(group) = self.groups.remove(key) {
            if let Some(target) = group.target {
                gfx.dispose_target(target);
            }
        }
        tracing::debug!(group = key, "group torn down with scene");
        true
    }

    /// Clear every visibility aggregate. Run once per frame before any update.
    pub fn begin_frame(&mut self) {
        for group in self.groups.values_mut() {
            group.any_visible = false;
        }
    }

    pub fn fold_visibility(&mut self, key: &str, visible: bool) {
        if let Some(group) = self.groups.get_mut(key) {
            group.any_visible |= visible;
        }
    }

    pub fn any_visible(&self, key: &str) -> bool {
        self.groups.get(key).is_some_and(|g| g.any_visible)
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    pub fn target(&self, key: &str) -> Option<TargetId> {
        self.groups.get(key).and_then(|g| g.target)
    }

    pub fn leader(&self, key: &str) -> Option<WindowId> {
        self.groups.get(key).map(|g| g.leader)
    }

    pub fn is_leader(&self, key: &str, member: WindowId) -> bool {
        self.leader(key) == Some(member)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every group is non-empty, has no duplicate members, and is led by one of them.
    pub fn is_consistent(&self) -> bool {
        self.groups.values().all(|g| {
            let mut sorted = g.members.clone();
            sorted.sort();
            sorted.dedup();
            !g.members.is_empty()
                && sorted.len() == g.members.len()
                && g.members.contains(&g.leader)
        })
    }
}
