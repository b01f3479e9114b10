//! Animation scheduler
//!
//! Owns every live transition and advances them each frame. Two rules hold at
//! all times:
//!
//! - a [`Channel`] is driven by at most one live transition; starting a new one
//!   stops the previous occupant first
//! - a continuation is handed back from [`AnimationScheduler::tick`] only when
//!   every member of its composite finished on its own; stopping any member
//!   drops it unfired
//!
//! Continuations are plain values of type `C`, so a caller decides what
//! "completion" means (an enum of follow-up actions, a boxed closure, ...).

use crate::channel::{Channel, ChannelValues};
use crate::spring::Spring;
use crate::tween::Tween;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to one running transition on one channel
    pub struct TransitionId;
    struct GroupId;
}

/// How a transition moves its value
#[derive(Clone, Debug)]
pub enum Motion {
    Tween(Tween),
    Spring(Spring),
}

impl Motion {
    fn advance(&mut self, dt: Duration) {
        match self {
            Motion::Tween(tween) => tween.tick(dt.as_secs_f32() * 1000.0),
            Motion::Spring(spring) => spring.step(dt.as_secs_f32()),
        }
    }

    pub fn value(&self) -> f32 {
        match self {
            Motion::Tween(tween) => tween.value(),
            Motion::Spring(spring) => spring.value(),
        }
    }

    pub fn target(&self) -> f32 {
        match self {
            Motion::Tween(tween) => tween.target(),
            Motion::Spring(spring) => spring.target(),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            Motion::Tween(tween) => tween.is_finished(),
            Motion::Spring(spring) => spring.is_settled(),
        }
    }
}

impl From<Tween> for Motion {
    fn from(tween: Tween) -> Self {
        Motion::Tween(tween)
    }
}

impl From<Spring> for Motion {
    fn from(spring: Spring) -> Self {
        Motion::Spring(spring)
    }
}

/// The per-channel handles started by one logical operation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeHandle {
    members: SmallVec<[(Channel, TransitionId); 2]>,
}

impl CompositeHandle {
    /// Handle driving `channel`, if this composite touched it
    pub fn get(&self, channel: Channel) -> Option<TransitionId> {
        self.members
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, TransitionId)> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

struct Entry {
    channel: Channel,
    motion: Motion,
    group: Option<GroupId>,
}

struct Group<C> {
    pending: SmallVec<[TransitionId; 2]>,
    continuation: Option<C>,
}

/// The animation scheduler that ticks all live transitions
pub struct AnimationScheduler<C> {
    transitions: SlotMap<TransitionId, Entry>,
    groups: SlotMap<GroupId, Group<C>>,
    occupants: [Option<TransitionId>; Channel::COUNT],
    last_frame: Instant,
}

impl<C> AnimationScheduler<C> {
    pub fn new() -> Self {
        Self {
            transitions: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            occupants: [None; Channel::COUNT],
            last_frame: Instant::now(),
        }
    }

    /// Start a single transition on `channel`, stopping whatever ran there
    pub fn start(&mut self, channel: Channel, motion: impl Into<Motion>) -> TransitionId {
        self.insert(channel, motion.into(), None)
    }

    /// Start several channel transitions as one composite.
    ///
    /// `continuation` is returned from [`tick`](Self::tick) once all of them
    /// have finished naturally. An empty `motions` list drops it immediately.
    pub fn start_composite(
        &mut self,
        motions: impl IntoIterator<Item = (Channel, Motion)>,
        continuation: Option<C>,
    ) -> CompositeHandle {
        let group = self.groups.insert(Group {
            pending: SmallVec::new(),
            continuation,
        });

        let mut handle = CompositeHandle::default();
        for (channel, motion) in motions {
            let id = self.insert(channel, motion, Some(group));
            if let Some(group) = self.groups.get_mut(group) {
                group.pending.push(id);
            }
            handle.members.push((channel, id));
        }
        if handle.is_empty() {
            self.groups.remove(group);
        }
        handle
    }

    fn insert(&mut self, channel: Channel, motion: Motion, group: Option<GroupId>) -> TransitionId {
        self.stop_channel(channel);

        let id = self.transitions.insert(Entry {
            channel,
            motion,
            group,
        });
        self.occupants[channel.slot()] = Some(id);
        tracing::trace!(?channel, ?id, "transition started");
        id
    }

    /// Stop a transition. Its composite's continuation is dropped.
    ///
    /// Returns false when the handle already finished or was stopped.
    pub fn stop(&mut self, id: TransitionId) -> bool {
        let Some(entry) = self.transitions.remove(id) else {
            return false;
        };

        self.vacate(entry.channel, id);
        if let Some(group) = entry.group {
            if self.groups.remove(group).is_some() {
                tracing::trace!(?id, "composite superseded, continuation dropped");
            }
        }
        true
    }

    /// Stop every member of a composite
    pub fn stop_composite(&mut self, handle: &CompositeHandle) {
        for (_, id) in handle.iter() {
            self.stop(id);
        }
    }

    /// Stop whatever transition currently drives `channel`
    pub fn stop_channel(&mut self, channel: Channel) -> bool {
        match self.occupants[channel.slot()] {
            Some(id) => self.stop(id),
            None => false,
        }
    }

    /// Stop all transitions, dropping every continuation
    pub fn stop_all(&mut self) {
        for channel in Channel::ALL {
            self.stop_channel(channel);
        }
        self.groups.clear();
    }

    fn vacate(&mut self, channel: Channel, id: TransitionId) {
        let slot = &mut self.occupants[channel.slot()];
        if *slot == Some(id) {
            *slot = None;
        }
    }

    /// Transition currently driving `channel`
    pub fn occupant(&self, channel: Channel) -> Option<TransitionId> {
        self.occupants[channel.slot()]
    }

    pub fn is_live(&self, id: TransitionId) -> bool {
        self.transitions.contains_key(id)
    }

    /// Value the transition behind `id` is heading for
    pub fn target(&self, id: TransitionId) -> Option<f32> {
        self.transitions.get(id).map(|entry| entry.motion.target())
    }

    /// Check if any transitions are still running
    pub fn has_active_animations(&self) -> bool {
        !self.transitions.is_empty()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Advance every transition by the wall time elapsed since the last tick
    pub fn tick_now(&mut self, values: &mut ChannelValues) -> Vec<C> {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.tick(dt, values)
    }

    /// Advance every transition by `dt`, write channel values, and collect the
    /// continuations of composites that completed during this tick
    pub fn tick(&mut self, dt: Duration, values: &mut ChannelValues) -> Vec<C> {
        self.last_frame = Instant::now();

        let mut finished: SmallVec<[TransitionId; 4]> = SmallVec::new();
        for (id, entry) in self.transitions.iter_mut() {
            entry.motion.advance(dt);
            values.set(entry.channel, entry.motion.value());
            if entry.motion.is_finished() {
                finished.push(id);
            }
        }

        let mut settled = Vec::new();
        for id in finished {
            let Some(entry) = self.transitions.remove(id) else {
                continue;
            };
            self.vacate(entry.channel, id);
            tracing::trace!(channel = ?entry.channel, ?id, "transition finished");

            let Some(group_id) = entry.group else {
                continue;
            };
            let Some(group) = self.groups.get_mut(group_id) else {
                continue;
            };
            group.pending.retain(|member| *member != id);
            if group.pending.is_empty() {
                if let Some(continuation) = self
                    .groups
                    .remove(group_id)
                    .and_then(|group| group.continuation)
                {
                    settled.push(continuation);
                }
            }
        }
        settled
    }
}

impl<C> Default for AnimationScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
