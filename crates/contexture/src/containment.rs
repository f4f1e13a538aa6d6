//! Containment tracking for boxes and ports.
//!
//! Nesting is kept apart from the flat [`Registry`](crate::registry::Registry)
//! so boxes can be registered before their final place in the tree is known.
//!
//! # Architecture
//!
//! The tracker is a forest stored as a vector of slots. Slots refer to each
//! other by index rather than by back-references:
//! - every slot has at most one parent index
//! - every slot keeps its children in attach order
//! - cycle detection walks the parent chain, which is bounded by the number
//!   of slots
//!
//! Every attachment is validated in full before the forest is touched, so a
//! rejected attachment leaves the tracker exactly as it was.

use std::{collections::HashMap, iter};

use log::debug;

use contexture_core::identifier::Id;

use crate::error::{DiagramError, NestingViolation};

/// What a tracked node is allowed to do in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// A box that may contain other boxes and ports.
    Container,
    /// A port; it has an owner but never children.
    ConnectionPoint,
}

/// Position of a slot in the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotIndex(usize);

#[derive(Debug)]
struct Slot {
    id: Id,
    role: NodeRole,
    parent: Option<SlotIndex>,
    children: Vec<SlotIndex>,
}

impl Slot {
    fn new(id: Id, role: NodeRole) -> Self {
        Self {
            id,
            role,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Parent/child relationships between registered nodes.
#[derive(Debug, Default)]
pub struct ContainmentTracker {
    slots: Vec<Slot>,
    index: HashMap<Id, SlotIndex>,
}

impl ContainmentTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `id` as a root node.
    ///
    /// Returns `false` and changes nothing if `id` is already tracked.
    pub fn insert_node(&mut self, id: Id, role: NodeRole) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        let idx = SlotIndex(self.slots.len());
        self.slots.push(Slot::new(id, role));
        self.index.insert(id, idx);
        true
    }

    /// Returns `true` if `id` is tracked.
    pub fn contains(&self, id: Id) -> bool {
        self.index.contains_key(&id)
    }

    /// Role of a tracked node.
    pub fn role_of(&self, id: Id) -> Option<NodeRole> {
        self.slot(id).map(|slot| slot.role)
    }

    /// Records `child` as nested in `parent`.
    ///
    /// Attaching a child to the parent it already has is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::InvalidNesting`] if either node is not
    /// tracked, the parent is a port, the child is the parent itself, the
    /// child already has a different parent, or the child is an ancestor of
    /// the parent.
    pub fn attach_child(&mut self, parent: Id, child: Id) -> Result<(), DiagramError> {
        let (parent_idx, child_idx) = self.check_attach(parent, child).map_err(|reason| {
            DiagramError::InvalidNesting {
                parent,
                child,
                reason,
            }
        })?;

        if self.slots[child_idx.0].parent == Some(parent_idx) {
            return Ok(());
        }

        self.slots[child_idx.0].parent = Some(parent_idx);
        self.slots[parent_idx.0].children.push(child_idx);
        debug!(parent:% = parent, child:% = child; "Attached child");
        Ok(())
    }

    /// Validates an attachment without performing it.
    fn check_attach(
        &self,
        parent: Id,
        child: Id,
    ) -> Result<(SlotIndex, SlotIndex), NestingViolation> {
        let parent_idx = *self
            .index
            .get(&parent)
            .ok_or(NestingViolation::UnknownParent)?;
        let child_idx = *self
            .index
            .get(&child)
            .ok_or(NestingViolation::UnknownChild)?;

        if self.slots[parent_idx.0].role == NodeRole::ConnectionPoint {
            return Err(NestingViolation::PortParent);
        }
        if parent_idx == child_idx {
            return Err(NestingViolation::SelfContainment);
        }
        match self.slots[child_idx.0].parent {
            Some(current) if current == parent_idx => return Ok((parent_idx, child_idx)),
            Some(current) => {
                return Err(NestingViolation::AlreadyNested {
                    current_parent: self.slots[current.0].id,
                });
            }
            None => {}
        }
        if self.ancestor_indices(parent_idx).any(|idx| idx == child_idx) {
            return Err(NestingViolation::Cycle);
        }

        Ok((parent_idx, child_idx))
    }

    /// Children of `id` in attach order; empty for unknown ids and leaves.
    pub fn children_of(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        self.slot(id)
            .into_iter()
            .flat_map(|slot| slot.children.iter())
            .map(move |idx| self.slots[idx.0].id)
    }

    /// Parent of `id`, if it is nested.
    pub fn parent_of(&self, id: Id) -> Option<Id> {
        self.slot(id)
            .and_then(|slot| slot.parent)
            .map(|idx| self.slots[idx.0].id)
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        self.index
            .get(&id)
            .into_iter()
            .flat_map(move |idx| self.ancestor_indices(*idx))
            .map(move |idx| self.slots[idx.0].id)
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: Id) -> usize {
        self.ancestors(id).count()
    }

    /// Tracked nodes without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = Id> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.parent.is_none())
            .map(|slot| slot.id)
    }

    /// Number of tracked nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no node is tracked.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, id: Id) -> Option<&Slot> {
        self.index.get(&id).map(|idx| &self.slots[idx.0])
    }

    fn ancestor_indices(&self, start: SlotIndex) -> impl Iterator<Item = SlotIndex> + '_ {
        iter::successors(self.slots[start.0].parent, move |idx| self.slots[idx.0].parent)
            .take(self.slots.len())
    }
}
