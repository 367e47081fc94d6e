//! The lane: a fixed row of slots, each holding at most one defender

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::defender::{Defender, DefenderId};
use crate::tuning::LaneLayout;

/// One position on the lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub index: usize,
    /// Fixed at construction. A non-placeable slot never holds a defender.
    pub placeable: bool,
    pub center: Vec2,
    pub size: Vec2,
    pub defender: Option<Defender>,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        self.defender.is_none()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center, self.size)
    }

    /// The occupying defender, if it still has health
    pub fn living_defender(&self) -> Option<&Defender> {
        self.defender.as_ref().filter(|d| d.is_alive())
    }

    pub fn living_defender_mut(&mut self) -> Option<&mut Defender> {
        self.defender.as_mut().filter(|d| d.is_alive())
    }
}

/// Ordered slots, index 0 nearest the goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    slots: Vec<Slot>,
}

impl Track {
    pub fn new(layout: &LaneLayout) -> Self {
        let slots = (0..layout.slot_count)
            .map(|index| Slot {
                index,
                placeable: index < layout.placeable_count,
                center: layout.lane_to_screen(index as f32),
                size: layout.cell_size,
                defender: None,
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    pub fn slot_at(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_at_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Slot for a signed lane position. The goal (-1) and anything past the
    /// spawn end have no slot.
    pub fn slot_at_lane(&self, position: i32) -> Option<&Slot> {
        usize::try_from(position).ok().and_then(|i| self.slot_at(i))
    }

    /// Placeable slot under a screen point (for pointer placement)
    pub fn slot_containing(&self, point: Vec2) -> Option<(usize, &Slot)> {
        self.slots
            .iter()
            .find(|slot| slot.placeable && slot.bounds().contains_point(point))
            .map(|slot| (slot.index, slot))
    }

    /// Put `defender` in slot `index`. Fails on a missing, non-placeable or
    /// occupied slot. On success the defender is anchored to the slot center.
    pub fn place(&mut self, index: usize, mut defender: Defender) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if !slot.placeable || slot.defender.is_some() {
            return false;
        }

        defender.anchor = slot.center;
        slot.defender = Some(defender);
        true
    }

    /// Take the defender out of slot `index`
    pub fn remove(&mut self, index: usize) -> Option<Defender> {
        self.slots.get_mut(index).and_then(|slot| slot.defender.take())
    }

    /// Empty every slot (new round)
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.defender = None;
        }
    }

    /// Slot index currently holding defender `id`
    pub fn find_defender(&self, id: DefenderId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.defender.as_ref().is_some_and(|d| d.id == id))
    }

    /// Occupied slots in lane order
    pub fn defenders(&self) -> impl Iterator<Item = (usize, &Defender)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.defender.as_ref().map(|d| (slot.index, d)))
    }

    /// Indices of slots holding a defender with no health left
    pub fn dead_slots(&self) -> Vec<usize> {
        self.defenders()
            .filter(|(_, d)| !d.is_alive())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.defenders().count()
    }
}
