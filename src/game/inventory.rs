use std::fmt;

use serde::{Deserialize, Serialize};

use super::character::Stat;

/// Fixed number of inventory slots.
pub const INVENTORY_SLOTS: usize = 24;

/// First slot mod-contributed items are placed into.
pub const MOD_ITEM_SLOT_OFFSET: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Drink,
    Potion,
    Weapon,
    Armor,
    Accessory,
    Shield,
    #[default]
    #[serde(other)]
    Misc,
}

impl ItemKind {
    /// Consumables disappear once used.
    pub fn is_consumable(self) -> bool {
        matches!(self, Self::Food | Self::Drink | Self::Potion)
    }
}

/// What using an item does, decided when the content is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemEffect {
    Restore { stat: Stat, amount: u32 },
}

impl fmt::Display for ItemEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restore { stat, amount } => write!(f, "restore {} {}", amount, stat),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<ItemEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub id: usize,
    pub item: Option<ItemRecord>,
}

/// Exactly [`INVENTORY_SLOTS`] slots, serialized as a plain array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    slots: Vec<InventorySlot>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: (0..INVENTORY_SLOTS)
                .map(|id| InventorySlot { id, item: None })
                .collect(),
        }
    }
}

impl Inventory {
    /// An inventory whose first slots hold `items`, in order.
    pub fn with_items(items: &[ItemRecord]) -> Self {
        let mut inv = Self::default();
        inv.splice_from(0, items);
        inv
    }

    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&ItemRecord> {
        self.slots.get(slot).and_then(|s| s.item.as_ref())
    }

    pub fn take(&mut self, slot: usize) -> Option<ItemRecord> {
        self.slots.get_mut(slot).and_then(|s| s.item.take())
    }

    /// Write `items` into consecutive slots starting at `offset`, replacing
    /// whatever is there. Items past the last slot are dropped; returns how
    /// many were dropped.
    pub fn splice_from(&mut self, offset: usize, items: &[ItemRecord]) -> usize {
        let room = self.slots.len().saturating_sub(offset);
        let placed = items.len().min(room);
        let start = offset.min(self.slots.len());

        for (slot, item) in self.slots[start..].iter_mut().zip(items.iter()) {
            slot.item = Some(item.clone());
        }

        items.len() - placed
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.item.is_some()).count()
    }

    /// Right number of slots with matching ids.
    pub fn is_valid(&self) -> bool {
        self.slots.len() == INVENTORY_SLOTS && self.slots.iter().enumerate().all(|(i, s)| s.id == i)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<ItemRecord>,
    pub armor: Option<ItemRecord>,
    pub accessory: Option<ItemRecord>,
    pub shield: Option<ItemRecord>,
}
