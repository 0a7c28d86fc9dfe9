use std::fmt;

use serde::{Deserialize, Serialize};

/// A bounded resource. `current` never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    pub current: u32,
    pub max: u32,
}

impl Meter {
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub const fn empty(max: u32) -> Self {
        Self { current: 0, max }
    }

    /// Add up to `amount`, stopping at `max`. Returns what was actually added.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    /// Remove up to `amount`, stopping at zero.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        before - self.current
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    pub fn is_valid(&self) -> bool {
        self.current <= self.max
    }
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// Stats an item can restore and decay timers can drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Health,
    Stamina,
    Hunger,
}

impl Stat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Stamina => "stamina",
            Self::Hunger => "hunger",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub wisdom: u32,
    pub charisma: u32,
    pub constitution: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
            constitution: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub class: String,
    pub health: Meter,
    pub stamina: Meter,
    pub hunger: Meter,
    pub experience: Meter,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub avatar: String,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: "Adventurer".to_string(),
            level: 1,
            class: "Wanderer".to_string(),
            health: Meter::full(100),
            stamina: Meter::full(100),
            hunger: Meter::full(100),
            experience: Meter::empty(100),
            attributes: Attributes::default(),
            avatar: "🧙".to_string(),
        }
    }
}

impl Character {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn meter_mut(&mut self, stat: Stat) -> &mut Meter {
        match stat {
            Stat::Health => &mut self.health,
            Stat::Stamina => &mut self.stamina,
            Stat::Hunger => &mut self.hunger,
        }
    }

    /// Add experience, levelling up as many times as it overflows.
    /// Returns the levels reached, in order.
    pub fn gain_experience(&mut self, amount: u32) -> Vec<u32> {
        let mut reached = Vec::new();
        self.experience.current = self.experience.current.saturating_add(amount);

        while self.experience.max > 0 && self.experience.current >= self.experience.max {
            self.level_up();
            reached.push(self.level);
        }
        reached
    }

    fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
        self.experience.current -= self.experience.max;
        self.experience.max = self.experience.max.saturating_add(self.experience.max / 2);

        self.health.max = self.health.max.saturating_add(10);
        self.health.refill();
        self.stamina.max = self.stamina.max.saturating_add(5);
        self.stamina.refill();
        self.hunger.refill();
    }

    /// Every meter respects its maximum.
    pub fn is_valid(&self) -> bool {
        self.level > 0
            && self.health.is_valid()
            && self.stamina.is_valid()
            && self.hunger.is_valid()
            && self.experience.is_valid()
    }
}
