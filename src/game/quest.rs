use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRewards {
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub progress: u32,
    pub max_progress: u32,
    #[serde(default)]
    pub rewards: QuestRewards,
    #[serde(default)]
    pub completed: bool,
}

impl Quest {
    /// A copy with progress cleared, as handed out to a new player.
    pub fn fresh(&self) -> Quest {
        Quest {
            progress: 0,
            completed: false,
            ..self.clone()
        }
    }

    /// Advance by `steps`, clamped at `max_progress`. Returns true only on the
    /// step that completes the quest; completed quests stay completed.
    pub fn advance(&mut self, steps: u32) -> bool {
        if self.completed {
            return false;
        }
        self.progress = self.progress.saturating_add(steps).min(self.max_progress);
        if self.progress >= self.max_progress {
            self.completed = true;
            return true;
        }
        false
    }

    pub fn percent(&self) -> u32 {
        if self.max_progress == 0 {
            return 100;
        }
        self.progress.min(self.max_progress) * 100 / self.max_progress
    }

    pub fn is_valid(&self) -> bool {
        self.max_progress > 0 && self.progress <= self.max_progress
    }
}
