//! Dungeon catalog: the read-only table of dungeons, their boss base HP,
//! reward bases and presentation hints.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::BOSS_HP_SCALING;
use crate::economy::level_pow;
use crate::error::ConfigError;

/// Custom HP rule; takes the dungeon level, returns max HP
pub type BossHpFn = Arc<dyn Fn(u32) -> f64 + Send + Sync>;

/// Presentation hints. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonDisplay {
    pub name: String,
    pub style: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DungeonDef {
    pub id: String,
    pub boss_base_hp: f64,
    #[serde(default)]
    pub gem_reward: f64,
    #[serde(default)]
    pub coin_reward: f64,
    /// Explicit HP per level (index = level - 1)
    #[serde(default)]
    pub hp_table: Option<Vec<f64>>,
    #[serde(default)]
    pub display: DungeonDisplay,
    #[serde(skip)]
    pub hp_override: Option<BossHpFn>,
}

impl fmt::Debug for DungeonDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DungeonDef")
            .field("id", &self.id)
            .field("boss_base_hp", &self.boss_base_hp)
            .field("gem_reward", &self.gem_reward)
            .field("coin_reward", &self.coin_reward)
            .field("hp_table", &self.hp_table)
            .field("display", &self.display)
            .field("hp_override", &self.hp_override.is_some())
            .finish()
    }
}

impl DungeonDef {
    pub fn new(id: impl Into<String>, boss_base_hp: f64, gem_reward: f64, coin_reward: f64) -> Self {
        let id = id.into();
        Self {
            display: DungeonDisplay {
                name: id.clone(),
                style: String::new(),
            },
            id,
            boss_base_hp,
            gem_reward,
            coin_reward,
            hp_table: None,
            hp_override: None,
        }
    }

    pub fn with_hp_table(mut self, table: Vec<f64>) -> Self {
        self.hp_table = Some(table);
        self
    }

    pub fn with_hp_override(mut self, f: impl Fn(u32) -> f64 + Send + Sync + 'static) -> Self {
        self.hp_override = Some(Arc::new(f));
        self
    }

    pub fn with_display(mut self, name: impl Into<String>, style: impl Into<String>) -> Self {
        self.display = DungeonDisplay {
            name: name.into(),
            style: style.into(),
        };
        self
    }

    /// Max boss HP at `level` (levels below 1 are treated as 1).
    ///
    /// Precedence: custom function, then HP table, then
    /// `floor(base * scaling^(level - 1))`.
    pub fn boss_hp(&self, level: u32, scaling: f64) -> f64 {
        let level = level.max(1);
        let hp = if let Some(f) = &self.hp_override {
            f(level)
        } else if let Some(table) = self.hp_table.as_ref().filter(|t| !t.is_empty()) {
            let idx = (level - 1) as usize;
            match table.get(idx) {
                Some(hp) => *hp,
                None => {
                    let last = table[table.len() - 1];
                    let extra = u32::try_from(idx + 1 - table.len()).unwrap_or(u32::MAX);
                    (last * level_pow(scaling, extra)).floor()
                }
            }
        } else {
            (self.boss_base_hp * level_pow(scaling, level - 1)).floor()
        };
        if hp == f64::INFINITY {
            f64::MAX
        } else if hp.is_finite() && hp > 0.0 {
            hp
        } else {
            tracing::warn!(target: "idle_core::dungeon", dungeon = %self.id, level, hp, "Invalid boss HP, clamping to 1");
            1.0
        }
    }

    fn validate(&self, issues: &mut Vec<String>) {
        if self.id.trim().is_empty() {
            issues.push("dungeon id must not be empty".to_string());
        }
        if !(self.boss_base_hp.is_finite() && self.boss_base_hp > 0.0) {
            issues.push(format!("{}: boss_base_hp must be > 0", self.id));
        }
        if !(self.gem_reward.is_finite() && self.gem_reward >= 0.0) {
            issues.push(format!("{}: gem_reward must be >= 0", self.id));
        }
        if !(self.coin_reward.is_finite() && self.coin_reward >= 0.0) {
            issues.push(format!("{}: coin_reward must be >= 0", self.id));
        }
        if let Some(table) = &self.hp_table {
            if table.iter().any(|hp| !(hp.is_finite() && *hp > 0.0)) {
                issues.push(format!("{}: hp_table entries must be > 0", self.id));
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    dungeons: Vec<DungeonDef>,
}

/// Immutable dungeon lookup, shared via `Arc` across the session.
#[derive(Debug, Clone)]
pub struct DungeonCatalog {
    dungeons: Vec<DungeonDef>,
    index: HashMap<String, usize>,
}

impl Default for DungeonCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DungeonCatalog {
    pub fn new(dungeons: Vec<DungeonDef>) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();
        if dungeons.is_empty() {
            issues.push("catalog has no dungeons".to_string());
        }
        let mut index = HashMap::with_capacity(dungeons.len());
        for (i, def) in dungeons.iter().enumerate() {
            def.validate(&mut issues);
            if index.insert(def.id.clone(), i).is_some() {
                issues.push(format!("duplicate dungeon id '{}'", def.id));
            }
        }
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(Self { dungeons, index })
    }

    /// The dungeons shipped with the game
    pub fn builtin() -> Self {
        let dungeons = vec![
            DungeonDef::new("goblin_cave", 100.0, 1.0, 25.0).with_display("Goblin Cave", "cave"),
            DungeonDef::new("crystal_mine", 500.0, 2.0, 120.0).with_display("Crystal Mine", "crystal"),
            DungeonDef::new("dragon_lair", 2500.0, 5.0, 600.0).with_display("Dragon Lair", "lava"),
        ];
        let index = dungeons
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        Self { dungeons, index }
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = ron::from_str(s)?;
        Self::new(file.dungeons)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_ron_str(&text)?;
        tracing::info!(target: "idle_core::dungeon", path = %path.as_ref().display(), count = catalog.len(), "Loaded dungeon catalog");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&DungeonDef> {
        self.index.get(id).map(|&i| &self.dungeons[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DungeonDef> {
        self.dungeons.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.dungeons.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.dungeons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dungeons.is_empty()
    }
}

/// HP at `level` under the default scaling factor
pub fn default_boss_hp(base_hp: f64, level: u32) -> f64 {
    (base_hp * level_pow(BOSS_HP_SCALING, level.max(1) - 1)).floor()
}
