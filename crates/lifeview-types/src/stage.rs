//! Lineage stages and the eight-entry tier table they index.
//!
//! The remote service reports a lineage group's maturity as a plain integer
//! (1 for the simplest groups, 8 for the most developed). Every per-stage
//! table in the controller (colours, labels, icons, distribution counters)
//! has exactly eight entries and is indexed through [`LineageTier`], never by
//! raw integer.
//!
//! # Wraparound
//!
//! Stages outside `1..=8` are not rejected. [`Stage::tier`] maps any integer
//! onto the table with `(stage - 1).rem_euclid(8)`, so stage 9 looks like
//! stage 1 and stage 0 looks like stage 8. This is intentional: a service that
//! grows more stages keeps rendering with cycling colours instead of failing.

use serde::{Deserialize, Serialize};

/// Number of entries in every per-stage table.
pub const TIER_COUNT: usize = 8;

/// A lineage group's maturity level as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(pub i32);

impl Stage {
    /// The first (least mature) stage.
    pub const FIRST: Self = Self(1);

    /// Return the raw stage number.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Map this stage onto the eight-entry tier table, wrapping as needed.
    pub const fn tier(self) -> LineageTier {
        let index = self.0.wrapping_sub(1).rem_euclid(8);
        LineageTier::from_index(index)
    }

    /// Whether groups at this stage are outlined with a border.
    ///
    /// Only groups past the first stage receive one.
    pub const fn has_border(self) -> bool {
        self.0 >= 2
    }

    /// Whether the stage lies inside the nominal `1..=8` range.
    pub const fn is_nominal(self) -> bool {
        self.0 >= 1 && self.0 <= 8
    }
}

impl From<i32> for Stage {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "stage {}", self.0)
    }
}

/// One entry of the eight-entry stage table.
///
/// Variant order is table order: `Cell` is stage 1, `Human` is stage 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageTier {
    /// Stage 1: single cells.
    Cell,
    /// Stage 2: simple replicators.
    Dna,
    /// Stage 3: plant-like colonies.
    Seedling,
    /// Stage 4: insect-like colonies.
    Bug,
    /// Stage 5: fish-like colonies.
    Fish,
    /// Stage 6: reptile-like colonies.
    Dragon,
    /// Stage 7: mammal-like colonies.
    Mammal,
    /// Stage 8: the most developed colonies.
    Human,
}

impl LineageTier {
    /// All tiers in table order.
    pub const ALL: [Self; TIER_COUNT] = [
        Self::Cell,
        Self::Dna,
        Self::Seedling,
        Self::Bug,
        Self::Fish,
        Self::Dragon,
        Self::Mammal,
        Self::Human,
    ];

    /// Build a tier from a table index, wrapping indices past the end.
    const fn from_index(index: i32) -> Self {
        match index.rem_euclid(8) {
            0 => Self::Cell,
            1 => Self::Dna,
            2 => Self::Seedling,
            3 => Self::Bug,
            4 => Self::Fish,
            5 => Self::Dragon,
            6 => Self::Mammal,
            _ => Self::Human,
        }
    }

    /// Zero-based position of this tier in every per-stage table.
    pub const fn index(self) -> usize {
        match self {
            Self::Cell => 0,
            Self::Dna => 1,
            Self::Seedling => 2,
            Self::Bug => 3,
            Self::Fish => 4,
            Self::Dragon => 5,
            Self::Mammal => 6,
            Self::Human => 7,
        }
    }

    /// The nominal stage number (1..=8) this tier stands for.
    pub const fn nominal_stage(self) -> Stage {
        match self {
            Self::Cell => Stage(1),
            Self::Dna => Stage(2),
            Self::Seedling => Stage(3),
            Self::Bug => Stage(4),
            Self::Fish => Stage(5),
            Self::Dragon => Stage(6),
            Self::Mammal => Stage(7),
            Self::Human => Stage(8),
        }
    }

    /// Short label for status displays.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Dna => "dna",
            Self::Seedling => "seedling",
            Self::Bug => "bug",
            Self::Fish => "fish",
            Self::Dragon => "dragon",
            Self::Mammal => "mammal",
            Self::Human => "human",
        }
    }

    /// Pictogram for status displays.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Cell => "🔬",
            Self::Dna => "🧬",
            Self::Seedling => "🌱",
            Self::Bug => "🐛",
            Self::Fish => "🐟",
            Self::Dragon => "🐉",
            Self::Mammal => "🐕",
            Self::Human => "🧍",
        }
    }
}

/// Number of lineage groups per tier in one species snapshot.
///
/// Only groups whose stage lies in the nominal `1..=8` range are counted;
/// wrapped stages still render but are left out of the distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDistribution {
    counts: [u64; TIER_COUNT],
}

impl StageDistribution {
    /// Count the nominal stages in `stages`.
    pub fn from_stages<I>(stages: I) -> Self
    where
        I: IntoIterator<Item = Stage>,
    {
        let mut dist = Self::default();
        for stage in stages.into_iter().filter(|s| s.is_nominal()) {
            if let Some(slot) = dist.counts.get_mut(stage.tier().index()) {
                *slot = slot.saturating_add(1);
            }
        }
        dist
    }

    /// Number of groups at `tier`.
    pub fn count(&self, tier: LineageTier) -> u64 {
        self.counts.get(tier.index()).copied().unwrap_or(0)
    }

    /// Total number of counted groups.
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0_u64, |acc, c| acc.saturating_add(*c))
    }

    /// Iterate `(tier, count)` pairs in table order, including empty tiers.
    pub fn iter(&self) -> impl Iterator<Item = (LineageTier, u64)> + '_ {
        LineageTier::ALL.into_iter().map(|tier| (tier, self.count(tier)))
    }

    /// Iterate only the tiers that have at least one group.
    pub fn occupied(&self) -> impl Iterator<Item = (LineageTier, u64)> + '_ {
        self.iter().filter(|(_, count)| *count > 0)
    }
}
