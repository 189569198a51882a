use std::{collections::BTreeMap, fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// An area the user is tracking. `kind` and `source` are fixed at creation, only `text` can
/// change afterwards. Field names are serialized in the stored blob's camelCase shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ImprovementKind,
    pub source: Source,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementKind {
    /// Something to grow.
    Improvement,
    /// Something to maintain.
    Preservation,
}

impl Display for ImprovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImprovementKind::Improvement => write!(f, "improvement"),
            ImprovementKind::Preservation => write!(f, "preservation"),
        }
    }
}

/// Who raised the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Commander,
    Team,
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Commander => write!(f, "commander"),
            Source::Team => write!(f, "team"),
        }
    }
}

/// Effort self-rating between 0 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EffortLevel(u8);

pub const MAX_EFFORT_LEVEL: u8 = 5;

impl EffortLevel {
    pub fn new_opt(value: u8) -> Option<EffortLevel> {
        if value > MAX_EFFORT_LEVEL {
            None
        } else {
            Some(EffortLevel(value))
        }
    }
}

impl TryFrom<u8> for EffortLevel {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        EffortLevel::new_opt(value)
            .ok_or_else(|| anyhow!("Effort level {value} is outside of 0-{MAX_EFFORT_LEVEL}"))
    }
}

impl From<EffortLevel> for u8 {
    fn from(value: EffortLevel) -> Self {
        value.0
    }
}

impl FromStr for EffortLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.parse::<u8>()?;
        EffortLevel::try_from(v)
    }
}

impl Deref for EffortLevel {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// What the user logged for one area on one day. All fields are optional so partial updates can
/// leave the rest untouched; absent fields stay absent in the stored blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort_level: Option<EffortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DayRecord {
    /// Shallow merge. Fields present in the patch overwrite, absent fields keep whatever was
    /// recorded before.
    pub fn apply(&mut self, patch: RecordPatch) {
        match patch {
            RecordPatch::Improvement {
                attempted,
                effort_level,
                initiative,
            } => {
                if let Some(v) = attempted {
                    self.attempted = Some(v);
                }
                if let Some(v) = effort_level {
                    self.effort_level = Some(v);
                }
                if let Some(v) = initiative {
                    self.initiative = Some(v);
                }
            }
            RecordPatch::Preservation { content } => {
                if let Some(v) = content {
                    self.content = Some(v);
                }
            }
        }
    }
}

/// Partial update for a [DayRecord], tagged by the kind of area it is legal for. Keeping the tag
/// here lets the mutation path check a patch against the area it targets instead of accepting
/// either field shape unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPatch {
    Improvement {
        attempted: Option<bool>,
        effort_level: Option<EffortLevel>,
        initiative: Option<String>,
    },
    Preservation {
        content: Option<String>,
    },
}

impl RecordPatch {
    pub fn kind(&self) -> ImprovementKind {
        match self {
            RecordPatch::Improvement { .. } => ImprovementKind::Improvement,
            RecordPatch::Preservation { .. } => ImprovementKind::Preservation,
        }
    }
}

/// Everything logged for one calendar date. At most one entry exists per date, created lazily on
/// the first record for that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub id: String,
    /// Serialized as `yyyy-MM-dd`.
    pub date: NaiveDate,
    /// Improvement id -> record for that day.
    pub improvements: BTreeMap<String, DayRecord>,
}

/// Root aggregate. Improvements and daily entries have no identity outside the owning user's
/// data, and the whole value is persisted as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    /// Insertion order is the display order.
    pub improvements: Vec<Improvement>,
    pub daily_entries: Vec<DailyEntry>,
}

impl UserData {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            improvements: Vec::new(),
            daily_entries: Vec::new(),
        }
    }
}
