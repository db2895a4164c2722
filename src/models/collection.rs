use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::gateway::{Entity, Validate};
use crate::store::{Order, Table};

pub const MAX_PROGRESS: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    Anime,
    Manga,
    Simulcast,
    Film,
    OneShot,
    Tv,
    Autre,
}

impl EntryType {
    pub const ALL: [EntryType; 7] = [
        EntryType::Anime,
        EntryType::Manga,
        EntryType::Simulcast,
        EntryType::Film,
        EntryType::OneShot,
        EntryType::Tv,
        EntryType::Autre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Anime => "anime",
            EntryType::Manga => "manga",
            EntryType::Simulcast => "simulcast",
            EntryType::Film => "film",
            EntryType::OneShot => "one-shot",
            EntryType::Tv => "tv",
            EntryType::Autre => "autre",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        EntryType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("Unknown entry type: {}", s)))
    }
}

/// One row of the `collection` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionEntry {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Missing progress reads as 0.
    #[serde(default)]
    pub progress: i32,
    #[serde(rename = "dateSimulcast", default)]
    pub date_simulcast: Option<String>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewEntry {
    pub title: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub progress: i32,
    #[serde(rename = "dateSimulcast", default, skip_serializing_if = "Option::is_none")]
    pub date_simulcast: Option<String>,
}

impl NewEntry {
    pub fn new(title: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            title: title.into(),
            entry_type,
            progress: 0,
            date_simulcast: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<EntryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(rename = "dateSimulcast", default, skip_serializing_if = "Option::is_none")]
    pub date_simulcast: Option<String>,
}

impl EntryPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn progress(progress: i32) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.entry_type.is_none()
            && self.progress.is_none()
            && self.date_simulcast.is_none()
    }

    /// Applies the patch to a local copy, the way the store applies it to the row.
    pub fn apply_to(&self, entry: &mut CollectionEntry) {
        if let Some(ref title) = self.title {
            entry.title = title.clone();
        }
        if let Some(entry_type) = self.entry_type {
            entry.entry_type = entry_type;
        }
        if let Some(progress) = self.progress {
            entry.progress = progress;
        }
        if let Some(ref date) = self.date_simulcast {
            entry.date_simulcast = Some(date.clone());
        }
    }
}

fn check_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("Title must not be empty".into()));
    }
    Ok(())
}

fn check_progress(progress: i32) -> Result<()> {
    if !(0..=MAX_PROGRESS).contains(&progress) {
        return Err(Error::Validation(format!(
            "Progress must be between 0 and {}, got {}",
            MAX_PROGRESS, progress
        )));
    }
    Ok(())
}

impl Validate for NewEntry {
    fn validate(&self) -> Result<()> {
        check_title(&self.title)?;
        check_progress(self.progress)
    }
}

impl Validate for EntryPatch {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Validation("At least one field required".into()));
        }
        if let Some(ref title) = self.title {
            check_title(title)?;
        }
        if let Some(progress) = self.progress {
            check_progress(progress)?;
        }
        Ok(())
    }
}

impl Entity for CollectionEntry {
    type Id = i64;
    type New = NewEntry;
    type Patch = EntryPatch;

    const TABLE: Table = Table {
        name: "collection",
        key: "id",
        columns: &["id", "title", "type", "progress", "dateSimulcast", "user_id"],
        owner: Some("user_id"),
        order: Some(Order::desc("id")),
    };
    const LABEL: &'static str = "Collection entry";

    fn id(&self) -> i64 {
        self.id
    }
}
