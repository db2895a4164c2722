use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::gateway::{Entity, Validate};
use crate::store::{Order, Table};

/// Catalog entry for a title, independent of any collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Work {
    pub id_work: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub work_type: String,
    #[serde(default)]
    pub total_episodes: Option<i32>,
    #[serde(default)]
    pub total_chapters: Option<i32>,
    #[serde(default)]
    pub total_volumes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewWork {
    pub title: String,
    #[serde(rename = "type")]
    pub work_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chapters: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volumes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chapters: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volumes: Option<i32>,
}

fn check_totals(totals: [Option<i32>; 3]) -> Result<()> {
    if totals.iter().flatten().any(|t| *t < 0) {
        return Err(Error::Validation("Totals must not be negative".into()));
    }
    Ok(())
}

impl Validate for NewWork {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Title must not be empty".into()));
        }
        check_totals([self.total_episodes, self.total_chapters, self.total_volumes])
    }
}

impl Validate for WorkPatch {
    fn validate(&self) -> Result<()> {
        if *self == WorkPatch::default() {
            return Err(Error::Validation("At least one field required".into()));
        }
        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(Error::Validation("Title must not be empty".into()));
        }
        check_totals([self.total_episodes, self.total_chapters, self.total_volumes])
    }
}

impl Entity for Work {
    type Id = i64;
    type New = NewWork;
    type Patch = WorkPatch;

    const TABLE: Table = Table {
        name: "work",
        key: "id_work",
        columns: &["id_work", "title", "type", "total_episodes", "total_chapters", "total_volumes"],
        owner: None,
        order: Some(Order::asc("title")),
    };
    const LABEL: &'static str = "Work";

    fn id(&self) -> i64 {
        self.id_work
    }
}
