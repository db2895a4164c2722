use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::gateway::{Entity, Validate};
use crate::store::Table;

/// Membership of a work in a collection, with absolute progress
/// (episodes or chapters, not a percentage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionWork {
    pub id: i64,
    pub id_collection: i64,
    pub id_work: i64,
    #[serde(default)]
    pub progress_absolute: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewCollectionWork {
    pub id_collection: i64,
    pub id_work: i64,
    #[serde(default)]
    pub progress_absolute: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionWorkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_absolute: Option<i32>,
}

impl Validate for NewCollectionWork {
    fn validate(&self) -> Result<()> {
        if self.progress_absolute < 0 {
            return Err(Error::Validation("Progress must not be negative".into()));
        }
        Ok(())
    }
}

impl Validate for CollectionWorkPatch {
    fn validate(&self) -> Result<()> {
        match self.progress_absolute {
            None => Err(Error::Validation("At least one field required".into())),
            Some(p) if p < 0 => Err(Error::Validation("Progress must not be negative".into())),
            Some(_) => Ok(()),
        }
    }
}

impl Entity for CollectionWork {
    type Id = i64;
    type New = NewCollectionWork;
    type Patch = CollectionWorkPatch;

    const TABLE: Table = Table {
        name: "collection_work",
        key: "id",
        columns: &["id", "id_collection", "id_work", "progress_absolute"],
        owner: None,
        order: None,
    };
    const LABEL: &'static str = "Collection link";

    fn id(&self) -> i64 {
        self.id
    }
}
