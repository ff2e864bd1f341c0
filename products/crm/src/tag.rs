use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};
use crate::funnel::validate_color;

pub const DEFAULT_TAG_COLOR: &str = "#6c757d";
pub const MAX_TAG_NAME_LEN: usize = 50;

/// A label an owner attaches to customers. Names are unique per owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(owner_id: Uuid, name: &str, color: Option<&str>) -> CrmResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CrmError::BlankName("tag name"));
        }
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(CrmError::TooLong {
                field: "tag name",
                max: MAX_TAG_NAME_LEN,
            });
        }
        let color = color.unwrap_or(DEFAULT_TAG_COLOR);
        validate_color(color)?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            color: color.to_string(),
        })
    }
}
