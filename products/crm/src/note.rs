//! Free-form notes attached to a customer. Pinned notes list first.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub customer_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        owner_id: Uuid,
        customer_id: Uuid,
        title: Option<&str>,
        content: &str,
        now: DateTime<Utc>,
    ) -> CrmResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            customer_id,
            title: clean_title(title)?,
            content: clean_content(content)?,
            pinned: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces title and content. A blank title clears it.
    pub fn edit(
        &mut self,
        title: Option<&str>,
        content: &str,
        now: DateTime<Utc>,
    ) -> CrmResult<()> {
        let title = clean_title(title)?;
        let content = clean_content(content)?;
        self.title = title;
        self.content = content;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_pinned(&mut self, pinned: bool, now: DateTime<Utc>) {
        self.pinned = pinned;
        self.updated_at = now;
    }

    /// Heading shown in lists: the title, or the first line of the content.
    pub fn heading(&self) -> &str {
        match &self.title {
            Some(title) => title,
            None => self.content.lines().next().unwrap_or_default(),
        }
    }
}

/// Pinned first, newest first within each group.
pub fn sort_for_display(notes: &mut [Note]) {
    notes.sort_by_key(|note| (Reverse(note.pinned), Reverse(note.created_at)));
}

fn clean_title(title: Option<&str>) -> CrmResult<Option<String>> {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) if title.chars().count() > MAX_TITLE_LEN => Err(CrmError::TooLong {
            field: "note title",
            max: MAX_TITLE_LEN,
        }),
        other => Ok(other.map(str::to_string)),
    }
}

fn clean_content(content: &str) -> CrmResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CrmError::BlankName("note content"));
    }
    Ok(content.to_string())
}
