use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub const PAGE_SIZES: [usize; 3] = [5, 10, 20];
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub const ALL: [Status; 2] = [Self::Active, Self::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("unknown status '{other}', expected Active or Inactive")),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One directory entry as served by the data source.
///
/// Records are never mutated after a fetch; a new fetch replaces the whole list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub avatar: Option<String>,
    pub status: Status,
    pub joined_at: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub last_seen: String,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Avatar fallback: first character of the name, upper-cased.
    pub fn initial(&self) -> String {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Wire shape of the static users document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UsersDocument {
    pub users: Vec<User>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// Empty means every status.
    pub statuses: BTreeSet<Status>,
    pub search: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.search.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    NameAsc,
    NameDesc,
    #[default]
    None,
}

impl SortOption {
    /// Cycles none -> asc -> desc -> none.
    pub fn toggled(self) -> Self {
        match self {
            Self::None => Self::NameAsc,
            Self::NameAsc => Self::NameDesc,
            Self::NameDesc => Self::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::None => "none",
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "name_asc" | "asc" => Ok(Self::NameAsc),
            "name_desc" | "desc" => Ok(Self::NameDesc),
            "none" | "" => Ok(Self::None),
            other => Err(format!(
                "unknown sort '{other}', expected name_asc, name_desc or none"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_items: 0,
            total_pages: 0,
        }
    }
}

impl PaginationState {
    /// Recomputes totals for a new item count and puts the cursor back on page 1.
    pub fn reset(self, total_items: usize) -> Self {
        Self {
            current_page: 1,
            total_items,
            total_pages: crate::pipeline::total_pages(total_items, self.page_size),
            ..self
        }
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_pages: crate::pipeline::total_pages(self.total_items, page_size),
            ..self
        }
    }

    /// Moves to `page`, clamped into `[1, max(total_pages, 1)]`.
    pub fn with_page(self, page: usize) -> Self {
        Self {
            current_page: page.clamp(1, self.last_page()),
            ..self
        }
    }

    pub fn last_page(&self) -> usize {
        self.total_pages.max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

pub fn is_allowed_page_size(size: usize) -> bool {
    PAGE_SIZES.contains(&size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_camel_case_and_lowercase_status() {
        let raw = r#"{
            "id": "u1",
            "name": "alice",
            "email": "alice@example.com",
            "avatar": "",
            "status": "active",
            "joinedAt": "2024-01-05T10:00:00Z",
            "bio": "hi",
            "lastSeen": "2024-03-01T10:00:00Z"
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.status, Status::Active);
        assert_eq!(user.joined_at, "2024-01-05T10:00:00Z");
        assert_eq!(user.avatar, None);
        assert_eq!(user.initial(), "A");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let raw = r#"{"id":"u1","name":"a","email":"a@x","status":"Banned","joinedAt":""}"#;
        assert!(serde_json::from_str::<User>(raw).is_err());
    }

    #[test]
    fn sort_option_toggle_cycles() {
        let s = SortOption::None.toggled();
        assert_eq!(s, SortOption::NameAsc);
        assert_eq!(s.toggled(), SortOption::NameDesc);
        assert_eq!(s.toggled().toggled(), SortOption::None);
        assert_eq!("desc".parse::<SortOption>().unwrap(), SortOption::NameDesc);
    }

    #[test]
    fn pagination_clamps_page() {
        let p = PaginationState::default().reset(23);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.with_page(9).current_page, 3);
        assert_eq!(p.with_page(0).current_page, 1);

        let empty = PaginationState::default().reset(0);
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.with_page(4).current_page, 1);
    }

    #[test]
    fn page_size_change_resets_page() {
        let p = PaginationState::default().reset(23).with_page(3).with_page_size(5);
        assert_eq!(p.current_page, 1);
        assert_eq!(p.total_pages, 5);
    }
}
