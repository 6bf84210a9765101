use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a string is not in a field's allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Priority {
    #[serde(rename = "HIGH")]
    #[sqlx(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    #[sqlx(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    #[sqlx(rename = "LOW")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Status {
    #[serde(rename = "TO DO")]
    #[sqlx(rename = "TO DO")]
    ToDo,
    #[serde(rename = "IN PROGRESS")]
    #[sqlx(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    #[sqlx(rename = "DONE")]
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::ToDo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "TO DO",
            Status::InProgress => "IN PROGRESS",
            Status::Done => "DONE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    #[serde(rename = "WORK")]
    #[sqlx(rename = "WORK")]
    Work,
    #[serde(rename = "HOME")]
    #[sqlx(rename = "HOME")]
    Home,
    #[serde(rename = "LEARNING")]
    #[sqlx(rename = "LEARNING")]
    Learning,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Home, Category::Learning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "WORK",
            Category::Home => "HOME",
            Category::Learning => "LEARNING",
        }
    }
}

// Matching is exact: the stored and wire forms are the same upper-case text.
impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(UnknownVariant)
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or(UnknownVariant)
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(UnknownVariant)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
