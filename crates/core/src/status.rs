//! Closed status enumerations for users and lists.
//!
//! Statuses are stored as lowercase text columns guarded by CHECK
//! constraints; these enums are the canonical in-process representation.

use crate::error::CoreError;

/// Lifecycle status of a shopping list.
///
/// This is a plain data field, not a guarded state machine: any value may
/// be set directly by a list update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Active,
    Completed,
    Archived,
}

impl ListStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListStatus::Active => "active",
            ListStatus::Completed => "completed",
            ListStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(ListStatus::Active),
            "completed" => Ok(ListStatus::Completed),
            "archived" => Ok(ListStatus::Archived),
            other => Err(CoreError::Validation(format!(
                "Invalid list status: {other}"
            ))),
        }
    }
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Banned,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Banned => "banned",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(UserStatus::Active),
            "banned" => Ok(UserStatus::Banned),
            other => Err(CoreError::Validation(format!(
                "Invalid user status: {other}"
            ))),
        }
    }
}
