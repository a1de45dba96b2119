// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::ElementId;

/// Closed set of element types that can appear in a program tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "learning-unit")]
    LearningUnit,
}

impl ElementType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::LearningUnit => "learning-unit",
        }
    }

    /// Leaf elements never receive children.
    pub const fn can_host_children(self) -> bool {
        matches!(self, Self::Group)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ParseElementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(Self::Group),
            "learning-unit" => Ok(Self::LearningUnit),
            other => Err(ParseElementTypeError { value: other.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseElementTypeError {
    value: String,
}

impl ParseElementTypeError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseElementTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown element type '{}' (expected 'group' or 'learning-unit')", self.value)
    }
}

impl std::error::Error for ParseElementTypeError {}

/// Category of a group element; decides which groups may contain which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    Training,
    MiniTraining,
    CommonCore,
    SubGroup,
    OptionList,
}

impl GroupType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Training => "Training",
            Self::MiniTraining => "Mini-training",
            Self::CommonCore => "Common core",
            Self::SubGroup => "Sub-group",
            Self::OptionList => "Option list",
        }
    }

    /// Authorized parent/child relationships between group types.
    pub const fn may_contain(self, child: GroupType) -> bool {
        match (self, child) {
            (_, Self::Training) => false,
            (Self::Training, _) => true,
            (Self::MiniTraining, Self::MiniTraining) => false,
            (Self::MiniTraining, _) => true,
            (Self::CommonCore, Self::SubGroup | Self::OptionList) => true,
            (Self::OptionList, Self::MiniTraining) => true,
            (Self::SubGroup, Self::SubGroup | Self::OptionList) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ElementKind {
    Group { group_type: GroupType },
    LearningUnit { credits: u32 },
}

/// One element of the academic program hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    id: ElementId,
    acronym: String,
    title: String,
    kind: ElementKind,
}

impl Element {
    pub fn group(
        id: ElementId,
        acronym: impl Into<String>,
        title: impl Into<String>,
        group_type: GroupType,
    ) -> Self {
        Self {
            id,
            acronym: acronym.into(),
            title: title.into(),
            kind: ElementKind::Group { group_type },
        }
    }

    pub fn learning_unit(
        id: ElementId,
        acronym: impl Into<String>,
        title: impl Into<String>,
        credits: u32,
    ) -> Self {
        Self {
            id,
            acronym: acronym.into(),
            title: title.into(),
            kind: ElementKind::LearningUnit { credits },
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn acronym(&self) -> &str {
        &self.acronym
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::Group { .. } => ElementType::Group,
            ElementKind::LearningUnit { .. } => ElementType::LearningUnit,
        }
    }

    pub fn group_type(&self) -> Option<GroupType> {
        match self.kind {
            ElementKind::Group { group_type } => Some(group_type),
            ElementKind::LearningUnit { .. } => None,
        }
    }

    /// Label shown in the tree, e.g. `LBIR1100 - Mathematics`.
    pub fn verbose(&self) -> String {
        format!("{} - {}", self.acronym, self.title)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.acronym)
    }
}
