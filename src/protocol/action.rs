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

/// Context-menu actions understood by the management endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeAction {
    Select,
    Attach,
    Detach,
    Move,
    Up,
    Down,
}

impl TreeAction {
    pub const ALL: [TreeAction; 6] =
        [Self::Select, Self::Attach, Self::Detach, Self::Move, Self::Up, Self::Down];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Attach => "attach",
            Self::Detach => "detach",
            Self::Move => "move",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for TreeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeAction {
    type Err = ParseTreeActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseTreeActionError { value: s.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTreeActionError {
    value: String,
}

impl fmt::Display for ParseTreeActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = TreeAction::ALL.map(TreeAction::as_str).join(",");
        write!(f, "action should be one of {expected} (got '{}')", self.value)
    }
}

impl std::error::Error for ParseTreeActionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TreeAction;

    #[test]
    fn wire_names_parse_back() {
        for action in TreeAction::ALL {
            assert_eq!(action.as_str().parse::<TreeAction>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_action_lists_the_expected_ones() {
        let err = "copy".parse::<TreeAction>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "action should be one of select,attach,detach,move,up,down (got 'copy')"
        );
    }
}
