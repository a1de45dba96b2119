// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::element::{Element, GroupType};
use super::ids::{ElementId, LinkId};
use super::program::{Link, Program};

/// Root element of the built-in demo program.
pub const DEMO_ROOT_ID: &str = "1";

/// A second, independent root used to show per-root expansion state.
pub const DEMO_SECOND_ROOT_ID: &str = "7";

fn eid(value: u64) -> ElementId {
    ElementId::from_number(value)
}

fn lid(value: u64) -> LinkId {
    LinkId::from_number(value)
}

/// Built-in catalog used by the demo server and by tests.
pub fn demo_program() -> Program {
    let mut program = Program::new();

    let groups = [
        (1, "BIR1BA", "Bachelor in Engineering", GroupType::Training),
        (2, "LBIR100T", "Common core", GroupType::CommonCore),
        (3, "LBIR101G", "Mathematics", GroupType::SubGroup),
        (4, "LBIR102G", "Physics", GroupType::SubGroup),
        (5, "LBIR900O", "Options", GroupType::OptionList),
        (6, "LBIRMIN1", "Minor in Computer Science", GroupType::MiniTraining),
        (7, "LECOMIN2", "Minor in Economics", GroupType::MiniTraining),
    ];
    for (id, acronym, title, group_type) in groups {
        program.insert_element(Element::group(eid(id), acronym, title, group_type));
    }

    let units = [
        (20, "LBIR1100", "Mathematics 1", 5),
        (21, "LBIR1101", "Linear algebra", 5),
        (22, "LBIR1200", "Physics 1", 5),
        (23, "LBIR1201", "Mechanics", 4),
        (24, "LINFO1101", "Introduction to programming", 6),
        (25, "LECON1101", "Microeconomics", 5),
    ];
    for (id, acronym, title, credits) in units {
        program.insert_element(Element::learning_unit(eid(id), acronym, title, credits));
    }

    let links = [
        (101, 1, 2, 0, false),
        (102, 2, 3, 0, false),
        (103, 2, 4, 1, false),
        (104, 3, 20, 0, false),
        (105, 3, 21, 1, false),
        (106, 4, 22, 0, false),
        (107, 4, 23, 1, true),
        (108, 1, 5, 1, false),
        (109, 5, 6, 0, false),
        (110, 6, 24, 0, false),
        (111, 7, 25, 0, false),
    ];
    for (id, parent, child, order, prerequisites) in links {
        program.insert_link(
            Link::new(lid(id), eid(parent), eid(child), order).with_prerequisites(prerequisites),
        );
    }

    program
}
