// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use cursus::client::{MemoryExpansionStore, TreeView};
use cursus::model::{Element, ElementId, GroupType, Link, LinkId, Program};
use cursus::query::build_tree;

#[derive(Debug, Clone, Copy)]
enum Case {
    Small,
    Wide,
    Deep,
}

impl Case {
    const ALL: [Self; 3] = [Self::Small, Self::Wide, Self::Deep];

    fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Wide => "wide",
            Self::Deep => "deep",
        }
    }

    /// `(levels of subgroups, subgroups per group, units per leaf group)`.
    fn shape(self) -> (usize, usize, usize) {
        match self {
            Self::Small => (2, 3, 4),
            Self::Wide => (2, 12, 20),
            Self::Deep => (6, 2, 3),
        }
    }
}

struct Builder {
    program: Program,
    next_element: u64,
    next_link: u64,
}

impl Builder {
    fn element_id(&mut self) -> ElementId {
        self.next_element += 1;
        ElementId::new(self.next_element.to_string()).expect("element id")
    }

    fn link(&mut self, parent: &ElementId, child: &ElementId, order: u32) {
        self.next_link += 1;
        let id = LinkId::new(format!("l{}", self.next_link)).expect("link id");
        self.program.insert_link(Link::new(id, parent.clone(), child.clone(), order));
    }

    fn grow(&mut self, parent: &ElementId, depth: usize, shape: (usize, usize, usize)) {
        let (levels, fanout, units) = shape;
        if depth == levels {
            for order in 0..units {
                let id = self.element_id();
                self.program.insert_element(Element::learning_unit(
                    id.clone(),
                    format!("LU{id}"),
                    format!("Learning unit {id}"),
                    5,
                ));
                self.link(parent, &id, order as u32);
            }
            return;
        }
        for order in 0..fanout {
            let id = self.element_id();
            self.program.insert_element(Element::group(
                id.clone(),
                format!("G{id}"),
                format!("Group {id}"),
                GroupType::SubGroup,
            ));
            self.link(parent, &id, order as u32);
            self.grow(&id, depth + 1, shape);
        }
    }
}

fn program_fixture(case: Case) -> (Program, ElementId) {
    let mut builder = Builder { program: Program::new(), next_element: 0, next_link: 0 };
    let root = builder.element_id();
    builder.program.insert_element(Element::group(
        root.clone(),
        "ROOT",
        "Benchmark training",
        GroupType::Training,
    ));
    builder.grow(&root, 0, case.shape());
    (builder.program, root)
}

// Benchmark identity (keep stable):
// - Group names in this file: `tree.build`, `tree.visible_rows`
// - Case IDs (the string after the `/`) must remain stable so results stay comparable.
fn benches_tree(c: &mut Criterion) {
    let mut build = c.benchmark_group("tree.build");
    for case in Case::ALL {
        let (program, root) = program_fixture(case);
        build.throughput(Throughput::Elements(program.links().count() as u64));
        build.bench_function(case.id(), |b| {
            b.iter(|| {
                black_box(build_tree(black_box(&program), black_box(&root)).expect("build_tree"))
            })
        });
    }
    build.finish();

    let mut rows = c.benchmark_group("tree.visible_rows");
    for case in Case::ALL {
        let (program, root) = program_fixture(case);
        let document = build_tree(&program, &root).expect("build_tree");
        let store = MemoryExpansionStore::default();
        let mut view = TreeView::new();
        view.load(document, &format!("/tree/{root}"), &store);
        rows.bench_function(case.id(), |b| b.iter(|| black_box(view.visible_rows().len())));
    }
    rows.finish();
}

criterion_group!(benches, benches_tree);
criterion_main!(benches);
