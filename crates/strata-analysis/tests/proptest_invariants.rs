//! Property tests for rollback, fixer selection, and diffs.

mod common;

use std::fs;
use std::sync::Arc;

use common::{violation, Project};
use proptest::prelude::*;
use strata_analysis::backup::BackupManager;
use strata_analysis::fixers::{unified_diff, FixResult, Fixer, FixerContext, FixerRegistry};
use strata_analysis::rules::Violation;
use strata_core::errors::FixError;

struct Ranked {
    name: String,
    priority: i32,
}

impl Fixer for Ranked {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_rules(&self) -> &[&str] {
        &["AGG-001"]
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn fix(&self, violation: &Violation, _ctx: &mut FixerContext) -> Result<FixResult, FixError> {
        Ok(FixResult::skipped(violation, "unused"))
    }
}

fn priorities_and_order() -> impl Strategy<Value = (Vec<i32>, Vec<usize>)> {
    prop::collection::vec(0i32..5, 1..8).prop_flat_map(|priorities| {
        let order: Vec<usize> = (0..priorities.len()).collect();
        (Just(priorities), Just(order).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn rollback_restores_exact_bytes(
        originals in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 1..5),
        junk in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let p = Project::new();
        let files: Vec<_> = originals
            .iter()
            .enumerate()
            .map(|(i, bytes)| {
                let path = p.path(&format!("m{i}/pom.xml"));
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, bytes).unwrap();
                path
            })
            .collect();

        let manager = BackupManager::with_default_dir(p.root());
        let mut tx = manager.begin_transaction();
        for file in &files {
            prop_assert!(tx.backup(file).unwrap().success);
            fs::write(file, &junk).unwrap();
        }
        tx.rollback().unwrap();

        for (file, bytes) in files.iter().zip(&originals) {
            prop_assert_eq!(&fs::read(file).unwrap(), bytes);
        }
        prop_assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn selection_ignores_registration_order((priorities, order) in priorities_and_order()) {
        let registry = FixerRegistry::new();
        for &i in &order {
            registry.register(Arc::new(Ranked {
                name: format!("fixer-{i}"),
                priority: priorities[i],
            }));
        }

        let best = priorities.iter().copied().max().unwrap();
        let expected = priorities
            .iter()
            .enumerate()
            .filter(|(_, prio)| **prio == best)
            .map(|(i, _)| format!("fixer-{i}"))
            .min()
            .unwrap();

        let v = violation("AGG-001", std::path::Path::new("."));
        let chosen = registry.find_fixer_for(&v).unwrap();
        prop_assert_eq!(chosen.name(), expected.as_str());
    }

    #[test]
    fn diff_is_empty_only_for_equal_texts(
        old in prop::collection::vec("[a-c]{0,3}", 0..12),
        new in prop::collection::vec("[a-c]{0,3}", 0..12),
    ) {
        let old = old.iter().map(|l| format!("{l}\n")).collect::<String>();
        let new = new.iter().map(|l| format!("{l}\n")).collect::<String>();
        let diff = unified_diff("pom.xml", &old, &new);
        if old == new {
            prop_assert!(diff.is_empty());
        } else {
            prop_assert!(diff.starts_with("--- a/pom.xml\n+++ b/pom.xml\n@@ -"));
        }
    }
}
