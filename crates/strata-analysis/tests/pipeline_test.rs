//! End-to-end runs: scan, evaluate, fix, report.

mod common;

use std::sync::Arc;

use common::{aggregator_pom, leaf_pom, Project};
use strata_analysis::fixers::FixerRegistry;
use strata_analysis::report::{read_consolidated, FixReport, ReportStatus};
use strata_analysis::rules::Severity;
use strata_analysis::Pipeline;
use strata_core::config::StrataConfig;
use strata_core::errors::{PipelineError, ScanError};
use strata_core::traits::{Cancellable, CancellationToken};

/// Root aggregator declaring a dependency, one leaf below it.
fn project_with_aggregator_dependency() -> Project {
    let p = Project::new();
    p.pom(".", &aggregator_pom("acme-root", &["billing"], &["org.slf4j:slf4j-api"]));
    p.pom("billing", &leaf_pom("billing", &["org.slf4j:slf4j-api"]));
    p
}

fn config(toml: &str) -> StrataConfig {
    StrataConfig::from_toml(toml).unwrap()
}

fn agg_count(pipeline: &Pipeline, p: &Project) -> usize {
    pipeline
        .evaluate_only(p.root())
        .unwrap()
        .violations
        .iter()
        .filter(|v| v.rule_id == "AGG-001")
        .count()
}

#[test]
fn fixing_removes_the_violation() {
    let p = project_with_aggregator_dependency();
    let pipeline = Pipeline::new(StrataConfig::default());
    assert_eq!(agg_count(&pipeline, &p), 1);

    let outcome = pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.modules_scanned, 2);
    assert_eq!(outcome.fix_run.summary.fixed, 1);
    assert_eq!(outcome.report.status, ReportStatus::Success);
    assert!(!p.read("pom.xml").contains("<dependencies>"));
    assert!(p.read("billing/pom.xml").contains("<dependencies>"));

    assert_eq!(agg_count(&pipeline, &p), 0);
}

#[test]
fn relative_root_is_fixed_in_place() {
    let p = Project::relative();
    p.pom(".", &aggregator_pom("acme-root", &["billing"], &["org.slf4j:slf4j-api"]));
    p.pom("billing", &leaf_pom("billing", &["org.slf4j:slf4j-api"]));

    let outcome = Pipeline::new(StrataConfig::default())
        .run(p.root(), &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.fix_run.summary.fixed, 1, "{:?}", outcome.fix_run.results);
    assert_eq!(outcome.report.status, ReportStatus::Success);
    assert!(!p.read("pom.xml").contains("<dependencies>"));
    assert!(p.path(".strata-backups/pom.xml.bak").exists());
}

#[test]
fn dry_run_reports_without_touching_the_tree() {
    let p = project_with_aggregator_dependency();
    let before = p.read("pom.xml");
    let pipeline = Pipeline::new(config("[fix]\ndry_run = true\n"));

    let outcome = pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.fix_run.summary.dry_run, 1);
    assert_eq!(outcome.report.status, ReportStatus::Completed);
    assert!(outcome.report.metadata.dry_run);
    assert!(outcome.report.fixes.dry_run[0].diffs[0].contains("-  <dependencies>"));
    assert_eq!(p.read("pom.xml"), before);
    assert!(!p.path(".strata-backups").exists());
}

#[test]
fn reports_are_written_where_configured() {
    let p = project_with_aggregator_dependency();
    let pipeline = Pipeline::new(config(
        "[report]\noutput = \"out/fix-report.json\"\nconsolidated = \"out/all.json\"\nmodule_name = \"acme\"\n",
    ));

    let outcome = pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    let written: FixReport = serde_json::from_str(&p.read("out/fix-report.json")).unwrap();
    assert_eq!(written.status, outcome.report.status);
    assert_eq!(written.summary.counts.fixed, 1);

    let consolidated = read_consolidated(&p.path("out/all.json")).unwrap();
    assert_eq!(consolidated.modules.len(), 1);
    assert_eq!(consolidated.module("acme").unwrap().summary.fixed, 1);
}

#[test]
fn consolidated_module_name_defaults_to_root_directory() {
    let p = project_with_aggregator_dependency();
    let pipeline = Pipeline::new(config("[fix]\ndry_run = true\n[report]\nconsolidated = \"all.json\"\n"));
    pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    let consolidated = read_consolidated(&p.path("all.json")).unwrap();
    assert!(consolidated.module("project").is_some());
}

#[test]
fn clean_run_can_drop_staged_backups() {
    let p = project_with_aggregator_dependency();

    let keep = Pipeline::new(StrataConfig::default());
    let outcome = keep.run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.backups_cleaned, 0);
    assert!(p.path(".strata-backups/pom.xml.bak").exists());

    let q = project_with_aggregator_dependency();
    let clean = Pipeline::new(config("[fix]\ncleanup_on_success = true\n"));
    let outcome = clean.run(q.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.backups_cleaned, 1);
    assert!(!q.path(".strata-backups").exists());
}

#[test]
fn disabled_fixer_skips_everything() {
    let p = project_with_aggregator_dependency();
    let before = p.read("pom.xml");
    let pipeline = Pipeline::new(config("[fix]\ndisabled_fixers = [\"aggregator-dependencies\"]\n"));

    let outcome = pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.report.status, ReportStatus::AllSkipped);
    assert_eq!(p.read("pom.xml"), before);
    assert!(!pipeline.fixers().is_disabled("aggregator-dependencies"));
}

#[test]
fn configured_disabled_fixers_do_not_leak_into_the_shared_registry() {
    let fixers = Arc::new(FixerRegistry::builtin());
    let p = project_with_aggregator_dependency();
    Pipeline::new(config("[fix]\ndisabled_fixers = [\"aggregator-dependencies\"]\n"))
        .with_fixers(Arc::clone(&fixers))
        .run(p.root(), &CancellationToken::new())
        .unwrap();
    assert!(!fixers.is_disabled("aggregator-dependencies"));

    let outcome = Pipeline::new(StrataConfig::default())
        .with_fixers(fixers)
        .run(p.root(), &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.fix_run.summary.fixed, 1);
}

#[test]
fn staging_dir_on_a_module_is_refused() {
    let p = project_with_aggregator_dependency();
    let before = p.read("pom.xml");
    let pipeline = Pipeline::new(config("[fix]\nbackup_dir = \"billing\"\ncleanup_on_success = true\n"));

    let err = pipeline.run(p.root(), &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)), "{err}");
    assert_eq!(p.read("pom.xml"), before);
    assert!(p.path("billing/pom.xml").exists());
}

#[test]
fn cleanup_with_plain_staging_dir_spares_other_files() {
    let p = project_with_aggregator_dependency();
    p.file("tools/notes.txt", "keep me");
    let pipeline = Pipeline::new(config("[fix]\nbackup_dir = \"tools\"\ncleanup_on_success = true\n"));

    let outcome = pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.backups_cleaned, 1);
    assert_eq!(p.read("tools/notes.txt"), "keep me");
    assert!(!p.path("tools/pom.xml.bak").exists());
    assert!(p.path("billing/pom.xml").exists());
}

#[test]
fn disabled_rule_is_neither_reported_nor_fixed() {
    let p = project_with_aggregator_dependency();
    let pipeline = Pipeline::new(config("[rules]\ndisabled = [\"AGG-001\"]\n"));
    assert_eq!(agg_count(&pipeline, &p), 0);

    let outcome = pipeline.run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.fix_run.summary.total, 0);
    assert!(p.read("pom.xml").contains("<dependencies>"));
}

#[test]
fn severity_overrides_apply_to_violations() {
    let p = project_with_aggregator_dependency();
    let pipeline = Pipeline::new(config("[rules.severity_overrides]\n\"AGG-001\" = \"info\"\n"));
    let evaluation = pipeline.evaluate_only(p.root()).unwrap();
    let agg = evaluation.violations.iter().find(|v| v.rule_id == "AGG-001").unwrap();
    assert_eq!(agg.severity, Severity::Info);
}

#[test]
fn missing_required_rule_source_aborts() {
    let p = project_with_aggregator_dependency();
    let pipeline = Pipeline::new(config(
        "[[rules.sources]]\npath = \"config/rules.properties\"\nrequired = true\n",
    ));
    let err = pipeline.run(p.root(), &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert!(p.read("pom.xml").contains("<dependencies>"));
}

#[test]
fn missing_root_aborts() {
    let p = Project::new();
    let err = Pipeline::new(StrataConfig::default())
        .run(&p.path("missing"), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Scan(ScanError::RootNotFound { .. })));
}

#[test]
fn cancelled_before_start_changes_nothing() {
    let p = project_with_aggregator_dependency();
    let before = p.read("pom.xml");
    let token = CancellationToken::new();
    token.cancel();

    let err = Pipeline::new(StrataConfig::default())
        .run(p.root(), &token)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(p.read("pom.xml"), before);
}

#[test]
fn project_config_file_is_honoured() {
    let p = project_with_aggregator_dependency();
    p.file("strata.toml", "[fix]\ndry_run = true\n");
    let config = StrataConfig::load(p.root(), None).unwrap();
    assert!(config.fix.effective_dry_run());

    let outcome = Pipeline::new(config).run(p.root(), &CancellationToken::new()).unwrap();
    assert_eq!(outcome.fix_run.summary.dry_run, 1);
}
