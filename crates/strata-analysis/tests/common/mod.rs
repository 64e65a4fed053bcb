//! Project-tree fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use strata_analysis::rules::{RuleCategory, Severity, Violation};

/// A project tree under a temp dir. The root is a non-hidden subdirectory so
/// walks behave the same as on a real checkout.
pub struct Project {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        Self { _dir: dir, root }
    }

    /// Like `new`, but the root is a path relative to the working directory.
    pub fn relative() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("strata-rel-")
            .tempdir_in(".")
            .unwrap();
        let absolute = dir.path().join("project");
        fs::create_dir_all(&absolute).unwrap();
        let cwd = std::env::current_dir().unwrap();
        let root = absolute.strip_prefix(&cwd).unwrap_or(&absolute).to_path_buf();
        assert!(root.is_relative(), "{}", root.display());
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        if rel.is_empty() || rel == "." {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `<rel>/pom.xml`.
    pub fn pom(&self, rel: &str, content: &str) -> PathBuf {
        let file = if rel.is_empty() || rel == "." {
            "pom.xml".to_string()
        } else {
            format!("{rel}/pom.xml")
        };
        self.file(&file, content)
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }
}

/// Aggregator descriptor (packaging pom) with the given modules and
/// project-level dependency identifiers (`group:artifact`).
pub fn aggregator_pom(artifact: &str, modules: &[&str], deps: &[&str]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project>\n");
    xml.push_str("  <modelVersion>4.0.0</modelVersion>\n");
    xml.push_str("  <groupId>com.acme</groupId>\n");
    xml.push_str(&format!("  <artifactId>{artifact}</artifactId>\n"));
    xml.push_str("  <version>1.0.0</version>\n");
    xml.push_str("  <packaging>pom</packaging>\n");
    if !modules.is_empty() {
        xml.push_str("  <modules>\n");
        for m in modules {
            xml.push_str(&format!("    <module>{m}</module>\n"));
        }
        xml.push_str("  </modules>\n");
    }
    push_dependencies(&mut xml, deps);
    xml.push_str("</project>\n");
    xml
}

/// Jar descriptor with a parent reference.
pub fn leaf_pom(artifact: &str, deps: &[&str]) -> String {
    let mut xml = String::from("<project>\n");
    xml.push_str("  <parent>\n    <groupId>com.acme</groupId>\n    <artifactId>acme-parent</artifactId>\n    <version>1.0.0</version>\n  </parent>\n");
    xml.push_str(&format!("  <artifactId>{artifact}</artifactId>\n"));
    push_dependencies(&mut xml, deps);
    xml.push_str("</project>\n");
    xml
}

/// Jar descriptor without a parent.
pub fn standalone_pom(artifact: &str) -> String {
    format!("<project>\n  <groupId>com.acme</groupId>\n  <artifactId>{artifact}</artifactId>\n</project>\n")
}

fn push_dependencies(xml: &mut String, deps: &[&str]) {
    if deps.is_empty() {
        return;
    }
    xml.push_str("  <dependencies>\n");
    for dep in deps {
        let (group, artifact) = dep.split_once(':').unwrap();
        xml.push_str(&format!(
            "    <dependency>\n      <groupId>{group}</groupId>\n      <artifactId>{artifact}</artifactId>\n    </dependency>\n"
        ));
    }
    xml.push_str("  </dependencies>\n");
}

/// A violation located at `location`, for driving fixers directly.
pub fn violation(rule_id: &str, location: &Path) -> Violation {
    Violation {
        rule_id: rule_id.to_string(),
        rule_name: rule_id.to_string(),
        target: "test".to_string(),
        message: format!("{rule_id} violated"),
        severity: Severity::Error,
        category: RuleCategory::Structure,
        location: location.to_path_buf(),
        suggested_fix: None,
        documentation: None,
    }
}
