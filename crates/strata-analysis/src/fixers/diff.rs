//! Line-based unified diffs for fix previews and reports.

use std::fmt::Write;

const CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// Unified diff of `old` → `new` labelled with `path`. Empty when the
/// texts are equal.
pub fn unified_diff(path: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();
    let script = edit_script(&a, &b);

    let mut out = String::new();
    let _ = writeln!(out, "--- a/{path}");
    let _ = writeln!(out, "+++ b/{path}");

    for (start, end) in hunks(&script) {
        // Lines consumed on each side before the hunk.
        let (mut old_line, mut new_line) = (0usize, 0usize);
        for (op, _) in &script[..start] {
            advance(*op, &mut old_line, &mut new_line);
        }
        let (old_start, new_start) = (old_line, new_line);
        let mut body = String::new();
        for (op, line) in &script[start..end] {
            let marker = match op {
                Op::Equal => ' ',
                Op::Delete => '-',
                Op::Insert => '+',
            };
            let _ = writeln!(body, "{marker}{line}");
            advance(*op, &mut old_line, &mut new_line);
        }
        let old_len = old_line - old_start;
        let new_len = new_line - new_start;
        let _ = writeln!(
            out,
            "@@ -{},{} +{},{} @@",
            hunk_start(old_start, old_len),
            old_len,
            hunk_start(new_start, new_len),
            new_len
        );
        out.push_str(&body);
    }
    out
}

fn advance(op: Op, old_line: &mut usize, new_line: &mut usize) {
    match op {
        Op::Equal => {
            *old_line += 1;
            *new_line += 1;
        }
        Op::Delete => *old_line += 1,
        Op::Insert => *new_line += 1,
    }
}

/// 1-based start line; an empty range points at the line before it.
fn hunk_start(consumed: usize, len: usize) -> usize {
    if len == 0 {
        consumed
    } else {
        consumed + 1
    }
}

/// Shortest edit script. The common prefix and suffix are matched
/// directly; only the changed middle goes through the LCS table.
fn edit_script<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<(Op, &'a str)> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut script = Vec::with_capacity(a.len() + b.len());
    script.extend(a[..prefix].iter().map(|l| (Op::Equal, *l)));
    middle_script(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix], &mut script);
    script.extend(a[a.len() - suffix..].iter().map(|l| (Op::Equal, *l)));
    script
}

fn middle_script<'a>(a: &[&'a str], b: &[&'a str], script: &mut Vec<(Op, &'a str)>) {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    // Row-major (n + 1) x (m + 1).
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            script.push((Op::Equal, a[i]));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            script.push((Op::Delete, a[i]));
            i += 1;
        } else {
            script.push((Op::Insert, b[j]));
            j += 1;
        }
    }
    script.extend(a[i..].iter().map(|l| (Op::Delete, *l)));
    script.extend(b[j..].iter().map(|l| (Op::Insert, *l)));
}

/// Script index ranges of hunks: each change run padded with context,
/// overlapping ranges merged.
fn hunks(script: &[(Op, &str)]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for (idx, (op, _)) in script.iter().enumerate() {
        if *op == Op::Equal {
            continue;
        }
        let start = idx.saturating_sub(CONTEXT);
        let end = (idx + 1 + CONTEXT).min(script.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => ranges.push((start, end)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::unified_diff;

    #[test]
    fn equal_texts_have_no_diff() {
        assert_eq!(unified_diff("pom.xml", "a\nb\n", "a\nb\n"), "");
    }

    #[test]
    fn removal_hunk_has_context_and_header() {
        let old = "1\n2\n3\n4\n5\n6\n7\n8\n";
        let new = "1\n2\n3\n4\n6\n7\n8\n";
        let diff = unified_diff("m/pom.xml", old, new);
        assert!(diff.starts_with("--- a/m/pom.xml\n+++ b/m/pom.xml\n"));
        assert!(diff.contains("@@ -2,7 +2,6 @@\n"), "{diff}");
        assert!(diff.contains("\n-5\n"));
        assert!(!diff.contains("\n 1\n"), "context is limited to three lines");
    }

    #[test]
    fn distant_changes_make_separate_hunks() {
        let old: String = (1..=20).map(|i| format!("{i}\n")).collect();
        let new: String = (1..=20)
            .map(|i| match i {
                2 => "two\n".to_string(),
                19 => "nineteen\n".to_string(),
                _ => format!("{i}\n"),
            })
            .collect();
        let diff = unified_diff("f", &old, &new);
        assert_eq!(diff.matches("@@ -").count(), 2, "{diff}");
    }

    #[test]
    fn single_edit_in_a_large_file() {
        let old: String = (0..50_000).map(|i| format!("<line>{i}</line>\n")).collect();
        let new = old.replace("<line>25000</line>\n", "");
        let diff = unified_diff("pom.xml", &old, &new);
        assert!(diff.contains("@@ -24998,7 +24998,6 @@\n"), "{diff}");
        assert!(diff.contains("\n-<line>25000</line>\n"));
        assert_eq!(diff.matches("@@ -").count(), 1);
    }

    #[test]
    fn insertion_into_empty_file() {
        let diff = unified_diff("f", "", "a\n");
        assert!(diff.contains("@@ -0,0 +1,1 @@\n+a\n"), "{diff}");
    }
}
