//! Flat `<ruleId>.<field>=value` rule files.
//!
//! This format needs nothing beyond the standard library, so it is the
//! format for built-in definitions and for projects that want no extra
//! tooling. Lists are comma-separated.

use std::collections::HashMap;

use super::types::{RuleCategory, RuleDefinition, Severity, TargetFilter};

/// Parse properties text into definitions, in first-appearance order.
///
/// Fields for the same id accumulate into one definition. Lines that are
/// not `key=value` / `key: value`, and keys without a `.`, are ignored with
/// a debug log.
pub fn parse_properties(content: &str) -> Vec<RuleDefinition> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, RuleDefinition> = HashMap::new();

    for (line_no, line) in logical_lines(content) {
        let Some((key, value)) = split_key_value(&line) else {
            tracing::debug!(line = line_no, "ignoring properties line without separator");
            continue;
        };
        let Some((id, field)) = key.split_once('.') else {
            tracing::debug!(line = line_no, key, "ignoring key without rule id prefix");
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            continue;
        }

        let definition = by_id.entry(id.to_string()).or_insert_with(|| {
            order.push(id.to_string());
            RuleDefinition::new(id)
        });
        apply_field(definition, field.trim(), value);
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

fn apply_field(definition: &mut RuleDefinition, field: &str, value: &str) {
    let criteria = &mut definition.criteria;
    match field {
        "name" => definition.name = value.to_string(),
        "description" => definition.description = value.to_string(),
        "category" => definition.category = RuleCategory::parse_lenient(value),
        "severity" => definition.severity = Severity::parse_lenient(value),
        "enabled" => definition.enabled = !value.eq_ignore_ascii_case("false"),
        "targets" => definition.targets = TargetFilter::new(split_list(value)),
        "pathPatterns" => criteria.path_patterns = split_list(value),
        "filePatterns" => criteria.file_patterns = split_list(value),
        "packagePatterns" => criteria.package_patterns = split_list(value),
        "mustContain" => criteria.dependencies.must_contain = split_list(value),
        "mustNotContain" => criteria.dependencies.must_not_contain = split_list(value),
        "exceptions" => criteria.dependencies.exceptions = split_list(value),
        "requiredChildOrder" => criteria.structure.required_child_order = split_list(value),
        "requiredElements" => criteria.structure.required_elements = split_list(value),
        "remediation" => definition.remediation = non_empty(value),
        "documentation" => definition.documentation = non_empty(value),
        other => {
            tracing::warn!(rule = %definition.id, field = other, "unknown rule field ignored");
        }
    }
}

/// Split a comma-separated value, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(['=', ':'])?;
    let key = line[..idx].trim();
    let value = line[idx + 1..].trim();
    (!key.is_empty()).then_some((key, value))
}

/// Joins `\`-continued lines and drops blanks and `#`/`!` comments.
/// Yields the 1-based number of each logical line's first physical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        let (start, mut acc) = match pending.take() {
            Some(p) => p,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        let trailing = trimmed.len() - trimmed.trim_end_matches('\\').len();
        if trailing % 2 == 1 {
            acc.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some((start, acc));
        } else {
            acc.push_str(trimmed);
            out.push((start, acc));
        }
    }
    if let Some(p) = pending {
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_accumulate_per_rule() {
        let defs = parse_properties(
            "# layering rules\n\
             LAY-001.name = API stays clean\n\
             LAY-001.severity=warning\n\
             LAY-001.mustNotContain=com.acme:*-core, com.acme:*-impl\n\
             ! second rule\n\
             LAY-002.name: Ordered children\n\
             LAY-002.requiredChildOrder=api,spi,core\n",
        );
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].id, "LAY-001");
        assert_eq!(defs[0].severity, Severity::Warning);
        assert_eq!(
            defs[0].criteria.dependencies.must_not_contain,
            vec!["com.acme:*-core", "com.acme:*-impl"]
        );
        assert_eq!(defs[1].name, "Ordered children");
        assert_eq!(
            defs[1].criteria.structure.required_child_order,
            vec!["api", "spi", "core"]
        );
    }

    #[test]
    fn unknown_tokens_fall_back() {
        let defs = parse_properties("X-001.severity=catastrophic\nX-001.category=vibes\n");
        assert_eq!(defs[0].severity, Severity::Error);
        assert_eq!(defs[0].category, RuleCategory::Structure);
    }

    #[test]
    fn continuation_lines_join() {
        let defs = parse_properties("X-001.description=first part \\\n    second part\n");
        assert_eq!(defs[0].description, "first part second part");
    }

    #[test]
    fn disabled_flag() {
        let defs = parse_properties("X-001.enabled=FALSE\nX-002.enabled=true\n");
        assert!(!defs[0].enabled);
        assert!(defs[1].enabled);
    }
}
