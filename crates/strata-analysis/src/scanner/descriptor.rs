//! Build descriptor parsing.
//!
//! The scanner only needs a handful of fields from each descriptor, so the
//! parser is a streaming pass over the XML that records the element path and
//! captures text at the paths it cares about.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use strata_core::errors::ParseError;

use super::types::{DependencySpec, ParentRef, ParsedDescriptor};

/// Parses a build descriptor file. Injectable so the scanner never depends
/// on a concrete format.
pub trait DescriptorParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<ParsedDescriptor, ParseError>;
}

/// XML descriptor parser (`<project>` documents) backed by `quick-xml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlDescriptorParser;

impl XmlDescriptorParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse descriptor text. `path` is only used for error messages.
    pub fn parse_str(&self, raw: &str, path: &Path) -> Result<ParsedDescriptor, ParseError> {
        let malformed = |message: String| ParseError::Malformed {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = Reader::from_str(raw);
        reader.config_mut().trim_text(true);

        let mut parsed = ParsedDescriptor {
            raw: raw.to_string(),
            ..Default::default()
        };
        let mut stack: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut parent: Option<ParentRef> = None;
        let mut dependency: Option<DependencySpec> = None;
        let mut saw_root = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if stack.is_empty() {
                        if saw_root {
                            return Err(malformed("multiple root elements".to_string()));
                        }
                        if name != "project" {
                            return Err(malformed(format!(
                                "root element is <{name}>, expected <project>"
                            )));
                        }
                        saw_root = true;
                    } else if stack.len() == 1 {
                        parsed.top_level_elements.insert(name.clone());
                    }
                    stack.push(name);
                    text.clear();

                    if path_is(&stack, &["project", "parent"]) {
                        parent = Some(ParentRef::default());
                    } else if path_is(&stack, &["project", "dependencies", "dependency"]) {
                        dependency = Some(DependencySpec::default());
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if stack.is_empty() {
                        return Err(malformed(format!("empty root element <{name}>")));
                    }
                    if stack.len() == 1 {
                        parsed.top_level_elements.insert(name);
                    }
                }
                Ok(Event::Text(t)) => {
                    let value = t
                        .unescape()
                        .map_err(|e| malformed(format!("bad text content: {e}")))?;
                    text.push_str(&value);
                }
                Ok(Event::CData(c)) => {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
                Ok(Event::End(_)) => {
                    let value = text.trim().to_string();
                    capture(&stack, value, &mut parsed, &mut parent, &mut dependency);
                    if path_is(&stack, &["project", "parent"]) {
                        parsed.parent = parent.take();
                    } else if path_is(&stack, &["project", "dependencies", "dependency"]) {
                        if let Some(dep) = dependency.take() {
                            parsed.dependencies.push(dep);
                        }
                    }
                    stack.pop();
                    text.clear();
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(malformed(format!(
                        "at byte {}: {e}",
                        reader.error_position()
                    )));
                }
            }
        }

        if !stack.is_empty() {
            return Err(malformed(format!("unclosed element <{}>", stack.join("/"))));
        }
        if !saw_root {
            return Err(malformed("no <project> element".to_string()));
        }

        Ok(parsed)
    }
}

impl DescriptorParser for XmlDescriptorParser {
    fn parse(&self, path: &Path) -> Result<ParsedDescriptor, ParseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&raw, path)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn path_is(stack: &[String], expected: &[&str]) -> bool {
    stack.len() == expected.len() && stack.iter().zip(expected).all(|(a, b)| a == b)
}

/// Store `value` if the element that just closed is one the engine reads.
fn capture(
    stack: &[String],
    value: String,
    parsed: &mut ParsedDescriptor,
    parent: &mut Option<ParentRef>,
    dependency: &mut Option<DependencySpec>,
) {
    let path: Vec<&str> = stack.iter().map(String::as_str).collect();

    match path.as_slice() {
        ["project", "artifactId"] => parsed.artifact_id = non_empty(&value),
        ["project", "groupId"] => parsed.group_id = non_empty(&value),
        ["project", "version"] => parsed.version = non_empty(&value),
        ["project", "packaging"] => parsed.packaging = non_empty(&value),
        ["project", "modules", "module"] => {
            if !value.is_empty() {
                parsed.modules.push(value);
            }
        }
        ["project", "parent", field] => {
            if let Some(p) = parent.as_mut() {
                match *field {
                    "groupId" => p.group_id = non_empty(&value),
                    "artifactId" => p.artifact_id = non_empty(&value),
                    "version" => p.version = non_empty(&value),
                    "relativePath" => p.relative_path = non_empty(&value),
                    _ => {}
                }
            }
        }
        ["project", "dependencies", "dependency", field] => {
            if let Some(d) = dependency.as_mut() {
                match *field {
                    "groupId" => d.group_id = value,
                    "artifactId" => d.artifact_id = value,
                    "version" => d.version = non_empty(&value),
                    "scope" => d.scope = non_empty(&value),
                    "optional" => d.optional = value.eq_ignore_ascii_case("true"),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
