//! Guest list loaders.
//!
//! The text format lists each person on a line of their own, followed by one
//! `<other> <utility>` line per neighbour they care about:
//!
//! ```text
//! A
//! B 1
//! C 2
//! B
//! A 1
//! C -1
//! ```
//!
//! Blank lines and `#` comments are ignored. The JSON format maps each person
//! to an object of utilities: `{"A": {"B": 1, "C": 2}, "B": {"A": 1}}`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use thiserror::Error;
use tracing::debug;

use crate::model::entity::{Name, Person, Utility};
use crate::model::guest::GuestList;
use crate::model::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Text,
    Json,
}

impl InputFormat {
    /// `.json` files are JSON, everything else is text.
    pub fn detect(path: &Path) -> InputFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Text,
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(InputFormat::Text),
            "json" => Ok(InputFormat::Json),
            other => Err(format!("unknown input format `{other}` (expected text or json)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read guest list at {path}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("syntax error on line {line}: `{content}`")]
    Syntax { line: usize, content: String },
    #[error("line {line} gives a utility before any person was named")]
    UtilityBeforePerson { line: usize },
    #[error("{}`{person}` already has a utility toward `{other}`", line_prefix(.line))]
    DuplicateUtility {
        person: Name,
        other: Name,
        line: Option<usize>,
    },
    #[error("malformed JSON guest list")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|line| format!("line {line}: ")).unwrap_or_default()
}

pub fn load(path: impl AsRef<Path>, format: Option<InputFormat>) -> Result<GuestList, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let format = format.unwrap_or_else(|| InputFormat::detect(path));
    let guests = match format {
        InputFormat::Text => parse_text(&text)?,
        InputFormat::Json => parse_json(&text)?,
    };
    debug!(path = %path.display(), ?format, guests = guests.len(), "loaded guest list");
    Ok(guests)
}

enum Line<'a> {
    Blank,
    Person(&'a str),
    Utility(&'a str, Utility),
}

fn classify(content: &str) -> Option<Line<'_>> {
    let content = content.trim();
    if content.is_empty() || content.starts_with('#') {
        return Some(Line::Blank);
    }
    let mut tokens = content.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(name), None, None) => Some(Line::Person(name)),
        (Some(other), Some(value), None) => value.parse().ok().map(|utility| Line::Utility(other, utility)),
        _ => None,
    }
}

pub fn parse_text(text: &str) -> Result<GuestList, LoadError> {
    let mut guests = GuestList::new();
    let mut current: Option<Person> = None;

    for (index, content) in text.lines().enumerate() {
        let line = index + 1;
        match classify(content) {
            Some(Line::Blank) => {}
            Some(Line::Person(name)) => {
                if let Some(person) = current.replace(Person::new(name)) {
                    guests.insert(person)?;
                }
            }
            Some(Line::Utility(other, utility)) => {
                let person = current
                    .as_mut()
                    .ok_or(LoadError::UtilityBeforePerson { line })?;
                if person.has_utility(other) {
                    return Err(LoadError::DuplicateUtility {
                        person: person.name.clone(),
                        other: other.to_string(),
                        line: Some(line),
                    });
                }
                person.set_utility(other, utility)?;
            }
            None => {
                return Err(LoadError::Syntax {
                    line,
                    content: content.to_string(),
                })
            }
        }
    }
    if let Some(person) = current {
        guests.insert(person)?;
    }
    Ok(guests)
}

pub fn parse_json(text: &str) -> Result<GuestList, LoadError> {
    let JsonGuests(guests) = serde_json::from_str::<JsonGuests>(text).map_err(|source| LoadError::Json { source })?;
    guests
}

/// Top-level JSON object, read entry by entry so repeated names are caught.
struct JsonGuests(Result<GuestList, LoadError>);

/// One person's utilities in document order, repeats included.
struct JsonUtilities(Vec<(Name, Utility)>);

impl<'de> Deserialize<'de> for JsonGuests {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GuestsVisitor;

        impl<'de> Visitor<'de> for GuestsVisitor {
            type Value = JsonGuests;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping each guest to their utilities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonGuests, A::Error> {
                let mut guests = GuestList::new();
                let mut failure = None;
                while let Some(name) = map.next_key::<Name>()? {
                    // Keep consuming after a failure so the document still parses to the end.
                    if failure.is_some() {
                        map.next_value::<IgnoredAny>()?;
                        continue;
                    }
                    let JsonUtilities(utilities) = map.next_value::<JsonUtilities>()?;
                    if let Err(err) = add_person(&mut guests, name, utilities) {
                        failure = Some(err);
                    }
                }
                Ok(JsonGuests(match failure {
                    Some(err) => Err(err),
                    None => Ok(guests),
                }))
            }
        }

        deserializer.deserialize_map(GuestsVisitor)
    }
}

impl<'de> Deserialize<'de> for JsonUtilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UtilitiesVisitor;

        impl<'de> Visitor<'de> for UtilitiesVisitor {
            type Value = JsonUtilities;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping guest names to integer utilities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonUtilities, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<Name, Utility>()? {
                    entries.push(entry);
                }
                Ok(JsonUtilities(entries))
            }

            fn visit_unit<E: de::Error>(self) -> Result<JsonUtilities, E> {
                Ok(JsonUtilities(Vec::new()))
            }
        }

        deserializer.deserialize_any(UtilitiesVisitor)
    }
}

fn add_person(guests: &mut GuestList, name: Name, utilities: Vec<(Name, Utility)>) -> Result<(), LoadError> {
    let mut person = Person::new(name);
    for (other, utility) in utilities {
        if person.has_utility(&other) {
            return Err(LoadError::DuplicateUtility {
                person: person.name,
                other,
                line: None,
            });
        }
        person.set_utility(other, utility)?;
    }
    guests.insert(person)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const LOVE_TRIANGLE: &str = "A\nB 1\nC 2\nB\nA 1\nC 2\nC\nA 2\nB 2\n";

    #[test]
    fn parses_love_triangle() {
        let guests = parse_text(LOVE_TRIANGLE).unwrap();
        assert_eq!(guests.len(), 3);
        assert_eq!(guests.utility("A", "C"), 2);
        assert_eq!(guests.utility("B", "A"), 1);
    }

    #[test]
    fn accepts_zero_negative_and_multi_digit_utilities() {
        let guests = parse_text("A\nB 0\nC -12\n\n# trailing comment\nB\nC\n").unwrap();
        assert_eq!(guests.utility("A", "B"), 0);
        assert!(guests.get("A").unwrap().has_utility("B"));
        assert_eq!(guests.utility("A", "C"), -12);
        assert_eq!(guests.len(), 3);
    }

    #[test]
    fn person_without_utilities_is_kept() {
        let guests = parse_text("A\nB\n").unwrap();
        assert_eq!(guests.names().cloned().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let err = parse_text("A\nB one\n").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 2, ref content } if content == "B one"));

        let err = parse_text("A\nB 1 2\n").unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 2, .. }));
    }

    #[test]
    fn utility_before_person() {
        let err = parse_text("\nB 1\nA\n").unwrap_err();
        assert!(matches!(err, LoadError::UtilityBeforePerson { line: 2 }));
    }

    #[test]
    fn duplicate_entries_are_errors() {
        let err = parse_text("A\nB 1\nB 2\nB\n").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateUtility { line: Some(3), .. }));
        assert_eq!(err.to_string(), "line 3: `A` already has a utility toward `B`");

        let err = parse_text("A\nA\n").unwrap_err();
        assert!(matches!(err, LoadError::Model(ModelError::DuplicatePerson { .. })));

        let err = parse_text("A\nA 3\n").unwrap_err();
        assert!(matches!(err, LoadError::Model(ModelError::SelfReference { .. })));
    }

    #[test]
    fn dangling_reference_is_left_to_the_graph() {
        let guests = parse_text("A\nGhost 1\n").unwrap();
        assert_eq!(guests.len(), 1);
    }

    #[test]
    fn parses_json() {
        let guests = parse_json(r#"{"A": {"B": 5}, "B": {}}"#).unwrap();
        assert_eq!(guests.utility("A", "B"), 5);
        assert_eq!(guests.utility("B", "A"), 0);

        let err = parse_json(r#"{"A": {"A": 1}}"#).unwrap_err();
        assert!(matches!(err, LoadError::Model(ModelError::SelfReference { .. })));

        let err = parse_json(r#"{"A": {"B": "lots"}}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn json_duplicate_person_is_an_error() {
        let err = parse_json(r#"{"A": {"B": 1}, "A": {}, "B": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Model(ModelError::DuplicatePerson { ref name }) if name == "A"
        ));
    }

    #[test]
    fn json_duplicate_utility_is_an_error() {
        let err = parse_json(r#"{"A": {"B": 1, "B": 2}, "B": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateUtility { ref person, ref other, line: None } if person == "A" && other == "B"
        ));
        assert_eq!(err.to_string(), "`A` already has a utility toward `B`");
    }

    #[test]
    fn json_person_may_be_null_or_empty() {
        let guests = parse_json(r#"{"A": null, "B": {}}"#).unwrap();
        assert_eq!(guests.len(), 2);
    }

    #[test]
    fn json_must_be_an_object() {
        let err = parse_json(r#"[["A", "B"]]"#).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        let err = parse_json(r#"{"A": {"B": 1}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn load_detects_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("row.json");
        fs::write(&json_path, r#"{"A": {"B": 1}, "B": {"A": 1}}"#).unwrap();
        assert_eq!(load(&json_path, None).unwrap().len(), 2);

        let mut text = tempfile::NamedTempFile::new().unwrap();
        text.write_all(LOVE_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(load(text.path(), Some(InputFormat::Text)).unwrap().len(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load("/definitely/not/here.txt", None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn format_names() {
        assert_eq!("JSON".parse::<InputFormat>(), Ok(InputFormat::Json));
        assert_eq!("text".parse::<InputFormat>(), Ok(InputFormat::Text));
        assert!("yaml".parse::<InputFormat>().is_err());
    }
}
