use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*(?::\s*(.*))?$").expect("selector label pattern to compile")
});

/// A selector entry: a row id tagged with the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub label: String,
}

impl Choice {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Extracts the id from a display label such as `"12: Ivanov Petr"` or a bare `"12"`.
    pub fn id_from_label(label: &str) -> Option<i64> {
        LABEL_PATTERN
            .captures(label)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// The `"id: label"` form shown in selector lists.
    pub fn display_label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.label)
    }
}

/// Joins name parts with single spaces, skipping empty ones.
pub fn full_name(last: &str, first: &str, middle: &str) -> String {
    [last, first, middle]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_comes_from_label_prefix() {
        assert_eq!(Choice::id_from_label("12: Ivanov Petr"), Some(12));
        assert_eq!(Choice::id_from_label("  7 :Massage"), Some(7));
        assert_eq!(Choice::id_from_label("3"), Some(3));
        assert_eq!(Choice::id_from_label("Ivanov"), None);
        assert_eq!(Choice::id_from_label(""), None);
    }

    #[test]
    fn display_label_round_trips_id() {
        let choice = Choice::new(4, "Sidorova Anna Ivanovna");
        assert_eq!(choice.display_label(), "4: Sidorova Anna Ivanovna");
        assert_eq!(Choice::id_from_label(&choice.display_label()), Some(4));
    }

    #[test]
    fn full_name_skips_blank_middle_name() {
        assert_eq!(full_name("Ivanov", "Petr", ""), "Ivanov Petr");
        assert_eq!(full_name("Ivanov", "Petr", "Sergeevich"), "Ivanov Petr Sergeevich");
    }
}
