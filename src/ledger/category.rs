use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Fixed set of spending categories an expense can be filed under.
///
/// Declaration order is the presentation order used by category totals.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Food,
    Transport,
    Utilities,
    Entertainment,
    Housing,
    Healthcare,
    Shopping,
    Education,
    Travel,
    Fitness,
    Gifts,
    Insurance,
    Savings,
    Other,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Entertainment,
        Category::Housing,
        Category::Healthcare,
        Category::Shopping,
        Category::Education,
        Category::Travel,
        Category::Fitness,
        Category::Gifts,
        Category::Insurance,
        Category::Savings,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Housing => "housing",
            Category::Healthcare => "healthcare",
            Category::Shopping => "shopping",
            Category::Education => "education",
            Category::Travel => "travel",
            Category::Fitness => "fitness",
            Category::Gifts => "gifts",
            Category::Insurance => "insurance",
            Category::Savings => "savings",
            Category::Other => "other",
        }
    }

    /// Capitalized label, e.g. `Food`.
    pub fn label(&self) -> String {
        let raw = self.as_str();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| LedgerError::Validation(format!("unknown category `{}`", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Transport".parse::<Category>().unwrap(), Category::Transport);
        assert_eq!(" gifts ".parse::<Category>().unwrap(), Category::Gifts);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "groceries".parse::<Category>().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Category::Healthcare).unwrap();
        assert_eq!(json, "\"healthcare\"");
    }

    #[test]
    fn all_follows_declaration_order() {
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
        assert_eq!(Category::ALL.first(), Some(&Category::Food));
        assert_eq!(Category::ALL.last(), Some(&Category::Other));
    }

    #[test]
    fn label_capitalizes_first_letter() {
        assert_eq!(Category::Entertainment.label(), "Entertainment");
    }
}
