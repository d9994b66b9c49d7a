//! Question categories, subcategories and their chat aliases
//!
//! Names and aliases are matched ignoring case and spaces, so `Am Lit`,
//! `amlit` and `american literature` all find American Literature. A
//! category resolves to every one of its subcategories; a subcategory
//! resolves to itself.

use std::collections::HashMap;

use once_cell_serde::sync::Lazy;

/// A top-level category and the subcategories it spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Canonical name, as used by the question API
    pub name: &'static str,
    /// Canonical subcategory names, in API order
    pub subcategories: &'static [&'static str],
}

/// Every category known to the question API
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Literature",
        subcategories: &[
            "American Literature",
            "British Literature",
            "Classical Literature",
            "European Literature",
            "World Literature",
            "Other Literature",
        ],
    },
    Category {
        name: "History",
        subcategories: &[
            "American History",
            "Ancient History",
            "European History",
            "World History",
            "Other History",
        ],
    },
    Category {
        name: "Science",
        subcategories: &["Biology", "Chemistry", "Physics", "Math", "Other Science"],
    },
    Category {
        name: "Fine Arts",
        subcategories: &["Visual Fine Arts", "Auditory Fine Arts", "Other Fine Arts"],
    },
    Category {
        name: "Religion",
        subcategories: &["Religion"],
    },
    Category {
        name: "Mythology",
        subcategories: &["Mythology"],
    },
    Category {
        name: "Philosophy",
        subcategories: &["Philosophy"],
    },
    Category {
        name: "Social Science",
        subcategories: &["Social Science"],
    },
    Category {
        name: "Current Events",
        subcategories: &["Current Events"],
    },
    Category {
        name: "Geography",
        subcategories: &["Geography"],
    },
    Category {
        name: "Other Academic",
        subcategories: &["Other Academic"],
    },
    Category {
        name: "Trash",
        subcategories: &["Trash"],
    },
];

/// Chat shorthands for categories and subcategories
pub const ALIASES: &[(&str, &[&str])] = &[
    ("Literature", &["l", "lit"]),
    (
        "American Literature",
        &["am lit", "us lit", "ameri lit", "american lit"],
    ),
    ("British Literature", &["brit lit", "british lit"]),
    ("Classical Literature", &["classic", "classics", "classical lit"]),
    ("European Literature", &["euro lit", "european lit"]),
    ("World Literature", &["world lit"]),
    ("Other Literature", &["other lit"]),
    ("History", &["h", "hist"]),
    (
        "American History",
        &["am hist", "us hist", "ameri hist", "american hist"],
    ),
    ("Ancient History", &["ancient hist"]),
    ("European History", &["euro hist", "european hist"]),
    ("World History", &["world hist"]),
    ("Other History", &["other hist"]),
    ("Science", &["sci"]),
    ("Biology", &["bio"]),
    ("Chemistry", &["chem"]),
    ("Physics", &["phys"]),
    ("Math", &["math"]),
    ("Other Science", &["other sci"]),
    ("Fine Arts", &["fa", "arts", "fine art"]),
    (
        "Visual Fine Arts",
        &["vfa", "vis fa", "vis arts", "vis fine art"],
    ),
    (
        "Auditory Fine Arts",
        &["afa", "audio fa", "audio arts", "audio fine art"],
    ),
    (
        "Other Fine Arts",
        &["other fa", "other arts", "other fine art"],
    ),
    ("Religion", &["r", "rel"]),
    ("Mythology", &["m", "myth"]),
    ("Philosophy", &["p", "phil"]),
    ("Social Science", &["ss", "soc sci"]),
    ("Current Events", &["ce", "curr events"]),
    ("Geography", &["g", "geo"]),
    ("Other Academic", &["o", "other academic"]),
    ("Trash", &["t", "trash"]),
];

/// Longest alias or name, in words
pub const MAX_NAME_WORDS: usize = 3;

/// Lookup key for a name or alias: lowercase with all whitespace removed
fn key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Subcategories a canonical category or subcategory name stands for
fn expand(name: &'static str) -> Option<&'static [&'static str]> {
    CATEGORIES.iter().find_map(|category| {
        if category.name == name {
            return Some(category.subcategories);
        }
        category
            .subcategories
            .iter()
            .find(|sub| **sub == name)
            .map(std::slice::from_ref)
    })
}

/// Every name and alias, keyed by [`key`]
///
/// Category names are inserted last so `Religion` and the other single
/// subcategory categories resolve identically either way.
static INDEX: Lazy<HashMap<String, &'static [&'static str]>> = Lazy::new(|| {
    let subcategory_names = CATEGORIES
        .iter()
        .flat_map(|category| category.subcategories.iter().copied());
    let category_names = CATEGORIES.iter().map(|category| category.name);
    let aliases = ALIASES.iter().flat_map(|&(name, aliases)| {
        aliases
            .iter()
            .filter_map(move |alias| expand(name).map(|subs| (key(alias), subs)))
    });

    subcategory_names
        .chain(category_names)
        .filter_map(|name| expand(name).map(|subs| (key(name), subs)))
        .chain(aliases)
        .collect()
});

/// Resolves a category name, subcategory name or alias to canonical subcategories
///
/// # Examples
///
/// ```rust
/// use qbot::category::resolve;
///
/// assert_eq!(resolve("math"), Some(&["Math"][..]));
/// assert_eq!(resolve("US Lit"), Some(&["American Literature"][..]));
/// assert_eq!(resolve("sci").map(<[_]>::len), Some(5));
/// assert_eq!(resolve("astrology"), None);
/// ```
pub fn resolve(name: &str) -> Option<&'static [&'static str]> {
    INDEX.get(&key(name)).copied()
}
