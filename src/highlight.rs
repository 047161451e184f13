use serde::{Deserialize, Serialize};

/// localStorage key the report page keeps its highlight array under.
pub const STORAGE_KEY: &str = "clazy-visualizer.highlights";

/// Per-category marker persisted by the report page. Serialized with the CSS class
/// suffixes Bootstrap uses for list-group items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Highlight {
    #[default]
    #[serde(rename = "action")]
    Unmarked,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "danger")]
    Danger,
}

/// The two marking actions exposed on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Warning,
    Danger,
}

impl Highlight {
    pub const ALL: [Highlight; 3] = [Highlight::Unmarked, Highlight::Warning, Highlight::Danger];

    pub fn as_str(self) -> &'static str {
        match self { Highlight::Unmarked => "action", Highlight::Warning => "warning", Highlight::Danger => "danger" }
    }

    /// Applying a mark toggles it: the same mark twice returns to unmarked, the other mark replaces it.
    pub fn apply(self, mark: Mark) -> Highlight {
        match (self, mark) {
            (Highlight::Warning, Mark::Warning) | (Highlight::Danger, Mark::Danger) => Highlight::Unmarked,
            (_, Mark::Warning) => Highlight::Warning,
            (_, Mark::Danger) => Highlight::Danger,
        }
    }
}

pub fn initial_state(n: usize) -> Vec<Highlight> { vec![Highlight::Unmarked; n] }

/// `{ "warning": { "action": "warning", ... }, "danger": { ... } }` for the page script.
pub fn transition_table() -> serde_json::Value {
    let mut table = serde_json::Map::new();
    for mark in [Mark::Warning, Mark::Danger] {
        let mut row = serde_json::Map::new();
        for from in Highlight::ALL { row.insert(from.as_str().to_string(), serde_json::Value::String(from.apply(mark).as_str().to_string())); }
        let key = match mark { Mark::Warning => "warning", Mark::Danger => "danger" };
        table.insert(key.to_string(), serde_json::Value::Object(row));
    }
    serde_json::Value::Object(table)
}
