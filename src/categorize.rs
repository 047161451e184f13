use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// How a line carrying several known labels is attributed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Only the first label in catalog order receives the block.
    #[default]
    First,
    /// Every label on the line receives a copy of the block.
    All,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub label: String,
    pub count: usize,
    pub attributed_text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categorized {
    pub used_categories: Vec<CategoryRecord>,
    pub total_occurrences: usize,
}

/// Number of lines containing each catalog label, indexed like `catalog.labels()`.
/// Matching runs on the raw line text; a label found twice on one line counts once.
pub fn count_occurrences(lines: &[String], catalog: &Catalog) -> Vec<usize> {
    let mut counts = vec![0usize; catalog.len()];
    for line in lines {
        for (i, label) in catalog.labels().iter().enumerate() {
            if line.contains(label.as_str()) { counts[i] += 1; }
        }
    }
    counts
}

/// Builds one record per used label. `used` must be in catalog order with non-zero counts.
///
/// A line containing any used label starts a new block; following lines are appended to
/// that block until the next such line. Lines before the first header are dropped.
pub fn attribute(lines: &[String], used: &[(String, usize)], tie: TieBreak) -> Vec<CategoryRecord> {
    let index: HashMap<&str, usize> = used.iter().enumerate().map(|(i, (label, _))| (label.as_str(), i)).collect();
    let mut records: Vec<CategoryRecord> = used
        .iter()
        .map(|(label, count)| CategoryRecord { label: label.clone(), count: *count, attributed_text: String::new() })
        .collect();
    let mut targets: Vec<usize> = Vec::new();
    for line in lines {
        let mut found = used.iter().map(|(label, _)| label.as_str()).filter(|label| line.contains(*label)).peekable();
        if found.peek().is_some() {
            targets = match tie {
                TieBreak::First => found.take(1).map(|l| index[l]).collect(),
                TieBreak::All => found.map(|l| index[l]).collect(),
            };
        }
        for &t in &targets {
            let text = &mut records[t].attributed_text;
            text.push_str(line);
            text.push('\n');
        }
    }
    records
}

pub fn categorize(lines: &[String], catalog: &Catalog, tie: TieBreak) -> Categorized {
    let counts = count_occurrences(lines, catalog);
    let used: Vec<(String, usize)> = catalog
        .labels()
        .iter()
        .zip(counts)
        .filter(|(_, c)| *c > 0)
        .map(|(l, c)| (l.clone(), c))
        .collect();
    let total_occurrences = used.iter().map(|(_, c)| c).sum();
    log::debug!("{} lines scanned, {} of {} checks present, {} occurrences", lines.len(), used.len(), catalog.len(), total_occurrences);
    Categorized { used_categories: attribute(lines, &used, tie), total_occurrences }
}
