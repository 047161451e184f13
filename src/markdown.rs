use chrono::NaiveDateTime;

use crate::catalog::display_name;
use crate::categorize::Categorized;
use crate::html::TIMESTAMP_FORMAT;

pub fn render_markdown(rep: &Categorized, title: &str, source: &str, generated_at: &NaiveDateTime) -> String {
    let mut s = String::new();
    s.push_str(&format!("# {}\n\n", title));
    s.push_str(&format!("Generated: {}\n\n", generated_at.format(TIMESTAMP_FORMAT)));
    s.push_str(&format!("Log: {}\n\n", source));

    s.push_str("## Summary\n");
    s.push_str(&format!("- Total Occurrences: {}\n", rep.total_occurrences));
    s.push_str(&format!("- Checks Triggered: {}\n\n", rep.used_categories.len()));

    s.push_str("## Checks\n");
    if rep.used_categories.is_empty() { s.push_str("None\n\n"); } else {
        s.push_str("| Check | Count |\n|---|---:|\n");
        for c in &rep.used_categories { s.push_str(&format!("| `{}` | {} |\n", display_name(&c.label), c.count)); }
        s.push('\n');
    }

    for c in &rep.used_categories {
        s.push_str(&format!("### {} ({})\n\n", display_name(&c.label), c.count));
        // A fence longer than any backtick run in the log keeps the block closed.
        let fence = "`".repeat(longest_backtick_run(&c.attributed_text).max(2) + 1);
        s.push_str(&format!("{}text\n{}{}\n\n", fence, c.attributed_text, fence));
    }
    s
}

fn longest_backtick_run(s: &str) -> usize {
    let mut best = 0;
    let mut cur = 0;
    for ch in s.chars() {
        if ch == '`' { cur += 1; best = best.max(cur); } else { cur = 0; }
    }
    best
}
