use chrono::NaiveDateTime;

use crate::catalog::display_name;
use crate::categorize::Categorized;
use crate::highlight;

pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

const BOOTSTRAP_CSS: &str = "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str = "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/js/bootstrap.min.js";
const JQUERY_JS: &str = "https://ajax.googleapis.com/ajax/libs/jquery/3.3.1/jquery.min.js";

const HEADING_STYLE: &str = "margin-top: 0; color: #111; position: absolute; left: 50%; transform: translateX(-50%); margin-bottom: 10px;";

pub fn render_html(rep: &Categorized, lines: &[String], title: &str, generated_at: &NaiveDateTime) -> String {
    let mut s = String::new();
    s.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    s.push_str(&format!("\t<title>{}</title>\n\t<meta charset=\"UTF-8\">\n", html_escape(title)));
    s.push_str("\t<meta name=\"description\" content=\"Documentation tool for visualizing Clazy checks.\">\n");
    s.push_str("\t<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n");
    s.push_str(&format!("\t<link rel=\"stylesheet\" href=\"{}\">\n", BOOTSTRAP_CSS));
    s.push_str(&format!("\t<script src=\"{}\"></script>\n\t<script src=\"{}\"></script>\n", JQUERY_JS, BOOTSTRAP_JS));
    s.push_str(&format!("<style>{}</style>\n</head>\n", STYLE));
    s.push_str("<body style=\"background: rgb(220, 227, 230); width: 100%; height: 100%;\">\n");
    s.push_str("<div id=\"container\" style=\"margin-left: 2%; margin-right: 2%;\">\n");
    s.push_str("\t<div id=\"header\" style=\"height: 55px; display: flex; justify-content: left; position: relative;\">\n");
    s.push_str(&format!(
        "\t\t<h3 style=\"color: #111; font-family: 'Helvetica Neue', sans-serif; font-weight: bold; letter-spacing: 0.5px; line-height: 1;\">{} - {}</h3>\n",
        html_escape(title),
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    s.push_str("\t\t<div class=\"btn-group\" role=\"group\" style=\"position: absolute; right: 0; top: 16px;\">\n");
    s.push_str("\t\t\t<button type=\"button\" class=\"btn btn-warning\" onclick=\"highlightChecks('warning')\" title=\"Toggle warning highlight on the selected check\">Warning</button>\n");
    s.push_str("\t\t\t<button type=\"button\" class=\"btn btn-danger\" onclick=\"highlightChecks('danger')\" title=\"Toggle danger highlight on the selected check\">Danger</button>\n");
    s.push_str("\t\t\t<button type=\"button\" class=\"btn btn-default\" onclick=\"clearChecks()\" title=\"Remove all highlights\">Clear</button>\n");
    s.push_str("\t\t</div>\n\t</div><br>\n");

    s.push_str("\t<ul id=\"list\" class=\"list-group\" style=\"display: block; width: 25%; height: 0; margin-bottom: 0;\">\n");
    s.push_str(&format!(
        "\t\t<a id=\"log\" href=\"#\" class=\"list-group-item list-group-item-success\" style=\"color: black; font-weight: bold; letter-spacing: 0.4px;\" onclick=\"return toggleLog();\">{} Original Log</a>\n",
        rep.total_occurrences
    ));
    for (i, c) in rep.used_categories.iter().enumerate() {
        s.push_str(&format!(
            "\t\t<a id=\"check{}\" href=\"#\" class=\"list-group-item list-group-item-action\" style=\"color: black\" onclick=\"return toggleInfo({});\">{} {}</a>\n",
            i, i, c.count, html_escape(&c.label)
        ));
    }
    s.push_str("\t</ul>\n\n");

    let mut raw = String::new();
    for line in lines { raw.push_str(&escape_log_text(line)); raw.push('\n'); }
    push_panel(&mut s, "showLog", 0, "Original Log", &raw);
    for (i, c) in rep.used_categories.iter().enumerate() {
        push_panel(&mut s, &format!("show{}", i), i + 1, display_name(&c.label), &escape_log_text(&c.attributed_text));
    }
    s.push_str("</div>\n");
    s.push_str(&format!("<script>\n{}</script>\n", render_script(rep.used_categories.len())));
    s.push_str("</body>\n</html>\n");
    s
}

fn push_panel(s: &mut String, id: &str, collapse_idx: usize, heading: &str, escaped_body: &str) {
    s.push_str(&format!("\t<div id=\"{}\" style=\"display: none; width: 75%; float: right;\">\n", id));
    s.push_str("\t\t<div style=\"display: flex; justify-content: left; position: relative;\">\n");
    s.push_str(&format!(
        "\t\t\t<button id=\"collapse-btn{}\" type=\"button\" class=\"btn nohover\" onclick=\"collapseSidebar()\" style=\"outline: none; background-color: lightgray\" title=\"Collapse sidebar\"><span id=\"collapse-img{}\" class=\"glyphicon glyphicon-menu-left\"></span></button>\n",
        collapse_idx, collapse_idx
    ));
    s.push_str(&format!("\t\t\t<h4 style=\"{}\">{}</h4>\n", HEADING_STYLE, html_escape(heading)));
    s.push_str("\t\t</div>\n\t\t<pre>\n");
    s.push_str(escaped_body);
    s.push_str("\t\t</pre>\n\t</div>\n");
}

fn render_script(n: usize) -> String {
    let key = serde_json::Value::String(highlight::STORAGE_KEY.to_string());
    let initial = serde_json::to_string(&highlight::initial_state(n)).unwrap_or_else(|_| "[]".to_string());
    SCRIPT
        .replace("__CHECK_COUNT__", &n.to_string())
        .replace("__STORAGE_KEY__", &key.to_string())
        .replace("__TRANSITIONS__", &highlight::transition_table().to_string())
        .replace("__INITIAL__", &initial)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Log text keeps `&` as written so entities already in the log render once.
fn escape_log_text(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

const STYLE: &str = "\n\tpre {\n\t\twhite-space: pre-wrap;\n\t\tword-break: keep-all;\n\t}\n\t#header {\n\t\tborder-bottom: 2px solid darkgray;\n\t}\n";

const SCRIPT: &str = r#"var selectedIdx = null;
var sidebarVisible = true;
var checkCount = __CHECK_COUNT__;
var storageKey = __STORAGE_KEY__;
var transitions = __TRANSITIONS__;
var checksArr = __INITIAL__;

function setHighlight(idx, state) {
	checksArr[idx] = state;
	var el = document.getElementById("check" + idx);
	if (el === null) { return; }
	el.classList.remove("list-group-item-action", "list-group-item-warning", "list-group-item-danger");
	el.classList.add("list-group-item-" + state);
}

function saveHighlights() {
	try { localStorage.setItem(storageKey, JSON.stringify(checksArr)); } catch (e) {}
}

// Restores highlights saved by a previous visit; missing or short arrays read as unmarked.
function loadHighlights() {
	var stored = [];
	try { stored = JSON.parse(localStorage.getItem(storageKey)) || []; } catch (e) { stored = []; }
	for (var i = 0; i < checkCount; i++) {
		var s = stored[i];
		setHighlight(i, (s === "warning" || s === "danger") ? s : "action");
	}
	saveHighlights();
}

function hideAll() {
	for (var i = 0; i < checkCount; i++) {
		document.getElementById("show" + i).style.display = "none";
	}
	document.getElementById("showLog").style.display = "none";
}

function toggleLog() {
	selectedIdx = null;
	hideAll();
	document.getElementById("showLog").style.display = "block";
	return false;
}

function toggleInfo(idx) {
	selectedIdx = idx;
	hideAll();
	document.getElementById("show" + idx).style.display = "block";
	return false;
}

function highlightChecks(mark) {
	if (selectedIdx === null) { return; }
	var current = checksArr[selectedIdx] || "action";
	setHighlight(selectedIdx, transitions[mark][current]);
	saveHighlights();
}

function clearChecks() {
	for (var i = 0; i < checkCount; i++) { setHighlight(i, "action"); }
	try { localStorage.removeItem(storageKey); } catch (e) {}
}

function collapseSidebar() {
	sidebarVisible = !sidebarVisible;
	document.getElementById("list").style.display = sidebarVisible ? "block" : "none";
	var width = sidebarVisible ? "75%" : "100%";
	for (var i = 0; i <= checkCount; i++) {
		var img = document.getElementById("collapse-img" + i);
		var btn = document.getElementById("collapse-btn" + i);
		if (img !== null) {
			img.classList.remove(sidebarVisible ? "glyphicon-menu-right" : "glyphicon-menu-left");
			img.classList.add(sidebarVisible ? "glyphicon-menu-left" : "glyphicon-menu-right");
			btn.title = sidebarVisible ? "Collapse sidebar" : "Expand sidebar";
		}
		if (i < checkCount) { document.getElementById("show" + i).style.width = width; }
	}
	document.getElementById("showLog").style.width = width;
}

loadHighlights();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::CategoryRecord;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime { NaiveDate::from_ymd_opt(2026, 3, 4).unwrap().and_hms_opt(5, 6, 7).unwrap() }

    fn sample() -> Categorized {
        Categorized {
            used_categories: vec![
                CategoryRecord { label: "[-Wclazy-foreach]".to_string(), count: 2, attributed_text: "a.cpp: QList<int> x [-Wclazy-foreach]\n".to_string() },
                CategoryRecord { label: "[-Wclazy-qgetenv]".to_string(), count: 1, attributed_text: "b.cpp [-Wclazy-qgetenv]\n".to_string() },
            ],
            total_occurrences: 3,
        }
    }

    #[test]
    fn header_has_title_and_timestamp() {
        let html = render_html(&Categorized::default(), &[], "Clazy Checks", &at());
        assert!(html.contains("Clazy Checks - 03/04/2026 05:06:07"));
    }

    #[test]
    fn empty_report_still_has_original_log() {
        let html = render_html(&Categorized::default(), &[], "T", &at());
        assert!(html.contains(">0 Original Log</a>"));
        assert!(html.contains("id=\"showLog\""));
        assert!(!html.contains("id=\"check0\""));
        assert!(html.contains("var checkCount = 0;"));
    }

    #[test]
    fn sidebar_lists_categories_in_order() {
        let html = render_html(&sample(), &[], "T", &at());
        assert!(html.contains(">3 Original Log</a>"));
        let a = html.find(">2 [-Wclazy-foreach]</a>").unwrap();
        let b = html.find(">1 [-Wclazy-qgetenv]</a>").unwrap();
        assert!(a < b);
        assert!(html.contains("onclick=\"return toggleInfo(1);\""));
    }

    #[test]
    fn panel_heading_strips_brackets() {
        let html = render_html(&sample(), &[], "T", &at());
        assert!(html.contains(">-Wclazy-foreach</h4>"));
        assert!(html.contains("id=\"show1\""));
        assert!(html.contains("id=\"collapse-btn2\""));
    }

    #[test]
    fn escapes_exactly_once() {
        let lines = vec!["a.cpp: QList<int> x [-Wclazy-foreach]".to_string()];
        let html = render_html(&sample(), &lines, "T", &at());
        assert_eq!(html.matches("QList&lt;int&gt; x").count(), 2);
        assert!(!html.contains("QList<int>"));
        assert!(!html.contains("&amp;lt;"));
    }

    #[test]
    fn script_embeds_state_and_transitions() {
        let html = render_html(&sample(), &[], "T", &at());
        assert!(html.contains("var checksArr = [\"action\",\"action\"];"));
        assert!(html.contains(&format!("var storageKey = \"{}\";", highlight::STORAGE_KEY)));
        assert!(html.contains("\"danger\":{"));
        assert!(!html.contains("__"));
    }

    #[test]
    fn log_entities_are_not_escaped_again() {
        let lines = vec![
            "x.cpp: a &lt; b [-Wclazy-foreach]".to_string(),
            "  QMap<K, V> m;".to_string(),
        ];
        let rep = crate::categorize::categorize(&lines, &crate::catalog::Catalog::builtin(), Default::default());
        let html = render_html(&rep, &lines, "T", &at());
        assert_eq!(html.matches("x.cpp: a &lt; b [-Wclazy-foreach]").count(), 2);
        assert_eq!(html.matches("QMap&lt;K, V&gt; m;").count(), 2);
        assert!(!html.contains("&amp;lt;"));
    }

    #[test]
    fn log_text_escaper_leaves_ampersand() {
        assert_eq!(escape_log_text("a && b <c>"), "a && b &lt;c&gt;");
    }

    #[test]
    fn html_escape_handles_entities() {
        assert_eq!(html_escape("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
