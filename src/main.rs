use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use clap::{ArgAction, ColorChoice, CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};

mod catalog;
mod categorize;
mod highlight;
mod html;
mod log_input;
mod markdown;

use crate::catalog::{Catalog, display_name};
use crate::categorize::{Categorized, CategoryRecord, TieBreak};

const DEFAULT_HTML: &str = "clazy.html";
const DEFAULT_TITLE: &str = "Clazy Checks";
const DEFAULT_CONFIG: &str = "clazy-visualizer.toml";
const CONFIG_ENV: &str = "CLAZY_VISUALIZER_CONFIG";

static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TextFormat { Lines, Table }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogFormat { Text, Json }

#[derive(Parser, Debug, Default)]
#[command(
    name = "clazy-visualizer",
    version,
    about = "Export clazy static analyzer output to an HTML report",
    long_about = "Groups the warnings of a clazy build log by check, counts them, and writes a single HTML page with one panel per check next to the original log.",
    after_long_help = "Examples:\n  clazy-visualizer build.log\n  make 2>&1 | clazy-visualizer - --output report.html\n  clazy-visualizer build.log --summary-only --text-format table\n  clazy-visualizer build.log --json-path checks.json --csv-path checks.csv",
    color = ColorChoice::Auto
)]
struct Args {
    /// Clazy log file to read (`-` for stdin)
    log: Option<PathBuf>,
    /// HTML report path [default: clazy.html]
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Report heading [default: Clazy Checks]
    #[arg(long)]
    title: Option<String>,
    /// Attribution of a line that carries several checks [default: first]
    #[arg(long, value_enum)]
    tie_break: Option<TieBreak>,
    /// Open the report with the system viewer once written
    #[arg(long, default_value_t = false)]
    open: bool,
    /// Only print the summary, do not write the HTML report
    #[arg(long, default_value_t = false)]
    summary_only: bool,
    #[arg(long, value_enum)]
    format: Option<OutputFmt>,
    #[arg(long, value_enum)]
    text_format: Option<TextFormat>,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long)]
    md_path: Option<String>,
    /// Print the known checks and exit
    #[arg(long, default_value_t = false)]
    list_checks: bool,
    /// Exit with status 1 when any check fired
    #[arg(long, default_value_t = false)]
    warnings_as_errors: bool,
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long)]
    log_path: Option<String>,
    #[arg(long, short = 'C', default_value_t = false)]
    no_color: bool,
    #[arg(long, default_value_t = false)]
    force_color: bool,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
    #[arg(long)]
    completions_out: Option<String>,
    #[arg(long)]
    config: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
struct AppConfig {
    output: Option<PathBuf>,
    title: Option<String>,
    tie_break: Option<TieBreak>,
    open: Option<bool>,
    summary_only: Option<bool>,
    format: Option<OutputFmt>,
    text_format: Option<TextFormat>,
    json_path: Option<String>,
    csv_path: Option<String>,
    md_path: Option<String>,
    warnings_as_errors: Option<bool>,
    log_level: Option<LogLevel>,
    log_format: Option<LogFormat>,
    log_path: Option<String>,
    no_color: Option<bool>,
    force_color: Option<bool>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    generated_at: String,
    total_occurrences: usize,
    categories: &'a [CategoryRecord],
}

fn main() {
    let mut args = Args::parse();
    if let Some(sh) = args.completions {
        let mut cmd = Args::command();
        if let Some(path) = args.completions_out.as_ref() {
            if let Ok(mut f) = std::fs::File::create(path) { clap_complete::generate(sh, &mut cmd, "clazy-visualizer", &mut f); } else { clap_complete::generate(sh, &mut cmd, "clazy-visualizer", &mut std::io::stdout()); }
        } else {
            clap_complete::generate(sh, &mut cmd, "clazy-visualizer", &mut std::io::stdout());
        }
        return;
    }
    let mut config_path = None;
    let mut config_err = None;
    match load_config(args.config.as_deref()) {
        Ok(Some((path, cfg))) => { apply_config(&mut args, cfg); config_path = Some(path); }
        Ok(None) => {}
        Err(e) => config_err = Some(e),
    }
    init_logging(&args);
    if let Some(p) = config_path { log::info!("Loaded config {}", p.display()); }
    if let Some(e) = config_err { log::warn!("Ignoring config: {:#}", e); }
    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if args.force_color { true } else { color_default && !args.no_color };
    let _ = ENABLE_COLOR.set(enable_color);

    if args.list_checks {
        for label in Catalog::builtin().labels() { println!("{}", label); }
        return;
    }
    match run(&args) {
        Ok(rep) => {
            if args.warnings_as_errors && rep.total_occurrences > 0 { std::process::exit(1); }
        }
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Categorized> {
    let log_path = args.log.as_deref().context("no log file given (pass a path or `-`, see --help)")?;
    let lines = log_input::read_log(log_path)?;
    let catalog = Catalog::builtin();
    let rep = categorize::categorize(&lines, &catalog, args.tie_break.unwrap_or_default());
    log::info!("{} occurrences across {} checks in {} lines", rep.total_occurrences, rep.used_categories.len(), lines.len());
    let now = Local::now().naive_local();
    let title = args.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let source = if log_path == Path::new("-") { "<stdin>".to_string() } else { log_path.to_string_lossy().into_owned() };
    let fmt = args.format.unwrap_or(OutputFmt::Text);
    // Status lines would corrupt JSON on stdout.
    let chatty = !args.quiet && matches!(fmt, OutputFmt::Text);

    if !args.summary_only {
        let out = output_path(args);
        let html = html::render_html(&rep, &lines, title, &now);
        std::fs::write(&out, html).with_context(|| format!("HTML write failed for {}", out.display()))?;
        if chatty { println!("{}", paint(&format!("HTML generated: {}", out.display()), "1;36")); }
        if args.open { open_file_default(out); }
    }

    match fmt {
        OutputFmt::Text => if chatty {
            match args.text_format.unwrap_or(TextFormat::Lines) {
                TextFormat::Lines => print_text(&rep, &source),
                TextFormat::Table => print_text_table(&rep, &source),
            }
        },
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(&json_report(&rep, &source, &now))?),
    }

    let mut failures = 0usize;
    if let Some(p) = args.json_path.as_ref() {
        match write_json(p, &rep, &source, &now) {
            Ok(_) => { if chatty { println!("{}", paint(&format!("JSON written: {}", p), "1;36")); } }
            Err(e) => { log::error!("JSON write failed for {}: {:#}", p, e); failures += 1; }
        }
    }
    if let Some(p) = args.csv_path.as_ref() {
        match write_csv(p, &rep) {
            Ok(_) => { if chatty { println!("{}", paint(&format!("CSV written: {}", p), "1;36")); } }
            Err(e) => { log::error!("CSV write failed for {}: {:#}", p, e); failures += 1; }
        }
    }
    if let Some(p) = args.md_path.as_ref() {
        let md = markdown::render_markdown(&rep, title, &source, &now);
        match std::fs::write(p, md) {
            Ok(_) => { if chatty { println!("{}", paint(&format!("Markdown written: {}", p), "1;36")); } }
            Err(e) => { log::error!("Markdown write failed for {}: {}", p, e); failures += 1; }
        }
    }
    if failures > 0 { bail!("{} export(s) failed", failures); }
    Ok(rep)
}

fn output_path(args: &Args) -> PathBuf {
    args.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_HTML))
}

/// Explicit `--config` wins, then the env var, then `clazy-visualizer.toml` if present.
fn load_config(explicit: Option<&str>) -> Result<Option<(PathBuf, AppConfig)>> {
    let path = match explicit.map(PathBuf::from).or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from)) {
        Some(p) => p,
        None => {
            let def = PathBuf::from(DEFAULT_CONFIG);
            if !def.exists() { return Ok(None); }
            def
        }
    };
    let s = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some((path, cfg)))
}

/// Config values only fill in what the command line left unset.
fn apply_config(args: &mut Args, cfg: AppConfig) {
    if args.output.is_none() && let Some(v) = cfg.output { args.output = Some(v); }
    if args.title.is_none() && let Some(v) = cfg.title { args.title = Some(v); }
    if args.tie_break.is_none() && let Some(v) = cfg.tie_break { args.tie_break = Some(v); }
    if args.format.is_none() && let Some(v) = cfg.format { args.format = Some(v); }
    if args.text_format.is_none() && let Some(v) = cfg.text_format { args.text_format = Some(v); }
    if args.json_path.is_none() && let Some(v) = cfg.json_path { args.json_path = Some(v); }
    if args.csv_path.is_none() && let Some(v) = cfg.csv_path { args.csv_path = Some(v); }
    if args.md_path.is_none() && let Some(v) = cfg.md_path { args.md_path = Some(v); }
    if args.log_level.is_none() && let Some(v) = cfg.log_level { args.log_level = Some(v); }
    if args.log_format.is_none() && let Some(v) = cfg.log_format { args.log_format = Some(v); }
    if args.log_path.is_none() && let Some(v) = cfg.log_path { args.log_path = Some(v); }
    if let Some(v) = cfg.open { args.open |= v; }
    if let Some(v) = cfg.summary_only { args.summary_only |= v; }
    if let Some(v) = cfg.warnings_as_errors { args.warnings_as_errors |= v; }
    if let Some(v) = cfg.no_color { args.no_color |= v; }
    if let Some(v) = cfg.force_color { args.force_color |= v; }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if let Some(lvl) = args.log_level {
        let f = match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace };
        builder.filter_level(f);
    } else if args.verbose > 0 {
        let f = if args.verbose >= 3 { log::LevelFilter::Trace } else if args.verbose == 2 { log::LevelFilter::Debug } else { log::LevelFilter::Info };
        builder.filter_level(f);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Warn);
    }
    if let Some(fmt) = args.log_format {
        match fmt {
            LogFormat::Json => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let obj = serde_json::json!({
                        "ts": Local::now().to_rfc3339(),
                        "level": record.level().to_string(),
                        "target": record.target(),
                        "msg": record.args().to_string(),
                    });
                    writeln!(buf, "{}", obj)
                });
            }
            LogFormat::Text => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    writeln!(buf, "[{:<5} {}] {}", record.level(), Local::now().format("%H:%M:%S"), record.args())
                });
            }
        }
    }
    if let Some(path) = args.log_path.as_ref() {
        match std::fs::File::create(path) {
            Ok(f) => { builder.target(env_logger::Target::Pipe(Box::new(f))); }
            Err(e) => { eprintln!("Failed to open log file {}: {}", path, e); }
        }
    }
    builder.init();
}

fn print_text(rep: &Categorized, source: &str) {
    println!("{}", paint(&format!("Clazy checks in {}", source), "1;36"));
    if rep.used_categories.is_empty() { println!("No clazy warnings found."); return; }
    let max = rep.used_categories.iter().map(|c| c.count).max().unwrap_or(0);
    let width = rep.used_categories.iter().map(|c| c.label.len()).max().unwrap_or(0);
    for c in &rep.used_categories {
        println!("{:>6}  {:<w$}  {}", c.count, c.label, paint(&bar(c.count, max, 30), "33"), w = width);
    }
    println!("{} {} occurrences across {} checks", paint("Total:", "1"), rep.total_occurrences, rep.used_categories.len());
}

fn print_text_table(rep: &Categorized, source: &str) {
    println!("{}", paint(&format!("Clazy checks in {}", source), "1;36"));
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![paint("Check", "1"), paint("Count", "1"), paint("Lines", "1")]);
    for c in &rep.used_categories {
        table.add_row(vec![
            Cell::new(display_name(&c.label)),
            Cell::new(c.count).set_alignment(CellAlignment::Right),
            Cell::new(c.attributed_text.lines().count()).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![Cell::new(paint("Total", "1")), Cell::new(rep.total_occurrences).set_alignment(CellAlignment::Right), Cell::new("")]);
    println!("{}", table);
}

fn bar(v: usize, max: usize, width: usize) -> String {
    if max == 0 { return String::new(); }
    let filled = ((v as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled)
}

fn json_report<'a>(rep: &'a Categorized, source: &'a str, now: &NaiveDateTime) -> JsonReport<'a> {
    JsonReport {
        source,
        generated_at: now.format(html::TIMESTAMP_FORMAT).to_string(),
        total_occurrences: rep.total_occurrences,
        categories: &rep.used_categories,
    }
}

fn write_json(path: &str, rep: &Categorized, source: &str, now: &NaiveDateTime) -> Result<()> {
    let data = serde_json::to_vec_pretty(&json_report(rep, source, now))?;
    std::fs::write(path, data)?;
    Ok(())
}

fn write_csv(path: &str, rep: &Categorized) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["check", "count", "attributed_lines"])?;
    for c in &rep.used_categories {
        wtr.write_record([c.label.clone(), c.count.to_string(), c.attributed_text.lines().count().to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&false) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}

#[cfg(target_os = "windows")]
fn open_file_default(p: PathBuf) {
    let s = p.to_string_lossy().into_owned();
    let _ = std::process::Command::new("cmd").args(["/C", "start", "", &s]).spawn()
        .map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}

#[cfg(target_os = "macos")]
fn open_file_default(p: PathBuf) {
    let s = p.to_string_lossy().into_owned();
    let _ = std::process::Command::new("open").arg(&s).spawn().map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_file_default(p: PathBuf) {
    let s = p.to_string_lossy().into_owned();
    let _ = std::process::Command::new("xdg-open").arg(&s).spawn().map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(name: &str) -> PathBuf { std::env::temp_dir().join(format!("clazy_visualizer_{}_{}", std::process::id(), name)) }

    fn base_args() -> Args { Args { quiet: true, ..Default::default() } }

    const LOG: &str = "Scanning dependencies\n\
a.cpp:10:5: warning: Q_FOREACH is deprecated [-Wclazy-foreach]\n\
    Q_FOREACH (QString s, list<int>) {\n\
b.cpp:3:1: warning: qgetenv allocates [-Wclazy-qgetenv]\n";

    #[test]
    fn run_writes_report() {
        let log = tmp("run.log");
        let out = tmp("run.html");
        std::fs::write(&log, LOG).unwrap();
        let args = Args { log: Some(log.clone()), output: Some(out.clone()), ..base_args() };
        let rep = run(&args).unwrap();
        assert_eq!(rep.total_occurrences, 2);
        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains(">2 Original Log</a>"));
        assert!(html.contains(">1 [-Wclazy-foreach]</a>"));
        assert!(html.contains("list&lt;int&gt;"));
        let _ = std::fs::remove_file(&log);
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn run_overwrites_existing_report() {
        let log = tmp("overwrite.log");
        let out = tmp("overwrite.html");
        std::fs::write(&log, LOG).unwrap();
        std::fs::write(&out, "stale junk from an earlier run").unwrap();
        let args = Args { log: Some(log.clone()), output: Some(out.clone()), ..base_args() };
        run(&args).unwrap();
        let html = std::fs::read_to_string(&out).unwrap();
        assert!(!html.contains("stale junk"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(">2 Original Log</a>"));
        let _ = std::fs::remove_file(&log);
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn output_defaults_to_clazy_html() {
        assert_eq!(output_path(&base_args()), PathBuf::from("clazy.html"));
        assert_eq!(output_path(&base_args()), PathBuf::from(DEFAULT_HTML));
        let args = Args { output: Some(PathBuf::from("r.html")), ..base_args() };
        assert_eq!(output_path(&args), PathBuf::from("r.html"));
    }

    #[test]
    fn run_summary_only_skips_html() {
        let log = tmp("summary.log");
        let out = tmp("summary.html");
        let _ = std::fs::remove_file(&out);
        std::fs::write(&log, LOG).unwrap();
        let args = Args { log: Some(log.clone()), output: Some(out.clone()), summary_only: true, ..base_args() };
        run(&args).unwrap();
        assert!(!out.exists());
        let _ = std::fs::remove_file(&log);
    }

    #[test]
    fn run_empty_log_still_reports() {
        let log = tmp("empty.log");
        let out = tmp("empty.html");
        std::fs::write(&log, "").unwrap();
        let args = Args { log: Some(log.clone()), output: Some(out.clone()), ..base_args() };
        let rep = run(&args).unwrap();
        assert!(rep.used_categories.is_empty());
        assert!(std::fs::read_to_string(&out).unwrap().contains(">0 Original Log</a>"));
        let _ = std::fs::remove_file(&log);
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn run_without_log_fails() {
        assert!(run(&base_args()).is_err());
    }

    #[test]
    fn run_reports_failed_exports() {
        let log = tmp("exports.log");
        std::fs::write(&log, LOG).unwrap();
        let bad = tmp("no_such_dir").join("x.json");
        let args = Args { log: Some(log.clone()), summary_only: true, json_path: Some(bad.to_string_lossy().into_owned()), ..base_args() };
        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("1 export(s) failed"));
        let _ = std::fs::remove_file(&log);
    }

    #[test]
    fn csv_and_json_exports() {
        let rep = Categorized {
            used_categories: vec![CategoryRecord { label: "[-Wclazy-foreach]".to_string(), count: 2, attributed_text: "a\nb\nc\n".to_string() }],
            total_occurrences: 2,
        };
        let csv_p = tmp("out.csv");
        write_csv(&csv_p.to_string_lossy(), &rep).unwrap();
        let data = std::fs::read_to_string(&csv_p).unwrap();
        let rows: Vec<&str> = data.lines().collect();
        assert_eq!(rows, vec!["check,count,attributed_lines", "[-Wclazy-foreach],2,3"]);
        let json_p = tmp("out.json");
        let now = Local::now().naive_local();
        write_json(&json_p.to_string_lossy(), &rep, "build.log", &now).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_p).unwrap()).unwrap();
        assert_eq!(v["total_occurrences"], 2);
        assert_eq!(v["source"], "build.log");
        assert_eq!(v["categories"][0]["label"], "[-Wclazy-foreach]");
        let _ = std::fs::remove_file(&csv_p);
        let _ = std::fs::remove_file(&json_p);
    }

    #[test]
    fn config_fills_only_unset_values() {
        let mut a = Args { title: Some("From CLI".to_string()), ..base_args() };
        let cfg: AppConfig = toml::from_str("title = \"From config\"\ntie_break = \"all\"\noutput = \"r.html\"\ntext_format = \"table\"\n").unwrap();
        apply_config(&mut a, cfg);
        assert_eq!(a.title.as_deref(), Some("From CLI"));
        assert_eq!(a.tie_break, Some(TieBreak::All));
        assert_eq!(a.output, Some(PathBuf::from("r.html")));
        assert!(matches!(a.text_format, Some(TextFormat::Table)));
    }

    #[test]
    fn load_config_reads_explicit_file() {
        let p = tmp("cfg.toml");
        std::fs::write(&p, "summary_only = true\n").unwrap();
        let ps = p.to_string_lossy().into_owned();
        let (path, cfg) = load_config(Some(ps.as_str())).unwrap().unwrap();
        assert_eq!(path, p);
        assert_eq!(cfg.summary_only, Some(true));
        let _ = std::fs::remove_file(&p);
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let p = tmp("bad.toml");
        std::fs::write(&p, "title = [").unwrap();
        let ps = p.to_string_lossy().into_owned();
        assert!(load_config(Some(ps.as_str())).is_err());
        let _ = std::fs::remove_file(&p);
    }

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(5, 10, 10).chars().count(), 5);
        assert_eq!(bar(10, 10, 4), "████");
        assert_eq!(bar(1, 0, 10), "");
    }

    #[test]
    fn args_parse_positional_and_flags() {
        let a = Args::try_parse_from(["clazy-visualizer", "build.log", "--tie-break", "all", "-o", "r.html"]).unwrap();
        assert_eq!(a.log, Some(PathBuf::from("build.log")));
        assert_eq!(a.tie_break, Some(TieBreak::All));
        assert_eq!(a.output, Some(PathBuf::from("r.html")));
    }
}
