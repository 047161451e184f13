use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Reads the whole log into lines. `-` reads standard input.
pub fn read_log(path: &Path) -> Result<Vec<String>> {
    if path == Path::new("-") {
        return read_lines(std::io::stdin().lock(), "<stdin>");
    }
    let f = std::fs::File::open(path).with_context(|| format!("failed to open log {}", path.display()))?;
    read_lines(BufReader::new(f), &path.to_string_lossy())
}

/// Splits on `\n` and `\r\n`. Invalid UTF-8 is replaced rather than rejected.
pub fn read_lines<R: BufRead>(mut br: R, source: &str) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut buf: Vec<u8> = Vec::new();
    let mut lossy_lines: usize = 0;
    loop {
        buf.clear();
        let read = br.read_until(b'\n', &mut buf).with_context(|| format!("failed to read {}", source))?;
        if read == 0 { break; }
        if buf.last() == Some(&b'\n') { buf.pop(); }
        if buf.last() == Some(&b'\r') { buf.pop(); }
        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) { lossy_lines += 1; }
        out.push(line.into_owned());
    }
    if lossy_lines > 0 { log::warn!("{}: {} line(s) contained invalid UTF-8 and were decoded lossily", source, lossy_lines); }
    log::debug!("read {} lines from {}", out.len(), source);
    Ok(out)
}
