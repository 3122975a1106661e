use crate::stats;

use std::io::Write;

/// corpus -> strategy -> run -> seconds
pub type ResultMap = std::collections::BTreeMap<
    String,
    std::collections::BTreeMap<String, std::collections::BTreeMap<u64, f64>>,
>;

/// corpus -> strategy -> statistics
pub type StatisticsMap =
    std::collections::BTreeMap<String, std::collections::BTreeMap<String, stats::Statistics>>;

const UNSAFE_CHARS: &str = " \\/:*?\"<>|";

/// Replaces characters that can't appear in a file name on common
/// filesystems with '_'.
#[must_use]
pub fn get_safe_name(s: &str) -> String {
    s.chars()
        .map(|c| if UNSAFE_CHARS.contains(c) { '_' } else { c })
        .collect()
}

/// Returns "<corpus>_<strategy>_<run>", `corpus` made filename safe.
#[must_use]
pub fn get_result_name(corpus: &str, strategy: &str, run: u64) -> String {
    format!("{}_{strategy}_{run}", get_safe_name(corpus))
}

/// Splits "<corpus>_<strategy>_<run>".
#[must_use]
pub fn parse_result_name(s: &str) -> Option<(&str, &str, u64)> {
    let mut it = s.rsplitn(3, '_');
    let run = it.next()?;
    let strategy = it.next()?;
    let corpus = it.next()?;
    if corpus.is_empty() || strategy.is_empty() || !run.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((corpus, strategy, run.parse().ok()?))
}

/// Returns the seconds of the first "hashing ... took <seconds>s" line.
#[must_use]
pub fn parse_result(s: &str) -> Option<f64> {
    for l in s.lines() {
        if !l.starts_with("hashing ") {
            continue;
        }
        let Some(i) = l.find(" took ") else {
            continue;
        };
        let t = &l[i + " took ".len()..];
        let n = t
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(t.len());
        if !t[n..].starts_with('s') {
            continue;
        }
        if let Ok(v) = t[..n].parse() {
            return Some(v);
        }
    }
    None
}

/// Collects the results saved in `dir`. Other files are ignored.
///
/// # Errors
pub fn get_results(dir: &std::path::Path) -> std::io::Result<ResultMap> {
    let mut m = ResultMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some((corpus, strategy, run)) = name.to_str().and_then(parse_result_name) else {
            log::debug!("{name:?}: ignored");
            continue;
        };
        let s = match std::fs::read_to_string(entry.path()) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("{}: {e}", entry.path().display());
                continue;
            }
        };
        if let Some(v) = parse_result(&s) {
            m.entry(corpus.to_string())
                .or_default()
                .entry(strategy.to_string())
                .or_default()
                .insert(run, v);
        }
    }
    Ok(m)
}

fn get_groups(
    strategies: &std::collections::BTreeMap<String, std::collections::BTreeMap<u64, f64>>,
) -> Vec<(String, Vec<f64>)> {
    strategies
        .iter()
        .map(|(k, v)| (k.clone(), v.values().copied().collect()))
        .collect()
}

#[must_use]
pub fn get_statistics_map(m: &ResultMap) -> StatisticsMap {
    let mut sm = StatisticsMap::new();
    for (corpus, strategies) in m {
        for (strategy, v) in get_groups(strategies) {
            if let Some(s) = stats::get_statistics(&v) {
                sm.entry(corpus.clone()).or_default().insert(strategy, s);
            }
        }
    }
    sm
}

/// Writes `m` as pretty printed JSON.
///
/// # Errors
pub fn write_statistics(path: &std::path::Path, m: &StatisticsMap) -> crate::Result<()> {
    let mut w = std::io::BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut w, m)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

/// Prints statistics and findings per corpus.
///
/// # Errors
pub fn print_results<W>(m: &ResultMap, out: &mut W) -> std::io::Result<()>
where
    W: std::io::Write,
{
    for (corpus, strategies) in m {
        writeln!(out, "{corpus}:")?;
        stats::write_summary(&get_groups(strategies), out)?;
        writeln!(out)?;
    }
    Ok(())
}
