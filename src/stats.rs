/// Summary of repeated measurements of one strategy, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, 0 for a single measurement.
    pub std: f64,
    pub median: f64,
    #[serde(rename = "amin")]
    pub min: f64,
    #[serde(rename = "amax")]
    pub max: f64,
}

/// Returns `None` for an empty input.
#[must_use]
pub fn get_statistics(v: &[f64]) -> Option<Statistics> {
    if v.is_empty() {
        return None;
    }
    let mut s = v.to_vec();
    s.sort_by(f64::total_cmp);
    let n = s.len();
    let mean = s.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        (s.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let median = if n % 2 == 0 {
        (s[n / 2 - 1] + s[n / 2]) / 2.0
    } else {
        s[n / 2]
    };
    Some(Statistics {
        count: n,
        mean,
        std,
        median,
        min: s[0],
        max: s[n - 1],
    })
}

/// Ranks `(name, seconds)` pairs, fastest first, each slower one relative
/// to the fastest.
#[must_use]
pub fn get_findings(v: &[(String, f64)]) -> Vec<String> {
    let mut v = v.to_vec();
    v.sort_by(|a, b| a.1.total_cmp(&b.1));
    let Some((name, fastest)) = v.first() else {
        return vec![];
    };
    let mut l = vec![format!("fastest: {name}, {fastest:.2}s")];
    for (name, x) in &v[1..] {
        l.push(format!("{name}: {x:.2}s, {:.2}x slower", x / fastest));
    }
    l
}

/// Prints statistics per strategy, then findings for the prefix capped
/// and whole file strategies separately. A trailing "64" in the name marks
/// a prefix capped strategy.
///
/// # Errors
pub fn write_summary<W>(groups: &[(String, Vec<f64>)], out: &mut W) -> std::io::Result<()>
where
    W: std::io::Write,
{
    let mut prefix = vec![];
    let mut whole = vec![];
    for (name, v) in groups {
        let Some(s) = get_statistics(v) else {
            continue;
        };
        writeln!(
            out,
            "{name:<4} n={} mean {:.6}s std {:.6}s median {:.6}s min {:.6}s max {:.6}s",
            s.count, s.mean, s.std, s.median, s.min, s.max
        )?;
        if name.ends_with("64") {
            prefix.push((name.clone(), s.mean));
        } else {
            whole.push((name.clone(), s.mean));
        }
    }
    for l in [prefix, whole] {
        for s in get_findings(&l) {
            writeln!(out, "{s}")?;
        }
    }
    Ok(())
}
