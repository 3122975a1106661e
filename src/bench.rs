use crate::cache;
use crate::extent;
use crate::hash;
use crate::order;
use crate::results;
use crate::subs;
use crate::util;

use std::io::Write;

/// Content checksum used by a pass.
pub trait Checksummer {
    fn checksum(&self, path: &std::path::Path, cap: Option<u64>) -> u64;
}

/// Reads and checksums the actual file contents.
#[derive(Debug, Default)]
pub struct FileChecksummer {}

impl Checksummer for FileChecksummer {
    fn checksum(&self, path: &std::path::Path, cap: Option<u64>) -> u64 {
        hash::checksum(path, cap)
    }
}

#[derive(Clone, Debug)]
pub struct BenchOptions {
    pub strategies: Vec<order::Strategy>,
    /// Byte cap of the prefix strategies.
    pub prefix: u64,
    /// Number of times each strategy is measured.
    pub count: usize,
    pub warm_up: bool,
    pub drop_cache: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            strategies: order::Strategy::get_all(),
            prefix: subs::DEFAULT_PREFIX,
            count: 1,
            warm_up: true,
            drop_cache: false,
        }
    }
}

impl BenchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }
}

/// One timed pass over all files.
#[derive(Clone, Debug, PartialEq)]
pub struct PassReport {
    pub label: String,
    pub ordering: order::Ordering,
    pub cap: Option<u64>,
    pub files: usize,
    /// XOR of every file checksum of the pass.
    pub checksum: u64,
    pub seconds: f64,
}

impl PassReport {
    #[must_use]
    pub fn get_scope_string(&self) -> String {
        match self.cap {
            None => "whole file".to_string(),
            Some(0) => "metadata only".to_string(),
            Some(v) => format!("first {}", subs::get_size_string(v).trim_start()),
        }
    }
}

impl std::fmt::Display for PassReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hashing {} ({} order, {}) {} files took {:.6}s, checksum {:016x}",
            self.label,
            self.ordering,
            self.get_scope_string(),
            self.files,
            self.seconds,
            self.checksum
        )
    }
}

/// Enumerates `roots` and looks up the allocation unit of every file.
#[must_use]
pub fn prepare<P, Q>(roots: &[P], provider: &Q) -> Vec<order::FileRecord>
where
    P: AsRef<std::path::Path>,
    Q: extent::AllocationUnitProvider + ?Sized,
{
    order::locate(crate::walk::collect_roots(roots), provider)
}

#[derive(Debug)]
pub struct Harness<C: Checksummer> {
    opt: BenchOptions,
    seed: u64,
    rng: fastrand::Rng,
    checksummer: C,
}

impl Harness<FileChecksummer> {
    #[must_use]
    pub fn new(opt: BenchOptions, seed: u64) -> Self {
        Self::with_checksummer(opt, seed, FileChecksummer::default())
    }
}

impl<C: Checksummer> Harness<C> {
    #[must_use]
    pub fn with_checksummer(opt: BenchOptions, seed: u64, checksummer: C) -> Self {
        Self {
            opt,
            seed,
            rng: fastrand::Rng::with_seed(seed),
            checksummer,
        }
    }

    #[must_use]
    pub fn get_options(&self) -> &BenchOptions {
        &self.opt
    }

    #[must_use]
    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    fn time_pass(
        &mut self,
        records: &[order::FileRecord],
        label: String,
        ordering: order::Ordering,
        cap: Option<u64>,
    ) -> PassReport {
        let paths = order::arrange(records, ordering, &mut self.rng);
        if self.opt.drop_cache {
            let n = cache::drop_all(paths.iter().copied());
            log::debug!("dropped cached pages of {n}/{} files", paths.len());
        }
        let checksummer = &self.checksummer;
        let (checksum, d) = util::time(|| {
            let mut h = 0;
            for p in &paths {
                h ^= checksummer.checksum(p, cap);
            }
            h
        });
        PassReport {
            label,
            ordering,
            cap,
            files: paths.len(),
            checksum,
            seconds: d.as_secs_f64(),
        }
    }

    /// Opens every file in enumeration order without reading any data, so
    /// that metadata lookups don't weigh on whichever pass comes first.
    pub fn warm_up(&mut self, records: &[order::FileRecord]) -> PassReport {
        self.time_pass(
            records,
            "warm-up".to_string(),
            order::Ordering::Original,
            Some(0),
        )
    }

    /// Runs one timed pass of `strategy`.
    pub fn run_pass(
        &mut self,
        records: &[order::FileRecord],
        strategy: order::Strategy,
    ) -> PassReport {
        let cap = if strategy.prefix {
            Some(self.opt.prefix)
        } else {
            None
        };
        self.time_pass(records, strategy.get_tag(), strategy.ordering, cap)
    }

    /// Runs the warm-up (if enabled) and every selected strategy `count`
    /// times, writing one line per pass to `out`. Returns the measured
    /// passes, warm-up excluded.
    ///
    /// # Errors
    pub fn run<W>(
        &mut self,
        records: &[order::FileRecord],
        out: &mut W,
    ) -> std::io::Result<Vec<PassReport>>
    where
        W: std::io::Write,
    {
        if records.is_empty() {
            writeln!(out, "no files found")?;
            return Ok(vec![]);
        }
        if self.opt.warm_up {
            let r = self.warm_up(records);
            writeln!(out, "warm-up: {r}")?;
        }
        let strategies = self.opt.strategies.clone();
        let mut v = vec![];
        for i in 0..self.opt.count {
            log::debug!("round {}/{}", i + 1, self.opt.count);
            for s in &strategies {
                let r = self.run_pass(records, *s);
                writeln!(out, "{r}")?;
                out.flush()?;
                v.push(r);
            }
        }
        Ok(v)
    }

    /// Runs the warm-up (if enabled), then every selected strategy `count`
    /// times in a row, saving each pass to its own file
    /// `<dir>/<corpus>_<tag>_<run>` with runs numbered from 1. `dir` is
    /// created if missing. Returns the measured passes.
    ///
    /// # Errors
    pub fn run_to_dir(
        &mut self,
        records: &[order::FileRecord],
        corpus: &str,
        dir: &std::path::Path,
    ) -> std::io::Result<Vec<PassReport>> {
        std::fs::create_dir_all(dir)?;
        if self.opt.warm_up && !records.is_empty() {
            let r = self.warm_up(records);
            log::debug!("{corpus}: warm-up: {r}");
        }
        let strategies = self.opt.strategies.clone();
        let mut v = vec![];
        for s in &strategies {
            let tag = s.get_tag();
            for i in 1..=self.opt.count {
                let f = dir.join(results::get_result_name(corpus, &tag, i as u64));
                let mut fp = std::fs::File::create(&f)?;
                if records.is_empty() {
                    writeln!(fp, "no files found")?;
                    continue;
                }
                let r = self.run_pass(records, *s);
                writeln!(fp, "{r}")?;
                log::debug!("{}: {}s", f.display(), r.seconds);
                v.push(r);
            }
        }
        Ok(v)
    }
}

/// Groups pass durations by label, keeping first-seen order.
#[must_use]
pub fn group_reports(reports: &[PassReport]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = vec![];
    for r in reports {
        match groups.iter().position(|(k, _)| *k == r.label) {
            Some(i) => groups[i].1.push(r.seconds),
            None => groups.push((r.label.clone(), vec![r.seconds])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::{BenchOptions, Checksummer, Harness};
    use crate::order::{FileRecord, Ordering, Strategy};

    // Fake storage that takes time proportional to the bytes read.
    struct SlowStorage {
        sizes: std::collections::HashMap<std::path::PathBuf, u64>,
        micros_per_10_bytes: u64,
    }

    impl Checksummer for SlowStorage {
        fn checksum(&self, path: &std::path::Path, cap: Option<u64>) -> u64 {
            let size = self.sizes.get(path).copied().unwrap_or(0);
            let n = cap.map_or(size, |c| c.min(size));
            std::thread::sleep(std::time::Duration::from_micros(
                n / 10 * self.micros_per_10_bytes,
            ));
            n
        }
    }

    // Records the visiting order.
    #[derive(Default)]
    struct Recorder {
        visited: std::cell::RefCell<Vec<std::path::PathBuf>>,
    }

    impl Checksummer for Recorder {
        fn checksum(&self, path: &std::path::Path, _cap: Option<u64>) -> u64 {
            self.visited.borrow_mut().push(path.to_path_buf());
            0
        }
    }

    fn records(l: &[(&str, u64)]) -> Vec<FileRecord> {
        l.iter()
            .map(|t| FileRecord::new(std::path::PathBuf::from(t.0), t.1))
            .collect()
    }

    #[test]
    fn test_run_empty() {
        let mut h = Harness::new(BenchOptions::new(), 0);
        let mut out = vec![];
        let v = h.run(&[], &mut out).unwrap();
        assert!(v.is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "no files found\n");
    }

    #[test]
    fn test_run_all_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let l: [(&str, &[u8]); 3] = [("a.txt", b"AB"), ("b.txt", b""), ("c.txt", b"A")];
        for t in &l {
            std::fs::write(dir.path().join(t.0), t.1).unwrap();
        }
        let r = super::prepare(&[dir.path()], &|_: &std::path::Path| -> Option<u64> { None });
        assert_eq!(r.len(), 3);

        let mut h = Harness::new(BenchOptions::new(), 1);
        let mut out = vec![];
        let v = h.run(&r, &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 9, "{s}");
        assert!(lines[0].starts_with("warm-up: hashing warm-up"), "{}", lines[0]);
        assert_eq!(v.len(), 8);
        for (x, line) in v.iter().zip(&lines[1..]) {
            assert!(line.starts_with(&format!("hashing {} ", x.label)), "{line}");
            assert_eq!(x.files, 3);
            // XOR is order independent, and the files are shorter than the prefix
            assert_eq!(x.checksum, 0x4241 ^ 0x41);
        }
    }

    #[test]
    fn test_run_count() {
        let opt = BenchOptions {
            strategies: vec![Strategy::new(Ordering::Random, true)],
            count: 3,
            warm_up: false,
            ..BenchOptions::new()
        };
        let r = records(&[("x", 0), ("y", 0)]);
        let mut h = Harness::with_checksummer(opt, 0, Recorder::default());
        let mut out = vec![];
        let v = h.run(&r, &mut out).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(super::group_reports(&v).len(), 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_run_pass_order() {
        let r = records(&[("d", 9), ("b", 0), ("c", 4), ("a", 0)]);
        let l = [
            (Ordering::Original, ["d", "b", "c", "a"]),
            (Ordering::Alphabetical, ["a", "b", "c", "d"]),
            (Ordering::AllocationOrder, ["b", "a", "c", "d"]),
        ];
        for t in &l {
            let mut h = Harness::with_checksummer(BenchOptions::new(), 0, Recorder::default());
            let x = h.run_pass(&r, Strategy::new(t.0, false));
            assert_eq!(x.files, 4);
            let visited: Vec<String> = h
                .checksummer
                .visited
                .borrow()
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            assert_eq!(visited, t.1, "{}", t.0);
        }
    }

    #[test]
    fn test_run_pass_cap() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("big");
        std::fs::write(&p, vec![0u8; 100_000]).unwrap();
        let r = vec![FileRecord::new(p.clone(), 0)];
        let opt = BenchOptions {
            prefix: 65536,
            ..BenchOptions::new()
        };
        let storage = SlowStorage {
            sizes: [(p, 100_000)].into_iter().collect(),
            micros_per_10_bytes: 1,
        };
        let mut h = Harness::with_checksummer(opt, 0, storage);
        let capped = h.run_pass(&r, Strategy::new(Ordering::Original, true));
        let whole = h.run_pass(&r, Strategy::new(Ordering::Original, false));
        assert_eq!(capped.cap, Some(65536));
        assert_eq!(capped.checksum, 65536);
        assert_eq!(whole.cap, None);
        assert_eq!(whole.checksum, 100_000);
        assert!(whole.seconds >= capped.seconds, "{whole} {capped}");
    }

    #[test]
    fn test_run_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let opt = BenchOptions {
            strategies: vec![
                Strategy::new(Ordering::AllocationOrder, true),
                Strategy::new(Ordering::Random, false),
            ],
            count: 2,
            ..BenchOptions::new()
        };
        let r = records(&[("x", 0), ("y", 0)]);
        let mut h = Harness::with_checksummer(opt, 0, Recorder::default());
        let v = h.run_to_dir(&r, "my src", &out).unwrap();
        assert_eq!(v.len(), 4);
        // warm-up, then 2 files per pass
        assert_eq!(h.checksummer.visited.borrow().len(), 2 + 4 * 2);

        let mut names: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["my_src_c64_1", "my_src_c64_2", "my_src_r_1", "my_src_r_2"]);
        let s = std::fs::read_to_string(out.join("my_src_r_2")).unwrap();
        assert_eq!(s, format!("{}\n", v[3]));

        let v = h.run_to_dir(&[], "empty", &out).unwrap();
        assert!(v.is_empty());
        let s = std::fs::read_to_string(out.join("empty_c64_1")).unwrap();
        assert_eq!(s, "no files found\n");
    }

    #[test]
    fn test_group_reports() {
        let mut h = Harness::with_checksummer(BenchOptions::new(), 0, Recorder::default());
        let r = records(&[("x", 0)]);
        let v = vec![
            h.run_pass(&r, Strategy::new(Ordering::Original, true)),
            h.run_pass(&r, Strategy::new(Ordering::Random, false)),
            h.run_pass(&r, Strategy::new(Ordering::Original, true)),
        ];
        let g = super::group_reports(&v);
        assert_eq!(g.len(), 2);
        assert_eq!(g[0].0, "f64");
        assert_eq!(g[0].1.len(), 2);
        assert_eq!(g[1].0, "r");
    }

    #[test]
    fn test_report_string() {
        let r = super::PassReport {
            label: "c64".to_string(),
            ordering: Ordering::AllocationOrder,
            cap: Some(65536),
            files: 12,
            checksum: 0xabcd,
            seconds: 1.5,
        };
        assert_eq!(
            r.to_string(),
            "hashing c64 (cluster order, first 64.00KB) 12 files took 1.500000s, checksum 000000000000abcd"
        );
    }
}
