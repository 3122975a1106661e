mod env;

use fileorder_utils::bench;
use fileorder_utils::cache;
use fileorder_utils::extent;
use fileorder_utils::order;
use fileorder_utils::stats;
use fileorder_utils::subs;
use fileorder_utils::util;
use fileorder_utils::walk;

use extent::AllocationUnitProvider;
use std::io::Write;

#[derive(Debug, Default)]
struct FileorderOptions {
    verbose: bool,
    quiet: bool,
    list: bool,
    out_dir: Option<std::path::PathBuf>,
    seed: u64,
    bench: bench::BenchOptions,
}

impl FileorderOptions {
    fn new() -> Self {
        Self {
            seed: env::get_seed().unwrap_or_else(subs::get_clock_seed),
            bench: bench::BenchOptions {
                prefix: env::get_prefix(),
                count: env::get_count(),
                drop_cache: env::get_drop_cache(),
                ..bench::BenchOptions::new()
            },
            ..Default::default()
        }
    }
}

fn usage(prog: &str, gopt: &getopts::Options) {
    print!(
        "{}",
        gopt.usage(&format!(
            "usage: {prog} [-v] [-q] [-l] [-D] [-W] [-s strategies] [-n count] \
            [-p prefix[k,m,g]] [-S seed] [-o dir] directory ...\n\
            strategies (comma separated, default all):\n    \
            f, f64  filesystem (enumeration) order\n    \
            a, a64  alphabetical order\n    \
            r, r64  random order\n    \
            c, c64  cluster (allocation unit) order\n\
            a 64 suffix hashes only the first prefix bytes of each file\n\
            with -o, each pass of each directory is saved to \
            dir/<directory>_<strategy>_<run> for fileorder_summary"
        ))
    );
}

fn main() {
    if let Err(e) = util::init_std_logger() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let args: Vec<String> = std::env::args().collect();
    let prog = &util::get_basename(&args[0]);

    let mut gopt = getopts::Options::new();
    gopt.optflag("v", "", "Enable verbose flag");
    gopt.optflag("q", "", "Enable quiet flag");
    gopt.optflag("l", "", "List files and exit");
    gopt.optflag("D", "", "Drop cached file pages before each pass");
    gopt.optflag("W", "", "Skip the warm-up pass");
    gopt.optopt("s", "", "Select strategies", "<strategies>");
    gopt.optopt("n", "", "Measure each strategy count times", "<count>");
    gopt.optopt("p", "", "Prefix size for 64 strategies", "<prefix[k,m,g]>");
    gopt.optopt("S", "", "Random seed (hex)", "<seed>");
    gopt.optopt("o", "", "Save each pass under dir", "<dir>");
    gopt.optflag("", "version", "Print version and exit");
    gopt.optflag("", "help", "Print usage and exit");

    let matches = match gopt.parse(&args[1..]) {
        Ok(v) => v,
        Err(e) => {
            log::error!("{e}");
            usage(prog, &gopt);
            std::process::exit(1);
        }
    };
    if matches.opt_present("version") {
        util::print_version();
        std::process::exit(0);
    }
    if matches.opt_present("help") {
        usage(prog, &gopt);
        std::process::exit(0);
    }

    let mut opt = FileorderOptions::new();
    if matches.opt_present("v") {
        if opt.quiet {
            opt.quiet = false;
        } else {
            opt.verbose = true;
        }
    }
    if matches.opt_present("q") {
        if opt.verbose {
            opt.verbose = false;
        } else {
            opt.quiet = true;
        }
    }
    opt.list = matches.opt_present("l");
    if matches.opt_present("D") {
        opt.bench.drop_cache = true;
    }
    opt.bench.warm_up = !matches.opt_present("W");
    if let Some(v) = matches.opt_str("s") {
        opt.bench.strategies = match order::parse_strategies(&v) {
            Ok(v) => v,
            Err(e) => {
                log::error!("{v}: {e}");
                usage(prog, &gopt);
                std::process::exit(1);
            }
        };
    }
    if let Some(v) = matches.opt_str("n") {
        opt.bench.count = match env::parse_count(&v) {
            Some(v) => v,
            None => {
                log::error!("{v}: count must be within 1..={}", env::MAX_COUNT);
                std::process::exit(1);
            }
        };
    }
    if let Some(v) = matches.opt_str("p") {
        opt.bench.prefix = match subs::get_string_size(&v) {
            Ok(v) => v,
            Err(e) => {
                log::error!("{v}: {e}");
                std::process::exit(1);
            }
        };
    }
    if let Some(v) = matches.opt_str("S") {
        opt.seed = match env::parse_seed(&v) {
            Some(v) => v,
            None => {
                log::error!("{v}: invalid hexadecimal seed");
                std::process::exit(1);
            }
        };
    }
    opt.out_dir = matches.opt_str("o").map(std::path::PathBuf::from);

    let args = &matches.free;
    if args.is_empty() {
        usage(prog, &gopt);
        std::process::exit(1);
    }

    if let Err(e) = run(args, &opt) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(roots: &[String], opt: &FileorderOptions) -> fileorder_utils::Result<()> {
    let mut out = std::io::stdout().lock();

    if opt.list {
        let (files, d) = util::time(|| walk::collect_roots(roots));
        for f in &files {
            writeln!(out, "{}", f.display())?;
        }
        writeln!(
            out,
            "listing {} files took {:.6}s",
            files.len(),
            d.as_secs_f64()
        )?;
        return Ok(());
    }

    let provider = extent::NativeProvider::new();
    if !provider.is_supported()
        && opt
            .bench
            .strategies
            .iter()
            .any(|s| s.ordering == order::Ordering::AllocationOrder)
    {
        log::warn!(
            "allocation units are unavailable on {}, cluster order equals filesystem order",
            util::get_os_name()
        );
    }
    if opt.bench.drop_cache && !cache::is_supported() {
        log::warn!(
            "dropping cached pages is unsupported on {}",
            util::get_os_name()
        );
    }

    if !opt.quiet {
        let t = subs::get_time_string(std::time::SystemTime::now())?;
        writeln!(out, "{} {t} seed {:016x}", util::get_version_string(), opt.seed)?;
    }
    let mut harness = bench::Harness::new(opt.bench.clone(), opt.seed);

    if let Some(dir) = &opt.out_dir {
        for root in roots {
            let records = bench::prepare(&[root], &provider);
            if !opt.quiet {
                writeln!(out, "processing {root}, {} files", records.len())?;
            }
            for r in harness.run_to_dir(&records, root, dir)? {
                if !opt.quiet {
                    writeln!(out, "{r}")?;
                }
            }
        }
        return Ok(());
    }

    let (records, d) = util::time(|| bench::prepare(roots, &provider));
    if !opt.quiet {
        writeln!(
            out,
            "found {} files ({} located) in {:.6}s",
            records.len(),
            records.iter().filter(|r| r.allocation_unit != 0).count(),
            d.as_secs_f64()
        )?;
    }
    if opt.verbose {
        for r in &records {
            writeln!(out, "{:>16} {}", r.allocation_unit, r.path.display())?;
        }
    }

    let reports = harness.run(&records, &mut out)?;
    if opt.bench.count > 1 {
        writeln!(out)?;
        stats::write_summary(&bench::group_reports(&reports), &mut out)?;
    }
    Ok(())
}
