use fileorder_utils::results;
use fileorder_utils::util;

use std::io::Write;

fn usage(prog: &str, gopt: &getopts::Options) {
    print!(
        "{}",
        gopt.usage(&format!(
            "usage: {prog} [-o name] [folder]\n\
            Summarizes fileorder results saved as <corpus>_<strategy>_<run> \
            in folder (default \"out\"), and writes the statistics to \
            <folder>/<name>_stats.json (default name \"summary\")"
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
    gopt.optopt("o", "", "Base name of the statistics file", "<name>");
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

    let name = matches.opt_str("o").unwrap_or_else(|| "summary".to_string());
    let dir = match matches.free.len() {
        0 => "out",
        1 => matches.free[0].as_str(),
        _ => {
            usage(prog, &gopt);
            std::process::exit(1);
        }
    };
    let dir = std::path::Path::new(dir);
    if !dir.is_dir() {
        log::error!("{}: input folder not found", dir.display());
        std::process::exit(1);
    }

    if let Err(e) = run(dir, &name) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(dir: &std::path::Path, name: &str) -> fileorder_utils::Result<()> {
    let m = results::get_results(dir)?;
    let f = dir.join(format!("{name}_stats.json"));
    results::write_statistics(&f, &results::get_statistics_map(&m))?;
    log::info!("{}: {} corpora", f.display(), m.len());

    let mut out = std::io::stdout().lock();
    results::print_results(&m, &mut out)?;
    out.flush()?;
    Ok(())
}
