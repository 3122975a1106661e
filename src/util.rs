pub const VERSION: [i32; 3] = [0, 1, 0];

#[must_use]
pub fn get_version_string() -> String {
    format!("{}.{}.{}", VERSION[0], VERSION[1], VERSION[2])
}

pub fn print_version() {
    println!("{}", get_version_string());
}

#[must_use]
pub fn get_basename(f: &str) -> String {
    match std::path::Path::new(&f).file_name() {
        Some(v) => v.to_string_lossy().to_string(),
        None => f.to_string(),
    }
}

/// Runs `f` once and returns its result along with the elapsed wall-clock time.
pub fn time<T, F>(f: F) -> (T, std::time::Duration)
where
    F: FnOnce() -> T,
{
    let t = std::time::Instant::now();
    let v = f();
    (v, t.elapsed())
}

#[must_use]
pub fn invalid() -> std::io::Error {
    std::io::Error::from(std::io::ErrorKind::InvalidInput)
}

#[must_use]
pub fn get_os_name() -> &'static str {
    std::env::consts::OS
}

const DEBUG: &str = "DEBUG";

#[must_use]
pub fn get_debug_level() -> i32 {
    match std::env::var(DEBUG) {
        Ok(v) => v.parse().unwrap_or(-1),
        Err(_) => -1,
    }
}

#[must_use]
pub fn is_debug_set() -> bool {
    get_debug_level() > 0
}

/// # Errors
pub fn init_std_logger() -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", if is_debug_set() { "trace" } else { "info" });
    env_logger::try_init_from_env(env)
}
