pub const K: usize = 1024;
pub const M: usize = K * 1024;
pub const G: usize = M * 1024;
pub const T: usize = G * 1024;

pub const K_U64: u64 = K as u64;
pub const M_U64: u64 = M as u64;
pub const G_U64: u64 = G as u64;
pub const T_U64: u64 = T as u64;

pub const K_F64: f64 = K as f64;
pub const M_F64: f64 = M as f64;
pub const G_F64: f64 = G as f64;
pub const T_F64: f64 = T as f64;

/// Default prefix cap for the "64" strategies.
pub const DEFAULT_PREFIX: u64 = 64 * K_U64;

/// # Errors
pub fn get_time_string(t: std::time::SystemTime) -> Result<String, time::error::Format> {
    let fmt = time::macros::format_description!(
        "[day]-[month repr:short]-[year] [hour]:[minute]:[second]"
    );
    time::OffsetDateTime::from(t).format(fmt)
}

#[must_use]
pub fn get_size_string(size: u64) -> String {
    if size < K_U64 / 2 {
        format!("{:6.2}B", size as f64)
    } else if size < M_U64 / 2 {
        format!("{:6.2}KB", size as f64 / K_F64)
    } else if size < G_U64 / 2 {
        format!("{:6.2}MB", size as f64 / M_F64)
    } else if size < T_U64 / 2 {
        format!("{:6.2}GB", size as f64 / G_F64)
    } else {
        format!("{:6.2}TB", size as f64 / T_F64)
    }
}

/// Parses a byte count with an optional k/m/g suffix, e.g. "64k".
///
/// # Errors
pub fn get_string_size(v: &str) -> crate::Result<u64> {
    let Some(s) = v.get(v.len().saturating_sub(1)..) else {
        return Err(Box::new(crate::util::invalid()));
    };
    let unit = match s {
        "k" | "K" => K_U64,
        "m" | "M" => M_U64,
        "g" | "G" => G_U64,
        "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" => 1,
        _ => {
            return Err(Box::new(crate::util::invalid()));
        }
    };
    let s = if unit > 1 { &v[..v.len() - 1] } else { v };
    match s.parse::<u64>() {
        Ok(n) => match n.checked_mul(unit) {
            Some(v) => Ok(v),
            None => Err(Box::new(crate::util::invalid())),
        },
        Err(e) => Err(Box::new(e)),
    }
}

/// Returns a seed derived from the wall clock.
#[must_use]
pub fn get_clock_seed() -> u64 {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => d.as_secs() ^ u64::from(d.subsec_nanos()).rotate_left(32),
        Err(_) => 0,
    }
}
