use fileorder_utils::subs;

pub(crate) const SEED: &str = "FILEORDER_SEED";
pub(crate) const PREFIX: &str = "FILEORDER_PREFIX";
pub(crate) const COUNT: &str = "FILEORDER_COUNT";
pub(crate) const DROP_CACHE: &str = "FILEORDER_DROP_CACHE";

pub(crate) const MAX_COUNT: usize = 10000;

pub(crate) fn get_seed() -> Option<u64> {
    std::env::var(SEED).ok().as_deref().and_then(parse_seed)
}

pub(crate) fn get_prefix() -> u64 {
    std::env::var(PREFIX)
        .ok()
        .and_then(|v| subs::get_string_size(&v).ok())
        .unwrap_or(subs::DEFAULT_PREFIX)
}

pub(crate) fn get_count() -> usize {
    std::env::var(COUNT)
        .ok()
        .as_deref()
        .and_then(parse_count)
        .unwrap_or(1)
}

pub(crate) fn get_drop_cache() -> bool {
    std::env::var(DROP_CACHE)
        .ok()
        .as_deref()
        .is_some_and(parse_flag)
}

/// Hexadecimal, with or without a leading 0x.
pub(crate) fn parse_seed(v: &str) -> Option<u64> {
    parse_radix(v, 16)
}

pub(crate) fn parse_count(v: &str) -> Option<usize> {
    v.trim()
        .parse()
        .ok()
        .filter(|n| (1..=MAX_COUNT).contains(n))
}

fn parse_flag(v: &str) -> bool {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => true,
        v => v.parse::<i64>().is_ok_and(|n| n != 0),
    }
}

fn parse_radix<T>(v: &str, radix: u32) -> Option<T>
where
    T: num_traits::Num,
{
    let v = v.trim();
    let v = v
        .strip_prefix("0x")
        .or_else(|| v.strip_prefix("0X"))
        .unwrap_or(v);
    T::from_str_radix(v, radix).ok()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_parse_seed() {
        let l = [
            ("", None),
            ("0", Some(0)),
            ("a", Some(10)),
            ("0x10", Some(16)),
            ("0XfF", Some(255)),
            (" 1234abcd ", Some(0x1234_abcd)),
            ("ffffffffffffffff", Some(u64::MAX)),
            ("10000000000000000", None),
            ("g", None),
            ("-1", None),
        ];
        for t in &l {
            assert_eq!(super::parse_seed(t.0), t.1, "{}", t.0);
        }
    }

    #[test]
    fn test_parse_count() {
        let l = [
            ("", None),
            ("0", None),
            ("1", Some(1)),
            ("5", Some(5)),
            ("10000", Some(10000)),
            ("10001", None),
            ("-3", None),
            ("two", None),
        ];
        for t in &l {
            assert_eq!(super::parse_count(t.0), t.1, "{}", t.0);
        }
    }

    #[test]
    fn test_parse_flag() {
        let l = [
            ("1", true),
            ("-1", true),
            ("yes", true),
            ("On", true),
            ("TRUE", true),
            ("", false),
            ("0", false),
            ("no", false),
            ("off", false),
        ];
        for t in &l {
            assert_eq!(super::parse_flag(t.0), t.1, "{}", t.0);
        }
    }
}
