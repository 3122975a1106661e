use crate::extent;

/// Order in which a pass visits the files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ordering {
    /// Enumeration order.
    Original,
    /// Byte order of the path.
    Alphabetical,
    /// Uniform shuffle.
    Random,
    /// Ascending first allocation unit, ties kept in enumeration order.
    AllocationOrder,
}

impl Ordering {
    pub const ALL: [Self; 4] = [
        Self::Original,
        Self::Alphabetical,
        Self::Random,
        Self::AllocationOrder,
    ];

    #[must_use]
    pub fn get_tag(self) -> &'static str {
        match self {
            Self::Original => "f",
            Self::Alphabetical => "a",
            Self::Random => "r",
            Self::AllocationOrder => "c",
        }
    }

    #[must_use]
    pub fn get_name(self) -> &'static str {
        match self {
            Self::Original => "filesystem",
            Self::Alphabetical => "alphabetical",
            Self::Random => "random",
            Self::AllocationOrder => "cluster",
        }
    }
}

impl std::fmt::Display for Ordering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

/// An ordering plus whether passes are capped to the prefix size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Strategy {
    pub ordering: Ordering,
    pub prefix: bool,
}

impl Strategy {
    #[must_use]
    pub fn new(ordering: Ordering, prefix: bool) -> Self {
        Self { ordering, prefix }
    }

    /// Every strategy, prefix passes first.
    #[must_use]
    pub fn get_all() -> Vec<Self> {
        let mut v = vec![];
        for prefix in [true, false] {
            for ordering in Ordering::ALL {
                v.push(Self::new(ordering, prefix));
            }
        }
        v
    }

    #[must_use]
    pub fn get_tag(&self) -> String {
        format!(
            "{}{}",
            self.ordering.get_tag(),
            if self.prefix { "64" } else { "" }
        )
    }

    #[must_use]
    pub fn from_tag(s: &str) -> Option<Self> {
        let (s, prefix) = match s.strip_suffix("64") {
            Some(v) => (v, true),
            None => (s, false),
        };
        Ordering::ALL
            .into_iter()
            .find(|x| x.get_tag() == s)
            .map(|x| Self::new(x, prefix))
    }
}

/// Parses a comma separated list of strategy tags, e.g. "c64,c".
///
/// # Errors
pub fn parse_strategies(s: &str) -> crate::Result<Vec<Strategy>> {
    let mut v = vec![];
    for t in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some(x) = Strategy::from_tag(t) else {
            log::error!("invalid strategy {t}");
            return Err(Box::new(crate::util::invalid()));
        };
        if !v.contains(&x) {
            v.push(x);
        }
    }
    if v.is_empty() {
        return Err(Box::new(crate::util::invalid()));
    }
    Ok(v)
}

/// A discovered file and the first allocation unit backing it
/// (0 if unknown).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub path: std::path::PathBuf,
    pub allocation_unit: u64,
}

impl FileRecord {
    #[must_use]
    pub fn new(path: std::path::PathBuf, allocation_unit: u64) -> Self {
        Self {
            path,
            allocation_unit,
        }
    }
}

/// Looks up the allocation unit of each file, keeping enumeration order.
#[must_use]
pub fn locate<P>(files: Vec<std::path::PathBuf>, provider: &P) -> Vec<FileRecord>
where
    P: extent::AllocationUnitProvider + ?Sized,
{
    files
        .into_iter()
        .map(|path| {
            let unit = extent::allocation_unit(provider, &path);
            log::trace!("{}: {unit}", path.display());
            FileRecord::new(path, unit)
        })
        .collect()
}

/// Returns the paths of `records` permuted according to `ordering`.
/// `records` is taken to be in enumeration order.
#[must_use]
pub fn arrange<'a>(
    records: &'a [FileRecord],
    ordering: Ordering,
    rng: &mut fastrand::Rng,
) -> Vec<&'a std::path::Path> {
    let mut v: Vec<&FileRecord> = records.iter().collect();
    match ordering {
        Ordering::Original => (),
        Ordering::Alphabetical => v.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str())),
        Ordering::Random => rng.shuffle(&mut v),
        Ordering::AllocationOrder => v.sort_by_key(|x| x.allocation_unit),
    }
    v.into_iter().map(|x| x.path.as_path()).collect()
}
