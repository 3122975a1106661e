/// Stand-in for platforms without an extent query; every lookup is unknown.
#[derive(Debug, Default)]
pub struct NativeProvider {}

impl NativeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

impl super::AllocationUnitProvider for NativeProvider {
    fn first_allocation_unit(&self, _path: &std::path::Path) -> Option<u64> {
        None
    }

    fn is_supported(&self) -> bool {
        false
    }
}
