/// Values stamped in by `build.rs`. Missing entries read as `"unknown"`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

macro_rules! stamped {
    ($key:literal) => {
        match option_env!(concat!("BUDGETWISE_BUILD_", $key)) {
            Some(value) => value,
            None => "unknown",
        }
    };
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: stamped!("HASH"),
        git_status: stamped!("STATUS"),
        timestamp: stamped!("TIMESTAMP"),
        target: stamped!("TARGET"),
        profile: stamped!("PROFILE"),
        rustc: stamped!("RUSTC"),
    }
}
