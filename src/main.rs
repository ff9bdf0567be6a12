#[cfg(not(any(feature = "cli")))]
fn main() {}

#[cfg(feature = "cli")]
fn main() -> btconvert::prelude::FdResult<()> {
    btconvert::cli::init(&btconvert::prelude::Config::new())
}
