/// Get the version string for regscan and libregscan
pub fn get_version_string() -> String {
    format!(
        "regscan {}\nlibregscan {}",
        env!("CARGO_PKG_VERSION"),
        libregscan::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
