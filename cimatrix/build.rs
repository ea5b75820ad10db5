fn main() {
    // The triple this crate is compiled for is the host's native target.
    let target = std::env::var("TARGET").unwrap_or_default();
    println!("cargo:rustc-env=CIMATRIX_BUILD_TARGET={target}");
    println!("cargo:rerun-if-changed=build.rs");
}
