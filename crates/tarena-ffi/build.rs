//! Generates `include/tarena.h` from the `extern "C"` items of this crate.
//!
//! Set `TARENA_HEADER_DIR` to write the header somewhere else.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=TARENA_HEADER_DIR");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR"));
    let header_dir = env::var_os("TARENA_HEADER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| crate_dir.join("include"));

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))
        .unwrap_or_else(|e| panic!("invalid cbindgen.toml: {e}"));
    std::fs::create_dir_all(&header_dir)
        .unwrap_or_else(|e| panic!("cannot create {}: {e}", header_dir.display()));

    let bindings = cbindgen::generate_with_config(&crate_dir, config)
        .unwrap_or_else(|e| panic!("cbindgen failed: {e}"));
    bindings.write_to_file(header_dir.join("tarena.h"));
}
