//! Generates `include/todo_social.h` from the `extern "C"` surface.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let include_dir = crate_dir.join("include");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("TODO_SOCIAL_H")
        .generate();

    match bindings {
        Ok(bindings) => {
            if std::fs::create_dir_all(&include_dir).is_ok() {
                bindings.write_to_file(include_dir.join("todo_social.h"));
            }
        }
        // A missing header is not a build error.
        Err(e) => println!("cargo:warning=cbindgen: {e}"),
    }
}
