use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // Only the firmware image needs the linker memory map.
    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("thumbv") {
        let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
        fs::copy("memory.x", out.join("memory.x")).unwrap();
        println!("cargo:rustc-link-search={}", out.display());
    }
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
