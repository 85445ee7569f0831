//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so pages can reference it as
//! `/static/css/shop.css?v=<hash>` and browsers refetch it only when it changes.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_stylesheet();
}

/// Set `STYLESHEET_HASH` (first 8 hex chars of the SHA-256 of `shop.css`).
fn fingerprint_stylesheet() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=STYLESHEET_HASH=dev");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/shop.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = match fs::read(&css_path) {
        Ok(content) => {
            let digest = format!("{:x}", Sha256::digest(&content));
            digest.chars().take(8).collect::<String>()
        }
        Err(e) => {
            println!("cargo:warning=Could not read shop.css: {e}");
            "dev".to_owned()
        }
    };

    println!("cargo:rustc-env=STYLESHEET_HASH={hash}");
}
