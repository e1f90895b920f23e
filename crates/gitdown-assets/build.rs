fn main() {
    // Embedded stylesheets must be refreshed when dist/ changes
    #[cfg(feature = "embed")]
    {
        println!("cargo:rerun-if-changed=dist");
        println!("cargo:rerun-if-changed=build.rs");
    }
}
