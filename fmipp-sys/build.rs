fn main() {
    #[cfg(feature = "fmi1")]
    {
        println!("cargo:rerun-if-changed=src/fmi1/logger.c");
        cc::Build::new()
            .file("src/fmi1/logger.c")
            .compile("libfmippLogger.a");
    }
}
