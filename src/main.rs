fn main() {
    #[cfg(feature = "cli")]
    compactdata::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("compactdata: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
