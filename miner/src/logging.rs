// Thin logging-setup glue for binaries built on top of this crate. Not part
// of the mining contract itself -- the core only emits through the `log`
// facade and never assumes a particular subscriber is installed (§1.1).

pub fn init_logger(default_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}
