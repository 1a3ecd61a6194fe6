/// Initializes the logger with the `env_logger` crate.
///
/// The filter comes from `RUST_LOG`, e.g. `RUST_LOG=db410c_gpio=debug` to see
/// every command issued. Calling this more than once is harmless.
///
/// Failed commands are printed to stdout whether or not a logger is installed.
pub fn init_logger() {
    let _ = env_logger::try_init();
}
