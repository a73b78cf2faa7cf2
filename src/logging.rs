use env_logger::Env;
use std::io::Write;

/// Route `log` records to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    match env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
    {
        Ok(_) => (),
        Err(_) => {
            // Already initialized
        }
    }
}
