use std::io::Write;
use chrono::Local;
use colored::Colorize;
use log::Level;

#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => (
        #[cfg(feature = "debug")]
        println!($($arg)*)
    )
}

/// Initialize env_logger with an `info` default, overridable through `RUST_LOG`.
pub fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                Local::now().format("%H:%M:%S%.3f"),
                level_label(record.level()),
                record.args()
            )
        })
        .try_init();
}

fn level_label(level: Level) -> String {
    let label = format!("{:<5}", level);
    match level {
        Level::Error => label.red().bold().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug => label.blue().to_string(),
        Level::Trace => label.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_the_level_name() {
        colored::control::set_override(false);
        assert_eq!(level_label(Level::Info), "INFO ");
        assert_eq!(level_label(Level::Error), "ERROR");
    }

    #[test]
    fn logger_can_be_initialized_twice() {
        init_logger();
        init_logger();
    }
}
