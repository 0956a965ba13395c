use {
    std::{fs, path::Path},
    tracing::Level,
    tracing_subscriber::{
        prelude::*,
        filter::filter_fn,
    },
};

pub fn init_logging() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish()
        .with(filter_fn(|metadata| {
            // model downloads are noisy when the bert estimator is enabled
            if metadata.target().starts_with("cached_path") || metadata.target().starts_with("rust_bert") {
                metadata.level() <= &Level::WARN
            } else {
                true
            }
        }))
        .init();
}

pub fn write_file(path: &str, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|v| !v.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}

pub fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or("N/A".to_owned())
}
