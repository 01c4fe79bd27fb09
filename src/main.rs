mod app;
mod audio;
mod backend;
mod config;
mod library;
mod runtime;

fn main() -> anyhow::Result<()> {
    let mut clog = colog::default_builder();
    match std::env::var("BETAWAVE_LOG") {
        Ok(filters) => {
            clog.parse_filters(&filters);
        }
        Err(_) => {
            clog.filter(None, log::LevelFilter::Info);
        }
    }
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    runtime::run()
}
