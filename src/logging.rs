use tracing_subscriber::filter::LevelFilter;

#[derive(Clone, Copy, Debug, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub quiet: bool,
}

impl LogOptions {
    fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else if self.quiet {
            LevelFilter::WARN
        } else {
            LevelFilter::INFO
        }
    }
}

/// Install the global fmt subscriber on stderr. Calling twice is a no-op.
pub fn init(opts: LogOptions) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(opts.level())
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
