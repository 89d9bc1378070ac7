use ds_common::{dynarr, collections::{DynArr, DynArrError}};
use ds_logging::{log_error, log_info, log_verbose, LogCategory, LogLevel, Logger, set_logger, get_logger};

pub const LOG_CAT : LogCategory = LogCategory::new("Main");

static LOGGER: Logger = Logger::new();

fn setup_logging() {
    set_logger(&LOGGER);

    let level = std::env::var("DS_LOG_LEVEL").ok();
    match level.as_deref().map(|s| (s, LogLevel::parse(s))) {
        Some((_, Some(level))) => LOGGER.set_max_level(level),
        Some((s, None)) => log_error!(LOG_CAT, "Unknown log level '{s}', keeping the default"),
        None => LOGGER.set_max_level(LogLevel::Info),
    }
}

fn main() {
    setup_logging();

    let count = match std::env::args().nth(1).map(|arg| arg.parse::<usize>()) {
        Some(Ok(count)) => count,
        Some(Err(err)) => {
            log_error!(LOG_CAT, "Invalid element count: {err}");
            std::process::exit(1);
        },
        None => 100,
    };

    if let Err(err) = run(count) {
        log_error!(LOG_CAT, "{err}");
    }

    if let Some(logger) = get_logger() {
        logger.flush();
    }
}

fn run(count: usize) -> Result<(), DynArrError> {
    let mut arr = DynArr::<usize>::new();
    for i in 0..count {
        let old_cap = arr.capacity();
        arr.push(i);
        if arr.capacity() != old_cap {
            log_verbose!(LOG_CAT, "Grew from {old_cap} to {} elements at length {}", arr.capacity(), arr.len());
        }
    }
    log_info!(LOG_CAT, "Pushed {} elements, capacity: {}", arr.len(), arr.capacity());

    arr.shrink_to_fit();
    log_info!(LOG_CAT, "After shrink_to_fit, capacity: {}", arr.capacity());

    let middle = arr.len() / 2;
    log_info!(LOG_CAT, "Element at {middle}: {:?}", arr.at(middle).ok());

    let first = arr.begin();
    let last = arr.end();
    let sum: usize = first.iter_to(last).sum();
    log_info!(LOG_CAT, "Cursor distance: {}, sum: {sum}", last - first);

    let mut copy = DynArr::<usize>::new();
    copy.assign(count.min(8), 7)?.push(8);
    log_info!(LOG_CAT, "Assigned: {copy:?}");

    let words = dynarr!["cursor", "based", "dynamic", "array"];
    let tail = DynArr::<&str>::from_cursors(words.begin() + 1, words.end());
    log_info!(LOG_CAT, "Tail of {words:?}: {tail:?}");

    let taken = arr.take();
    log_info!(LOG_CAT, "Took {} elements, source capacity is now {}", taken.len(), arr.capacity());

    if let Err(err) = taken.at(taken.len()) {
        log_info!(LOG_CAT, "Checked access past the end: {err}");
    }
    if let Err(err) = arr.reserve(usize::MAX) {
        log_info!(LOG_CAT, "Oversized reserve: {err}");
    }
    Ok(())
}
