use core::{
    cell::{Cell, RefCell},
    fmt::{Display, Arguments},
    mem,
    sync::atomic::{AtomicU8, self},
};
use std::{
    fmt::Write as _,
    io::{self, Write},
};
use parking_lot::{Mutex, RwLock};

mod time;
pub use time::{TimeStamp, get_timestamp};

#[doc(hidden)]
pub use ds_base::func_name;

// The RwLock only guards which logger is installed, the logger itself handles its own synchronization
static LOGGER : RwLock<Option<&'static Logger>> = parking_lot::const_rwlock(None);

/// Install the global logger.
pub fn set_logger(logger: &'static Logger) {
    *LOGGER.write() = Some(logger);
}

/// Uninstall the global logger, returning the previously installed one.
pub fn reset_logger() -> Option<&'static Logger> {
    LOGGER.write().take()
}

/// Get the global logger, if one was installed.
///
/// When no logger is installed, all logging macros are no-ops.
pub fn get_logger() -> Option<&'static Logger> {
    *LOGGER.read()
}

/// Logging level
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LogLevel {
    /// Severe error: will probably result in a crash
    Severe,
    /// Error: may not result in a crash
    Error,
    /// Warning: While not as bad as an error, it may result to something like a performance regression
    Warning,
    /// General info
    Info,
    /// Verbose info
    Verbose,
    /// Debug info (includes verbose info)
    Debug,
}

impl LogLevel {
    /// Parse a level from its name, case insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "severe"  => Some(LogLevel::Severe),
            "error"   => Some(LogLevel::Error),
            "warning" => Some(LogLevel::Warning),
            "info"    => Some(LogLevel::Info),
            "verbose" => Some(LogLevel::Verbose),
            "debug"   => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Severe  => f.write_str("\x1B[1m\x1B[41m\x1B[30m[SEVERE ]\x1B[0m"),
            LogLevel::Error   => f.write_str(               "\x1B[91m[ERROR  ]\x1B[0m"),
            LogLevel::Warning => f.write_str(               "\x1B[93m[WARNING]\x1B[0m"),
            LogLevel::Info    => f.write_str(               "\x1B[37m[INFO   ]\x1B[0m"),
            LogLevel::Verbose => f.write_str(               "\x1B[90m[VERBOSE]\x1B[0m"),
            LogLevel::Debug   => f.write_str(               "\x1B[94m[DEBUG  ]\x1B[0m"),
        }
    }
}

/// Log category
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LogCategory {
    category     : &'static str,
    sub_category : Option<&'static str>
}

impl LogCategory {
    pub const fn new(name: &'static str) -> Self {
        Self { category: name, sub_category: None }
    }

    pub const fn new_with_sub(name: &'static str, sub_name: &'static str) -> Self {
        Self { category: name, sub_category: Some(sub_name) }
    }
}

impl Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sub_category {
            Some(sub) => f.write_fmt(format_args!("{}({sub})", self.category)),
            None => f.write_str(self.category),
        }
    }
}

/// Additional info about where the log occured
pub struct LogLocation {
    file : &'static str,
    line : u32,
    func : &'static str,
    time : TimeStamp,
}

impl LogLocation {
    /// Creates a new log location
    pub const fn new(file: &'static str, line: u32, func: &'static str, time: TimeStamp) -> Self {
        Self { file, line, func, time }
    }

    /// Get the file name where the log occured
    pub const fn file(&self) -> &str {
        self.file
    }

    /// Get the line where the log occurred
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Get the function where the log occurred
    pub const fn function(&self) -> &str {
        self.func
    }

    /// Get the timestamp when the log occurred
    pub const fn timestamp(&self) -> TimeStamp {
        self.time
    }
}

struct LogLocationFormatter<'a> {
    loc   : &'a LogLocation,
    level : LogLevel
}

impl<'a> LogLocationFormatter<'a> {
    fn new(loc: &'a LogLocation, level: LogLevel) -> Self {
        Self { loc, level }
    }
}

impl Display for LogLocationFormatter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            LogLevel::Severe |
            LogLevel::Error |
            LogLevel::Debug => f.write_fmt(format_args!("({}:{}: {})", self.loc.file(), self.loc.line(), self.loc.function())),
            LogLevel::Warning |
            LogLevel::Info |
            LogLevel::Verbose => Ok(()),
        }
    }
}

#[macro_export]
macro_rules! log_location {
    () => {
        $crate::LogLocation::new(file!(), line!(), $crate::func_name!(), $crate::get_timestamp())
    };
}

/// Boxed log output
pub type LogWriter = Box<dyn Write + Send>;

struct LoggerState {
    writers:        [Option<LogWriter>; Self::MAX_WRITERS],
    cache:          Option<String>,
    always_flush:   bool,
    log_to_console: bool,
}

impl LoggerState {
    const MAX_WRITERS: usize = 8;
    const CACHE_FLUSH_LIMIT: usize = 4 * 1024;

    const fn new() -> Self {
        const NONE: Option<LogWriter> = None;
        Self {
            writers: [NONE; Self::MAX_WRITERS],
            cache: None,
            always_flush: false,
            log_to_console: true,
        }
    }

    fn cache(&mut self) -> &mut String {
        self.cache.get_or_insert_with(|| String::with_capacity(Self::CACHE_FLUSH_LIMIT))
    }

    fn write_message(&mut self, message: &str) {
        self.cache().push_str(message);
        self.flush_when_needed();
    }

    fn flush_when_needed(&mut self) {
        if self.always_flush || self.cache.as_ref().map_or(0, |cache| cache.len()) > Self::CACHE_FLUSH_LIMIT {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let Some(cache) = &mut self.cache else { return };
        if cache.is_empty() {
            return;
        }

        if self.log_to_console {
            let mut stdout = io::stdout().lock();
            _ = stdout.write_all(cache.as_bytes());
            _ = stdout.flush();
        }

        for writer in self.writers.iter_mut().flatten() {
            _ = writer.write_all(cache.as_bytes());
            _ = writer.flush();
        }
        cache.clear();
    }
}

thread_local! {
    /// Buffer messages are formatted into before they are handed to a logger
    static FORMAT_CACHE: RefCell<String> = const { RefCell::new(String::new()) };
    /// Address of the logger whose state is locked by this thread, 0 if none
    static STATE_OWNER: Cell<usize> = const { Cell::new(0) };
}

/// Logger
///
/// Supports up to 8 writers, e.g. terminal, file, external tool, etc
///
/// Messages are formatted before the logger's state is locked, so formatting may log itself.
/// Writers run while the state is locked: a writer that logs to, or reconfigures, the logger it is attached to is ignored.
pub struct Logger {
    state: Mutex<LoggerState>,
    max_log_level: AtomicU8,
}

impl Logger {
    pub const fn new() -> Self {
        Self {
            state: parking_lot::const_mutex(LoggerState::new()),
            max_log_level: AtomicU8::new(LogLevel::Debug as u8),
        }
    }

    /// Run `f` on the locked state, or return `None` when this thread already holds the lock.
    fn with_state<U>(&self, f: impl FnOnce(&mut LoggerState) -> U) -> Option<U> {
        let addr = self as *const Self as usize;
        let prev = STATE_OWNER.with(|owner| owner.replace(addr));
        if prev == addr {
            return None;
        }
        let _restore = scopeguard::guard(prev, |prev| STATE_OWNER.with(|owner| owner.set(prev)));
        let mut state = self.state.lock();
        Some(f(&mut state))
    }

    /// Set the maximum log level (severe == lowest, debug == highest)
    pub fn set_max_level(&self, level: LogLevel) {
        self.max_log_level.store(level as u8, atomic::Ordering::Relaxed)
    }

    /// Check if a message at the given level would be logged
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.max_log_level.load(atomic::Ordering::Relaxed)
    }

    /// Set whether the logger should flush after each write
    pub fn set_always_flush(&self, always_flush: bool) {
        self.with_state(|state| state.always_flush = always_flush);
    }

    /// Set whether the logger should log it's output to console
    pub fn set_log_to_console(&self, log_to_console: bool) {
        self.with_state(|state| {
            // Make sure to flush first, cause all messages before wanted/didn't want to be log to be written to console
            state.flush();
            state.log_to_console = log_to_console;
        });
    }

    /// Add a writer.
    ///
    /// Returns `Ok(index)` if space was available. This index can be used to remove the writer later on.
    ///
    /// Otherwise returns an `Err` with the provided writer
    pub fn add_writer(&self, writer: LogWriter) -> Result<usize, LogWriter> {
        let mut res = Err(writer);
        self.with_state(|state| {
            let Some(id) = state.writers.iter().position(Option::is_none) else { return };
            if let Err(writer) = mem::replace(&mut res, Ok(id)) {
                state.writers[id] = Some(writer);
            }
        });
        res
    }

    /// Remove a writer from the logger, pending messages are flushed to it first
    pub fn remove_writer(&self, index: usize) -> Option<LogWriter> {
        self.with_state(|state| {
            state.flush();
            state.writers.get_mut(index)?.take()
        }).flatten()
    }

    /// Log a message
    pub fn log(&self, category: LogCategory, level: LogLevel, loc: LogLocation, text: &str) {
        self.log_fmt(category, level, loc, format_args!("{text}"));
    }

    /// Log a formatted message
    pub fn log_fmt(&self, category: LogCategory, level: LogLevel, loc: LogLocation, format: Arguments) {
        if !self.is_enabled(level) {
            return;
        }

        let loc_formatter = LogLocationFormatter::new(&loc, level);
        let timestamp = loc.timestamp();
        let write = |message: &mut String| {
            message.clear();
            // Writing into a `String` cannot fail
            _ = message.write_fmt(format_args!("\x1B[38m{timestamp}\x1B[0m {level} [{category}] {loc_formatter}: "));
            _ = message.write_fmt(format);
            message.push('\n');
            self.with_state(|state| state.write_message(message));
        };

        let cached = FORMAT_CACHE.try_with(|cache| match cache.try_borrow_mut() {
            Ok(mut message) => write(&mut *message),
            // A message is formatted while formatting another one
            Err(_) => write(&mut String::new()),
        });
        if cached.is_err() {
            write(&mut String::new());
        }
    }

    pub fn flush(&self) {
        self.with_state(LoggerState::flush);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[macro_export]
macro_rules! log {
    ($category:expr, $level:expr, $($arg:tt)+) => {
        if let Some(logger) = $crate::get_logger() {
            logger.log_fmt($category, $level, $crate::log_location!(), format_args!($($arg)+));
        }
    };
}

#[macro_export]
macro_rules! log_severe {
    ($category:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Severe, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($category:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_verbose {
    ($category:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Verbose, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)+) => {
        $crate::log!($category, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer sharing its output so the test can inspect it after handing the writer to the logger
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    const CAT: LogCategory = LogCategory::new_with_sub("Test", "Logger");

    fn quiet_logger() -> (Logger, SharedBuffer) {
        let logger = Logger::new();
        logger.set_log_to_console(false);
        let buffer = SharedBuffer::default();
        assert!(logger.add_writer(Box::new(buffer.clone())).is_ok());
        (logger, buffer)
    }

    #[test]
    fn category_display() {
        assert_eq!(LogCategory::new("Main").to_string(), "Main");
        assert_eq!(CAT.to_string(), "Test(Logger)");
    }

    #[test]
    fn level_parse() {
        assert_eq!(LogLevel::parse("Info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn messages_are_cached_until_flush() {
        let (logger, buffer) = quiet_logger();
        logger.log(CAT, LogLevel::Info, log_location!(), "hello");
        assert!(buffer.contents().is_empty());

        logger.flush();
        let out = buffer.contents();
        assert!(out.contains("[Test(Logger)]"));
        assert!(out.ends_with("hello\n"));
    }

    #[test]
    fn always_flush() {
        let (logger, buffer) = quiet_logger();
        logger.set_always_flush(true);
        logger.log_fmt(CAT, LogLevel::Warning, log_location!(), format_args!("value is {}", 42));
        assert!(buffer.contents().contains("value is 42"));
    }

    #[test]
    fn max_level_filters() {
        let (logger, buffer) = quiet_logger();
        logger.set_max_level(LogLevel::Warning);
        assert!(logger.is_enabled(LogLevel::Error));
        assert!(!logger.is_enabled(LogLevel::Verbose));

        logger.log(CAT, LogLevel::Debug, log_location!(), "dropped");
        logger.log(CAT, LogLevel::Error, log_location!(), "kept");
        logger.flush();

        let out = buffer.contents();
        assert!(!out.contains("dropped"));
        assert!(out.contains("kept"));
    }

    #[test]
    fn error_messages_carry_location() {
        let (logger, buffer) = quiet_logger();
        logger.log(CAT, LogLevel::Error, log_location!(), "with location");
        logger.flush();
        assert!(buffer.contents().contains(file!()));
    }

    #[test]
    fn writer_slots() {
        let logger = Logger::new();
        logger.set_log_to_console(false);
        for _ in 0..LoggerState::MAX_WRITERS {
            assert!(logger.add_writer(Box::new(io::sink())).is_ok());
        }
        assert!(logger.add_writer(Box::new(io::sink())).is_err());

        assert!(logger.remove_writer(3).is_some());
        assert!(logger.remove_writer(3).is_none());
        assert!(logger.remove_writer(LoggerState::MAX_WRITERS).is_none());
        assert_eq!(logger.add_writer(Box::new(io::sink())).ok(), Some(3));
    }

    /// Logs to its logger while being formatted
    struct LogsWhileFormatting(Arc<Logger>);

    impl Display for LogsWhileFormatting {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            self.0.log(CAT, LogLevel::Info, log_location!(), "inner");
            f.write_str("outer")
        }
    }

    #[test]
    fn formatting_may_log() {
        let (logger, buffer) = quiet_logger();
        let logger = Arc::new(logger);

        let (sender, receiver) = std::sync::mpsc::channel();
        let nested = LogsWhileFormatting(logger.clone());
        std::thread::spawn(move || {
            nested.0.log_fmt(CAT, LogLevel::Info, log_location!(), format_args!("{nested}"));
            _ = sender.send(());
        });
        assert!(receiver.recv_timeout(std::time::Duration::from_secs(5)).is_ok(), "logging from a formatter blocked");

        logger.flush();
        let out = buffer.contents();
        let inner = out.find("inner").unwrap();
        let outer = out.find("outer").unwrap();
        assert!(inner < outer);
    }

    /// Writer that logs to the logger it is attached to
    struct LoggingWriter(&'static Logger);

    impl Write for LoggingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.log(CAT, LogLevel::Error, log_location!(), "from writer");
            self.0.flush();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writers_cannot_reenter() {
        static LOGGER: Logger = Logger::new();
        LOGGER.set_log_to_console(false);
        let buffer = SharedBuffer::default();
        assert!(LOGGER.add_writer(Box::new(buffer.clone())).is_ok());
        assert!(LOGGER.add_writer(Box::new(LoggingWriter(&LOGGER))).is_ok());

        let (sender, receiver) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            LOGGER.log(CAT, LogLevel::Info, log_location!(), "message");
            LOGGER.flush();
            _ = sender.send(());
        });
        assert!(receiver.recv_timeout(std::time::Duration::from_secs(5)).is_ok(), "writer blocked the logger");

        let out = buffer.contents();
        assert!(out.contains("message"));
        assert!(!out.contains("from writer"));
    }

    #[test]
    fn global_logger() {
        static GLOBAL: Logger = Logger::new();
        GLOBAL.set_log_to_console(false);
        GLOBAL.set_always_flush(true);
        let buffer = SharedBuffer::default();
        assert!(GLOBAL.add_writer(Box::new(buffer.clone())).is_ok());

        set_logger(&GLOBAL);
        log_info!(CAT, "through the macro: {}", 7);
        let previous = reset_logger();
        log_info!(CAT, "not logged");

        assert!(previous.is_some());
        let out = buffer.contents();
        assert!(out.contains("through the macro: 7"));
        assert!(!out.contains("not logged"));
    }
}
