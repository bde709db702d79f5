use eyre::{DefaultHandler, EyreHandler};
use std::{error::Error, fmt};

/// A custom context type for error reporting via `eyre`.
pub struct Handler {
    debug_handler: Option<Box<dyn EyreHandler>>,
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler {
    /// Create a new instance of the `Handler`.
    pub fn new() -> Self {
        Self { debug_handler: None }
    }

    /// Override the debug handler with a custom one.
    pub fn debug_handler(mut self, debug_handler: Option<Box<dyn EyreHandler>>) -> Self {
        self.debug_handler = debug_handler;
        self
    }
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&dedup_chain(error).join("; "))
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(debug_handler) = &self.debug_handler {
            return debug_handler.debug(error, f);
        }

        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }
        let errors = dedup_chain(error);
        let Some((error, sources)) = errors.split_first() else {
            return Ok(());
        };
        write!(f, "{error}")?;

        if !sources.is_empty() {
            write!(f, "\n\nContext:")?;

            let multiple = sources.len() > 1;
            for (n, error) in sources.iter().enumerate() {
                writeln!(f)?;
                if multiple {
                    write!(f, "- Error #{n}: {error}")?;
                } else {
                    write!(f, "- {error}")?;
                }
            }
        }

        Ok(())
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(debug_handler) = &mut self.debug_handler {
            debug_handler.track_caller(location);
        }
    }
}

/// Collects the messages of `error` and its sources, skipping messages that an outer error
/// already includes.
///
/// Transparent wrappers repeat their source's message, so a plain chain often prints the same
/// text twice.
pub fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut messages: Vec<String> = vec![];
    let mut cause = Some(error);
    while let Some(err) = cause {
        let message = err.to_string();
        if !message.is_empty() && !messages.iter().any(|outer| outer.contains(&message)) {
            messages.push(message);
        }
        cause = err.source();
    }
    messages
}

/// Installs the [`eyre`] hook as the global one.
///
/// # Details
///
/// By default a simple user-centric handler is installed, unless `AABRIDGE_DEBUG` is set in the
/// environment, in which case eyre's verbose default handler is used for debug output.
pub fn install() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        unsafe {
            std::env::set_var("RUST_BACKTRACE", "1");
        }
    }

    let debug = std::env::var_os("AABRIDGE_DEBUG").is_some();
    if let Err(e) = eyre::set_hook(Box::new(move |e| {
        Box::new(Handler::new().debug_handler(debug.then(|| DefaultHandler::default_with(e))))
    })) {
        debug!("failed to install eyre error hook: {e}");
    }
}
