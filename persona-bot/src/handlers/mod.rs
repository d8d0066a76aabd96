//! Chain handlers other than the command handler.

mod logging_handler;

pub use logging_handler::LoggingHandler;
