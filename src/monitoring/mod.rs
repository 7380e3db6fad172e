/*!
 * Monitoring
 * Structured tracing for the memory space shell
 */

mod tracer;

pub use tracer::{init_tracing, span_command, CommandSpan};
