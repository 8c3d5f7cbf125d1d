//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements  | Connects to                    |
//! |----------------|-------------|--------------------------------|
//! | `config_file`  | ConfigPort  | JSON file on disk              |
//! | `json_lines`   | EventSink   | Any `io::Write` (stdout)       |
//! | `log_sink`     | EventSink   | Process logger                 |
//! | `time`         | Clock       | `Instant` / simulated time     |

pub mod config_file;
pub mod json_lines;
pub mod log_sink;
pub mod time;
