//! Output formatting for CLI.

mod json;
mod text;

pub use json::{DeviceOutput, JsonFormatter, ReadingsOutput, SensorInfoOutput};
pub use text::TextFormatter;
