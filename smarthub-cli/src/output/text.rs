//! Text output formatting with colors.

use chrono::Local;
use smarthub_core::{AccountIdentity, ReadingKind, ReadingSet, ReadingSnapshot};
use smarthub_store::SensorView;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the readings from a one-shot fetch.
    pub fn format_readings(
        &self,
        identity: &AccountIdentity,
        readings: Option<&ReadingSet>,
    ) -> String {
        let mut lines = vec![self.bold(&identity.device_name())];

        match readings {
            Some(set) if !set.is_empty() => {
                for (kind, value) in set.iter() {
                    lines.push(self.format_line(kind, &self.format_value(kind, value)));
                }
            }
            _ => lines.push(self.dim("No data")),
        }

        lines.join("\n")
    }

    /// Formats one published snapshot.
    pub fn format_snapshot(&self, snapshot: &ReadingSnapshot, sensors: &[SensorView]) -> String {
        let time = snapshot.updated_at.with_timezone(&Local).format("%H:%M:%S");
        let status = if snapshot.last_update_success {
            self.green("ok")
        } else {
            self.red("failed")
        };

        let mut lines = vec![format!("{} {}", self.dim(&time.to_string()), status)];

        if let Some(error) = &snapshot.error {
            lines.push(format!("  {}", self.red(error)));
        }

        for sensor in sensors {
            let state = match sensor.value() {
                Some(value) => self.format_value(sensor.kind(), value),
                None if sensor.available() => self.dim("unknown"),
                None => self.dim("unavailable"),
            };
            lines.push(format!("  {}", self.format_line(sensor.kind(), &state)));
        }

        lines.join("\n")
    }

    /// Formats device information and the sensor table.
    pub fn format_sensors(&self, identity: &AccountIdentity) -> String {
        let mut lines = vec![
            self.bold(&identity.device_name()),
            format!("Manufacturer: {}", identity.manufacturer()),
            format!("Model:        {}", identity.model()),
            format!("Portal:       {}", self.cyan(&identity.configuration_url())),
            format!("Device id:    {}", identity.unique_id()),
            String::new(),
        ];

        for &kind in ReadingKind::all() {
            let d = kind.descriptor();
            lines.push(format!(
                "{:<15} {:<5} {:<10} {:<17} {}",
                d.name,
                d.unit,
                d.device_class.as_str(),
                d.state_class.as_str(),
                self.dim(&identity.sensor_unique_id(kind))
            ));
        }

        lines.join("\n")
    }

    /// Formats a value with its unit.
    pub fn format_value(&self, kind: ReadingKind, value: f64) -> String {
        let unit = kind.descriptor().unit;
        match kind {
            ReadingKind::Cost => format!("{value:.2} {unit}"),
            ReadingKind::Usage | ReadingKind::Demand => format!("{value} {unit}"),
        }
    }

    fn format_line(&self, kind: ReadingKind, state: &str) -> String {
        format!("{:<15} {}", format!("{}:", kind.descriptor().name), state)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
