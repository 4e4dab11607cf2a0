//! Static pin catalog for the ESP32 DevKit board.
//!
//! Every physical header pin is described once by a [`PinDescriptor`]. The
//! descriptor is built when the catalog is constructed and never changes
//! afterwards, so the candidate function list and the function kind of each
//! candidate label are computed exactly once.
//!
//! # Capability classes
//!
//! | Class | Pins | Meaning |
//! |-------|------|---------|
//! | `Excluded` | GND, 3V3, RST, 5V, VIN, OD | Power/system, never configurable |
//! | `InputOnly` | IO34, IO35, IO36, IO39 | GPIO direction forced to Input |
//! | `General` | everything else | Any function |
//!
//! # Example
//!
//! ```rust
//! use gpio_panel::catalog::{CapabilityClass, FunctionKind, PinCatalog};
//!
//! let catalog = PinCatalog::esp32_devkit();
//!
//! let pin = catalog.classify("IO34").unwrap();
//! assert_eq!(pin.capability, CapabilityClass::InputOnly);
//! assert!(!pin.supports_pwm);
//!
//! // TX0 has no GPIO label of its own and aliases IO1 for PWM
//! let tx0 = catalog.classify("TX0").unwrap();
//! assert_eq!(tx0.candidates[0].label, "GPIO");
//! assert_eq!(tx0.candidates.last().unwrap().kind, Some(FunctionKind::Pwm));
//! ```

use serde::Serialize;

use crate::error::PanelError;

/// Separator between function names in a pin's descriptive label.
pub const LABEL_SEPARATOR: &str = " / ";

/// Pins wired to power or system functions.
pub const EXCLUDED_PINS: &[&str] = &["GND", "3V3", "RST", "5V", "VIN", "OD"];

/// Pins whose pads have no output driver.
pub const INPUT_ONLY_PINS: &[&str] = &["IO34", "IO35", "IO36", "IO39"];

/// Pins routed to the LEDC PWM peripheral.
pub const PWM_PINS: &[&str] = &[
    "IO1", "IO2", "IO3", "IO4", "IO5", "IO12", "IO13", "IO14", "IO15", "IO16", "IO17", "IO18",
    "IO19", "IO21", "IO22", "IO23", "IO25", "IO26", "IO27", "IO32", "IO33",
];

/// UART0 header pins and the GPIO they alias for PWM eligibility.
const PWM_ALIASES: &[(&str, &str)] = &[("TX0", "IO1"), ("RX0", "IO3")];

/// ESP32 DevKit header, `(pin id, descriptive label)`, left column then right.
pub const ESP32_DEVKIT_PINS: &[(&str, &str)] = &[
    ("3V3", "3V3"),
    ("RST", "EN / RST"),
    ("IO36", "GPIO36 / ADC1-0 / SENSOR_VP"),
    ("IO39", "GPIO39 / ADC1-3 / SENSOR_VN"),
    ("IO34", "GPIO34 / ADC1-6"),
    ("IO35", "GPIO35 / ADC1-7"),
    ("IO32", "GPIO32 / ADC1-4 / TOUCH9 / XTAL_32K_P"),
    ("IO33", "GPIO33 / ADC1-5 / TOUCH8 / XTAL_32K_N"),
    ("IO25", "GPIO25 / ADC2-8 / DAC_1"),
    ("IO26", "GPIO26 / ADC2-9 / DAC_2"),
    ("IO27", "GPIO27 / ADC2-7 / TOUCH7"),
    ("IO14", "GPIO14 / ADC2-6 / TOUCH6 / HSPI_CLK"),
    ("IO12", "GPIO12 / ADC2-5 / TOUCH5 / HSPI_MISO"),
    ("GND", "GND"),
    ("IO13", "GPIO13 / ADC2-4 / TOUCH4 / HSPI_MOSI"),
    ("OD", "SD2 / SD3 / CMD"),
    ("5V", "5V"),
    ("VIN", "VIN"),
    ("IO23", "GPIO23 / VSPI_MOSI"),
    ("IO22", "GPIO22 / I2C_SCL / U0_RTS"),
    ("TX0", "U0_TXD / CLK_OUT3"),
    ("RX0", "U0_RXD / CLK_OUT2"),
    ("IO21", "GPIO21 / I2C_SDA"),
    ("IO19", "GPIO19 / VSPI_MISO / U0_CTS"),
    ("IO18", "GPIO18 / VSPI_CLK"),
    ("IO5", "GPIO5 / VSPI_CS0"),
    ("IO17", "GPIO17 / U2_TXD"),
    ("IO16", "GPIO16 / U2_RXD"),
    ("IO4", "GPIO4 / ADC2-0 / TOUCH0"),
    ("IO0", "GPIO0 / ADC2-1 / TOUCH1 / BOOT"),
    ("IO2", "GPIO2 / ADC2-2 / TOUCH2 / LED"),
    ("IO15", "GPIO15 / ADC2-3 / TOUCH3 / HSPI_CS0"),
];

/// Fixed hardware classification of a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityClass {
    /// Power or system pin.
    Excluded,
    /// GPIO usable as input only.
    InputOnly,
    /// General purpose.
    General,
}

/// Function kinds the panel can configure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionKind {
    /// Digital input/output.
    Gpio,
    /// Pulse-width modulation output.
    Pwm,
    /// Analog sampling input.
    Adc,
}

impl FunctionKind {
    /// Wire/display name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpio => "GPIO",
            Self::Pwm => "PWM",
            Self::Adc => "ADC",
        }
    }

    /// Parse a bare kind name (`"gpio"`, `"PWM"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "GPIO" => Some(Self::Gpio),
            "PWM" => Some(Self::Pwm),
            "ADC" => Some(Self::Adc),
            _ => None,
        }
    }

    /// Classify a single candidate label.
    ///
    /// Only whole-token shapes match, so labels such as `RADIO` or `HSPI_MISO`
    /// are never mistaken for a GPIO entry.
    pub fn classify_label(label: &str) -> Option<Self> {
        if label == "PWM" {
            return Some(Self::Pwm);
        }
        if parse_adc_channel(label).is_some_and(|ch| ch.len() == label.len()) {
            return Some(Self::Adc);
        }
        let digits = label
            .strip_prefix("GPIO")
            .or_else(|| label.strip_prefix("IO"))?;
        let numbered = digits.chars().all(|c| c.is_ascii_digit());
        if numbered && (label.starts_with("GPIO") || !digits.is_empty()) {
            Some(Self::Gpio)
        } else {
            None
        }
    }
}

/// One entry of a pin's candidate function list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateFunction {
    /// Display label, e.g. `GPIO25` or `ADC2-8`.
    pub label: &'static str,
    /// Configurable kind, `None` for peripheral-only labels like `TOUCH7`.
    pub kind: Option<FunctionKind>,
}

impl CandidateFunction {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            kind: FunctionKind::classify_label(label),
        }
    }
}

/// Immutable description of one physical pin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PinDescriptor {
    /// Stable pin id, e.g. `IO34`.
    pub id: &'static str,
    /// Descriptive label the candidates were parsed from.
    pub label: &'static str,
    /// Hardware classification.
    pub capability: CapabilityClass,
    /// Whether PWM is offered on this pin (directly or via alias).
    pub supports_pwm: bool,
    /// Ordered, deduplicated candidate functions. Empty for excluded pins.
    pub candidates: Vec<CandidateFunction>,
    /// ADC channel parsed from the label, e.g. `ADC1-6`.
    pub adc_channel: Option<String>,
}

impl PinDescriptor {
    /// Build a descriptor from a pin id and its descriptive label.
    pub fn new(id: &'static str, label: &'static str) -> Self {
        let capability = capability_of(id);
        let supports_pwm = capability != CapabilityClass::Excluded && pwm_capable(id);
        let candidates = if capability == CapabilityClass::Excluded {
            Vec::new()
        } else {
            candidate_functions(label, supports_pwm)
        };
        Self {
            id,
            label,
            capability,
            supports_pwm,
            candidates,
            adc_channel: parse_adc_channel(label).map(str::to_string),
        }
    }

    /// True for power/system pins.
    pub fn is_excluded(&self) -> bool {
        self.capability == CapabilityClass::Excluded
    }

    /// True for pins that cannot drive an output.
    pub fn is_input_only(&self) -> bool {
        self.capability == CapabilityClass::InputOnly
    }

    /// First candidate of the given kind.
    pub fn candidate_of_kind(&self, kind: FunctionKind) -> Option<&CandidateFunction> {
        self.candidates.iter().find(|c| c.kind == Some(kind))
    }

    /// Candidate labels in display order.
    pub fn candidate_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.candidates.iter().map(|c| c.label)
    }

    /// Candidate pre-selected when nothing is saved: the GPIO entry, else the first.
    pub fn default_candidate(&self) -> Option<&CandidateFunction> {
        self.candidate_of_kind(FunctionKind::Gpio)
            .or_else(|| self.candidates.first())
    }
}

/// Lookup table of every header pin.
#[derive(Clone, Debug)]
pub struct PinCatalog {
    pins: Vec<PinDescriptor>,
}

impl PinCatalog {
    /// Catalog for the ESP32 DevKit header.
    pub fn esp32_devkit() -> Self {
        Self::from_labels(ESP32_DEVKIT_PINS)
    }

    /// Build a catalog from `(pin id, label)` pairs using the ESP32 capability tables.
    pub fn from_labels(table: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            pins: table
                .iter()
                .map(|&(id, label)| PinDescriptor::new(id, label))
                .collect(),
        }
    }

    /// Look up a pin by id.
    pub fn classify(&self, pin_id: &str) -> Result<&PinDescriptor, PanelError> {
        self.pins
            .iter()
            .find(|p| p.id == pin_id)
            .ok_or_else(|| PanelError::UnknownPin(pin_id.to_string()))
    }

    /// Candidate functions of a pin, in display order.
    pub fn candidate_functions(&self, pin_id: &str) -> Result<&[CandidateFunction], PanelError> {
        self.classify(pin_id).map(|p| p.candidates.as_slice())
    }

    /// All pins in header order.
    pub fn iter(&self) -> impl Iterator<Item = &PinDescriptor> {
        self.pins.iter()
    }

    /// Number of pins in the catalog.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// True when the catalog has no pins.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl Default for PinCatalog {
    fn default() -> Self {
        Self::esp32_devkit()
    }
}

fn capability_of(id: &str) -> CapabilityClass {
    if EXCLUDED_PINS.contains(&id) {
        CapabilityClass::Excluded
    } else if INPUT_ONLY_PINS.contains(&id) {
        CapabilityClass::InputOnly
    } else {
        CapabilityClass::General
    }
}

fn pwm_capable(id: &str) -> bool {
    PWM_PINS.contains(&id)
        || PWM_ALIASES
            .iter()
            .any(|&(alias, gpio)| alias == id && PWM_PINS.contains(&gpio))
}

/// Build the candidate list for a label.
///
/// Exactly one GPIO-kind entry survives (the first, or a synthesized `GPIO`
/// placed in front), and `PWM` is present iff `supports_pwm`.
fn candidate_functions(label: &'static str, supports_pwm: bool) -> Vec<CandidateFunction> {
    let mut out: Vec<CandidateFunction> = Vec::new();
    let mut has_gpio = false;

    for part in label.split(LABEL_SEPARATOR).map(str::trim) {
        if part.is_empty() || out.iter().any(|c| c.label == part) {
            continue;
        }
        let candidate = CandidateFunction::new(part);
        match candidate.kind {
            Some(FunctionKind::Gpio) if has_gpio => continue,
            Some(FunctionKind::Gpio) => has_gpio = true,
            Some(FunctionKind::Pwm) if !supports_pwm => continue,
            _ => {}
        }
        out.push(candidate);
    }

    if supports_pwm && !out.iter().any(|c| c.kind == Some(FunctionKind::Pwm)) {
        out.push(CandidateFunction::new("PWM"));
    }
    if !has_gpio {
        out.insert(0, CandidateFunction::new("GPIO"));
    }
    out
}

/// Find the first `ADC<n>[-<m>]` token in a label.
pub fn parse_adc_channel(label: &str) -> Option<&str> {
    let bytes = label.as_bytes();
    let mut search = 0;
    while let Some(offset) = label[search..].find("ADC") {
        let start = search + offset;
        let mut end = start + 3;
        let unit_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > unit_start {
            if end + 1 < bytes.len() && bytes[end] == b'-' && bytes[end + 1].is_ascii_digit() {
                end += 1;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
            }
            return Some(&label[start..end]);
        }
        search = start + 3;
    }
    None
}
