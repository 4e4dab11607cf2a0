//! Configuration store: the single source of truth for pin assignments.
//!
//! The store maps pin ids to their current [`PinConfiguration`]. It validates
//! every configuration intent against the [`PinCatalog`] and is the only
//! place where the hardware rules are enforced:
//!
//! - excluded pins can never be edited or configured
//! - input-only pins are always stored with [`GpioDirection::Input`]
//! - missing or invalid PWM numbers fall back to fixed defaults
//!
//! # Write paths
//!
//! | Operation | Changes |
//! |-----------|---------|
//! | [`commit`](ConfigStore::commit) | Creates or replaces a whole entry |
//! | [`apply_device_update`](ConfigStore::apply_device_update) | Reported values only |
//! | [`reset`](ConfigStore::reset) | Removes every entry |
//!
//! # Example
//!
//! ```rust
//! use gpio_panel::store::{ConfigIntent, ConfigStore, GpioDirection};
//!
//! let mut store = ConfigStore::new();
//!
//! // IO34 has no output driver, the request is coerced to Input
//! let config = store
//!     .commit("IO34", "GPIO", ConfigIntent::gpio(GpioDirection::Output))
//!     .unwrap();
//! assert_eq!(config.direction(), Some(GpioDirection::Input));
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{CandidateFunction, FunctionKind, PinCatalog, PinDescriptor};
use crate::error::PanelError;

/// PWM frequency used when the intent has none or an invalid one.
pub const DEFAULT_FREQUENCY_HZ: u32 = 1000;
/// PWM duty used when the intent has none or an invalid one.
pub const DEFAULT_DUTY_PERCENT: u8 = 50;
/// PWM phase used when the intent has none or an invalid one.
pub const DEFAULT_PHASE_DEGREES: i32 = 0;
/// ADC sensor label used when the intent has none.
pub const DEFAULT_SENSOR_TYPE: &str = "Generic";
/// ADC channel reported when the pin label has no `ADC<n>` token.
pub const NO_ADC_CHANNEL: &str = "N/A";

// ============================================================================
// Configuration types
// ============================================================================

/// Direction of a GPIO pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpioDirection {
    /// Pin is read.
    #[default]
    Input,
    /// Pin is driven.
    Output,
}

impl GpioDirection {
    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
        }
    }
}

/// GPIO parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpioSettings {
    /// Effective direction (always Input on input-only pins).
    pub direction: GpioDirection,
    /// Display name of the chosen candidate.
    pub function_label: &'static str,
    /// Last known output level. `Some` only for outputs; starts at 0 (LOW).
    pub current_value: Option<u8>,
}

/// PWM parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PwmSettings {
    /// Frequency in Hz, always positive.
    pub frequency_hz: u32,
    /// Duty cycle, 0 to 100.
    pub duty_percent: u8,
    /// Phase offset in degrees.
    pub phase_degrees: i32,
}

/// ADC parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdcSettings {
    /// Display label of the attached sensor.
    pub sensor_type: String,
    /// Channel parsed from the pin label, or `N/A`.
    pub channel_id: String,
    /// Last value reported by the device.
    pub last_sampled_value: f64,
}

/// Kind-specific part of a configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum FunctionSettings {
    /// Digital I/O.
    Gpio(GpioSettings),
    /// Pulse-width modulation.
    Pwm(PwmSettings),
    /// Analog input.
    Adc(AdcSettings),
}

/// Saved configuration of one pin.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinConfiguration {
    /// Configured pin.
    pub pin_id: &'static str,
    /// Candidate label the pin is bound to.
    pub function: &'static str,
    /// Kind-specific parameters.
    pub settings: FunctionSettings,
}

impl PinConfiguration {
    /// Function kind of this configuration.
    pub fn kind(&self) -> FunctionKind {
        match self.settings {
            FunctionSettings::Gpio(_) => FunctionKind::Gpio,
            FunctionSettings::Pwm(_) => FunctionKind::Pwm,
            FunctionSettings::Adc(_) => FunctionKind::Adc,
        }
    }

    /// GPIO direction, `None` for PWM and ADC.
    pub fn direction(&self) -> Option<GpioDirection> {
        match &self.settings {
            FunctionSettings::Gpio(gpio) => Some(gpio.direction),
            _ => None,
        }
    }

    /// True for a GPIO configured as output.
    pub fn is_output(&self) -> bool {
        self.direction() == Some(GpioDirection::Output)
    }

    /// Visual class of the configured pin.
    pub fn visual_class(&self) -> VisualClass {
        match &self.settings {
            FunctionSettings::Gpio(gpio) if gpio.direction == GpioDirection::Output => {
                VisualClass::GpioOut
            }
            FunctionSettings::Gpio(_) => VisualClass::GpioIn,
            FunctionSettings::Pwm(_) => VisualClass::Pwm,
            FunctionSettings::Adc(_) => VisualClass::Adc,
        }
    }
}

/// Class used by front-ends to color a pin on the board diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VisualClass {
    /// Power or system pin.
    #[serde(rename = "excluded")]
    Excluded,
    /// No saved configuration.
    #[serde(rename = "neconfig")]
    Unconfigured,
    /// GPIO input.
    #[serde(rename = "gpioin")]
    GpioIn,
    /// GPIO output.
    #[serde(rename = "gpioout")]
    GpioOut,
    /// PWM output.
    #[serde(rename = "pwm")]
    Pwm,
    /// ADC input.
    #[serde(rename = "adc")]
    Adc,
}

// ============================================================================
// Intents
// ============================================================================

/// Raw numeric form field: a JSON number or free text.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// Integer value.
    Int(i64),
    /// Fractional value, truncated toward zero.
    Float(f64),
    /// Text as typed by the user.
    Text(String),
}

impl NumericInput {
    /// Integer value of the field.
    ///
    /// Text yields its leading integer (`"12abc"` is 12), or `None` if it
    /// does not start with one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => leading_int(s),
        }
    }
}

impl From<i64> for NumericInput {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate on absurdly long digit strings instead of failing.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// User's configuration intent for a pin, before validation.
///
/// Fields that do not apply to the chosen function are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigIntent {
    /// Requested GPIO direction (defaults to Input).
    #[serde(default, alias = "type")]
    pub direction: Option<GpioDirection>,
    /// PWM frequency in Hz.
    #[serde(default)]
    pub freq: Option<NumericInput>,
    /// PWM duty cycle in percent.
    #[serde(default)]
    pub duty: Option<NumericInput>,
    /// PWM phase in degrees.
    #[serde(default)]
    pub phase: Option<NumericInput>,
    /// ADC sensor label.
    #[serde(default)]
    pub sensor_type: Option<String>,
}

impl ConfigIntent {
    /// GPIO intent with a direction.
    pub fn gpio(direction: GpioDirection) -> Self {
        Self {
            direction: Some(direction),
            ..Default::default()
        }
    }

    /// ADC intent with a sensor label.
    pub fn adc(sensor_type: &str) -> Self {
        Self {
            sensor_type: Some(sensor_type.to_string()),
            ..Default::default()
        }
    }

    /// Set the PWM frequency field
    pub fn with_freq(mut self, freq: impl Into<NumericInput>) -> Self {
        self.freq = Some(freq.into());
        self
    }

    /// Set the PWM duty field
    pub fn with_duty(mut self, duty: impl Into<NumericInput>) -> Self {
        self.duty = Some(duty.into());
        self
    }

    /// Set the PWM phase field
    pub fn with_phase(mut self, phase: impl Into<NumericInput>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    fn pwm_settings(&self) -> PwmSettings {
        let field = |f: &Option<NumericInput>| f.as_ref().and_then(NumericInput::as_int);
        PwmSettings {
            frequency_hz: field(&self.freq)
                .filter(|hz| *hz > 0)
                .and_then(|hz| u32::try_from(hz).ok())
                .unwrap_or(DEFAULT_FREQUENCY_HZ),
            duty_percent: field(&self.duty)
                .map(|d| d.clamp(0, 100) as u8)
                .unwrap_or(DEFAULT_DUTY_PERCENT),
            phase_degrees: field(&self.phase)
                .map(|p| p.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
                .unwrap_or(DEFAULT_PHASE_DEGREES),
        }
    }

    fn sensor_label(&self) -> String {
        self.sensor_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SENSOR_TYPE)
            .to_string()
    }
}

// ============================================================================
// Edit sessions and events
// ============================================================================

/// Everything a front-end needs to open the configuration form of a pin.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    /// Pin being edited.
    pub pin_id: &'static str,
    /// Candidate functions in display order.
    pub candidates: Vec<CandidateFunction>,
    /// Candidate to pre-select.
    pub selected: &'static str,
    /// Direction to pre-select for GPIO.
    pub direction: GpioDirection,
    /// True when Output must not be offered.
    pub input_only: bool,
    /// Saved configuration, if any.
    pub saved: Option<PinConfiguration>,
}

/// Result of reconciling a device notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Stored value changed (or was re-confirmed).
    Applied,
    /// No configuration for that pin.
    UnknownPin,
    /// Pin is configured but its kind carries no reported value.
    NotApplicable,
}

/// Change notification delivered to store observers.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    /// A configuration was created or replaced.
    Committed(PinConfiguration),
    /// A device-reported value was applied.
    ValueUpdated {
        /// Stored value.
        value: f64,
        /// Configuration after the update.
        config: PinConfiguration,
    },
    /// All configurations were removed.
    Reset,
}

type Observer = Box<dyn FnMut(&StoreEvent) + Send>;

// ============================================================================
// Store
// ============================================================================

/// In-memory pin configuration store.
///
/// Entries are kept in first-save order; re-saving a pin replaces its entry
/// in place. The store is not thread-safe on its own, wrap it in a mutex (see
/// `SharedPanel` in the services module) when several tasks share it.
pub struct ConfigStore {
    catalog: PinCatalog,
    configs: Vec<PinConfiguration>,
    observers: Vec<Observer>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Empty store over the ESP32 DevKit catalog.
    pub fn new() -> Self {
        Self::with_catalog(PinCatalog::esp32_devkit())
    }

    /// Empty store over a custom catalog.
    pub fn with_catalog(catalog: PinCatalog) -> Self {
        Self {
            catalog,
            configs: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// The pin catalog.
    pub fn catalog(&self) -> &PinCatalog {
        &self.catalog
    }

    /// Register a change observer (e.g. a dashboard).
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: StoreEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    fn configurable(&self, pin_id: &str) -> Result<&PinDescriptor, PanelError> {
        let pin = self.catalog.classify(pin_id)?;
        if pin.is_excluded() {
            return Err(PanelError::ExcludedPin(pin.id));
        }
        Ok(pin)
    }

    /// Open a pin for editing.
    pub fn begin_edit(&self, pin_id: &str) -> Result<EditSession, PanelError> {
        let pin = self.configurable(pin_id)?;
        let saved = self.get(pin.id).cloned();

        let selected = saved
            .as_ref()
            .map(|c| c.function)
            .or_else(|| pin.default_candidate().map(|c| c.label))
            .unwrap_or("GPIO");
        let direction = saved
            .as_ref()
            .and_then(PinConfiguration::direction)
            .unwrap_or_default();

        Ok(EditSession {
            pin_id: pin.id,
            candidates: pin.candidates.clone(),
            selected,
            direction,
            input_only: pin.is_input_only(),
            saved,
        })
    }

    /// Validate an intent and save it as the pin's configuration.
    ///
    /// `function` is either one of the pin's candidate labels or a bare kind
    /// name (`GPIO`, `PWM`, `ADC`), which selects the pin's candidate of that
    /// kind. Any previous configuration of the pin is replaced.
    pub fn commit(
        &mut self,
        pin_id: &str,
        function: &str,
        intent: ConfigIntent,
    ) -> Result<PinConfiguration, PanelError> {
        let pin = self.configurable(pin_id)?;
        let requested = function.trim();

        let candidate = pin
            .candidates
            .iter()
            .find(|c| c.label == requested)
            .or_else(|| FunctionKind::from_name(requested).and_then(|k| pin.candidate_of_kind(k)))
            .ok_or_else(|| PanelError::InvalidFunction {
                pin: pin.id,
                label: requested.to_string(),
            })?;

        let kind = candidate.kind.ok_or_else(|| PanelError::UnsupportedFunction {
            pin: pin.id,
            label: candidate.label.to_string(),
        })?;

        let settings = match kind {
            FunctionKind::Gpio => {
                let direction = if pin.is_input_only() {
                    GpioDirection::Input
                } else {
                    intent.direction.unwrap_or_default()
                };
                FunctionSettings::Gpio(GpioSettings {
                    direction,
                    function_label: candidate.label,
                    current_value: (direction == GpioDirection::Output).then_some(0),
                })
            }
            FunctionKind::Pwm => FunctionSettings::Pwm(intent.pwm_settings()),
            FunctionKind::Adc => FunctionSettings::Adc(AdcSettings {
                sensor_type: intent.sensor_label(),
                channel_id: pin
                    .adc_channel
                    .clone()
                    .unwrap_or_else(|| NO_ADC_CHANNEL.to_string()),
                last_sampled_value: 0.0,
            }),
        };

        let config = PinConfiguration {
            pin_id: pin.id,
            function: candidate.label,
            settings,
        };

        match self.configs.iter_mut().find(|c| c.pin_id == config.pin_id) {
            Some(slot) => *slot = config.clone(),
            None => self.configs.push(config.clone()),
        }
        tracing::debug!("Saved {} as {} ({})", config.pin_id, config.function, kind.as_str());
        self.notify(StoreEvent::Committed(config.clone()));
        Ok(config)
    }

    /// Reconcile a value reported by the device.
    ///
    /// Only `current_value` (GPIO outputs) and `last_sampled_value` (ADC) are
    /// ever touched.
    pub fn apply_device_update(&mut self, pin_id: &str, observed: f64) -> UpdateOutcome {
        let Some(config) = self.configs.iter_mut().find(|c| c.pin_id == pin_id) else {
            tracing::debug!("Ignoring update for unconfigured pin {}", pin_id);
            return UpdateOutcome::UnknownPin;
        };
        if !observed.is_finite() {
            return UpdateOutcome::NotApplicable;
        }

        let stored = match &mut config.settings {
            FunctionSettings::Gpio(gpio) if gpio.direction == GpioDirection::Output => {
                let level = u8::from(observed != 0.0);
                gpio.current_value = Some(level);
                f64::from(level)
            }
            FunctionSettings::Adc(adc) => {
                adc.last_sampled_value = observed;
                observed
            }
            _ => return UpdateOutcome::NotApplicable,
        };

        let config = config.clone();
        self.notify(StoreEvent::ValueUpdated {
            value: stored,
            config,
        });
        UpdateOutcome::Applied
    }

    /// Remove every configuration.
    pub fn reset(&mut self) {
        self.configs.clear();
        self.notify(StoreEvent::Reset);
    }

    /// Saved configuration of a pin.
    pub fn get(&self, pin_id: &str) -> Option<&PinConfiguration> {
        self.configs.iter().find(|c| c.pin_id == pin_id)
    }

    /// All saved configurations in first-save order.
    pub fn configurations(&self) -> &[PinConfiguration] {
        &self.configs
    }

    /// Number of configured pins.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// True when no pin is configured.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Visual class of any catalog pin.
    pub fn visual_class(&self, pin_id: &str) -> Result<VisualClass, PanelError> {
        let pin = self.catalog.classify(pin_id)?;
        if pin.is_excluded() {
            return Ok(VisualClass::Excluded);
        }
        Ok(self
            .get(pin.id)
            .map(PinConfiguration::visual_class)
            .unwrap_or(VisualClass::Unconfigured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_begin_edit_excluded() {
        let store = ConfigStore::new();
        assert_eq!(store.begin_edit("GND"), Err(PanelError::ExcludedPin("GND")));
    }

    #[test]
    fn test_begin_edit_unknown() {
        let store = ConfigStore::new();
        assert!(matches!(
            store.begin_edit("IO77"),
            Err(PanelError::UnknownPin(_))
        ));
    }

    #[test]
    fn test_begin_edit_defaults() {
        let store = ConfigStore::new();
        let session = store.begin_edit("IO35").unwrap();
        assert_eq!(session.selected, "GPIO35");
        assert_eq!(session.direction, GpioDirection::Input);
        assert!(session.input_only);
        assert!(session.saved.is_none());
    }

    #[test]
    fn test_begin_edit_prefills_saved() {
        let mut store = ConfigStore::new();
        store
            .commit("IO5", "GPIO5", ConfigIntent::gpio(GpioDirection::Output))
            .unwrap();
        let session = store.begin_edit("IO5").unwrap();
        assert_eq!(session.selected, "GPIO5");
        assert_eq!(session.direction, GpioDirection::Output);
        assert!(!session.input_only);
        assert!(session.saved.is_some());
    }

    #[test]
    fn test_commit_invalid_function() {
        let mut store = ConfigStore::new();
        let err = store
            .commit("IO23", "ADC", ConfigIntent::default())
            .unwrap_err();
        assert_eq!(
            err,
            PanelError::InvalidFunction {
                pin: "IO23",
                label: "ADC".into()
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_commit_unsupported_function() {
        let mut store = ConfigStore::new();
        let err = store
            .commit("IO27", "TOUCH7", ConfigIntent::default())
            .unwrap_err();
        assert!(matches!(err, PanelError::UnsupportedFunction { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_commit_excluded() {
        let mut store = ConfigStore::new();
        assert_eq!(
            store.commit("3V3", "GPIO", ConfigIntent::default()),
            Err(PanelError::ExcludedPin("3V3"))
        );
    }

    #[test]
    fn test_commit_gpio_output_starts_low() {
        let mut store = ConfigStore::new();
        let config = store
            .commit("IO5", "GPIO", ConfigIntent::gpio(GpioDirection::Output))
            .unwrap();
        assert_eq!(config.function, "GPIO5");
        match config.settings {
            FunctionSettings::Gpio(gpio) => {
                assert_eq!(gpio.direction, GpioDirection::Output);
                assert_eq!(gpio.function_label, "GPIO5");
                assert_eq!(gpio.current_value, Some(0));
            }
            other => panic!("unexpected settings {other:?}"),
        }
    }

    #[test]
    fn test_commit_gpio_default_direction_is_input() {
        let mut store = ConfigStore::new();
        let config = store.commit("IO5", "GPIO5", ConfigIntent::default()).unwrap();
        assert_eq!(config.direction(), Some(GpioDirection::Input));
        assert_eq!(config.visual_class(), VisualClass::GpioIn);
    }

    #[test]
    fn test_commit_pwm_defaults() {
        let mut store = ConfigStore::new();
        let config = store.commit("IO2", "PWM", ConfigIntent::default()).unwrap();
        assert_eq!(
            config.settings,
            FunctionSettings::Pwm(PwmSettings {
                frequency_hz: 1000,
                duty_percent: 50,
                phase_degrees: 0,
            })
        );
    }

    #[test]
    fn test_commit_pwm_normalization() {
        let mut store = ConfigStore::new();
        let intent = ConfigIntent::default()
            .with_freq("0")
            .with_duty(150)
            .with_phase("-45deg");
        let config = store.commit("IO2", "PWM", intent).unwrap();
        assert_eq!(
            config.settings,
            FunctionSettings::Pwm(PwmSettings {
                frequency_hz: 1000,
                duty_percent: 100,
                phase_degrees: -45,
            })
        );

        let intent = ConfigIntent::default().with_freq("2500Hz").with_duty(0);
        let config = store.commit("IO2", "PWM", intent).unwrap();
        assert_eq!(
            config.settings,
            FunctionSettings::Pwm(PwmSettings {
                frequency_hz: 2500,
                duty_percent: 0,
                phase_degrees: 0,
            })
        );
    }

    #[test]
    fn test_commit_adc() {
        let mut store = ConfigStore::new();
        let config = store
            .commit("IO34", "ADC1-6", ConfigIntent::adc("Thermistor"))
            .unwrap();
        assert_eq!(
            config.settings,
            FunctionSettings::Adc(AdcSettings {
                sensor_type: "Thermistor".into(),
                channel_id: "ADC1-6".into(),
                last_sampled_value: 0.0,
            })
        );
    }

    #[test]
    fn test_commit_adc_blank_sensor() {
        let mut store = ConfigStore::new();
        let config = store.commit("IO32", "ADC", ConfigIntent::adc("  ")).unwrap();
        match config.settings {
            FunctionSettings::Adc(adc) => assert_eq!(adc.sensor_type, DEFAULT_SENSOR_TYPE),
            other => panic!("unexpected settings {other:?}"),
        }
    }

    #[test]
    fn test_commit_replaces_in_place() {
        let mut store = ConfigStore::new();
        store.commit("IO5", "GPIO", ConfigIntent::default()).unwrap();
        store.commit("IO2", "PWM", ConfigIntent::default()).unwrap();
        store.commit("IO5", "PWM", ConfigIntent::default()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.configurations()[0].pin_id, "IO5");
        assert_eq!(store.configurations()[0].kind(), FunctionKind::Pwm);
    }

    #[test]
    fn test_commit_twice_is_idempotent() {
        let mut store = ConfigStore::new();
        let intent = ConfigIntent::gpio(GpioDirection::Output);
        let first = store.commit("IO5", "GPIO5", intent.clone()).unwrap();
        store.apply_device_update("IO5", 1.0);
        let second = store.commit("IO5", "GPIO5", intent).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get("IO5"), Some(&first));
    }

    #[test]
    fn test_device_update_gpio_output() {
        let mut store = ConfigStore::new();
        store
            .commit("IO5", "GPIO", ConfigIntent::gpio(GpioDirection::Output))
            .unwrap();
        assert_eq!(store.apply_device_update("IO5", 1.0), UpdateOutcome::Applied);
        match &store.get("IO5").unwrap().settings {
            FunctionSettings::Gpio(gpio) => assert_eq!(gpio.current_value, Some(1)),
            other => panic!("unexpected settings {other:?}"),
        }
    }

    #[test]
    fn test_device_update_adc() {
        let mut store = ConfigStore::new();
        store.commit("IO34", "ADC", ConfigIntent::default()).unwrap();
        assert_eq!(store.apply_device_update("IO34", 2047.0), UpdateOutcome::Applied);
        match &store.get("IO34").unwrap().settings {
            FunctionSettings::Adc(adc) => assert_eq!(adc.last_sampled_value, 2047.0),
            other => panic!("unexpected settings {other:?}"),
        }
    }

    #[test]
    fn test_device_update_not_applicable() {
        let mut store = ConfigStore::new();
        store.commit("IO5", "GPIO", ConfigIntent::default()).unwrap();
        store.commit("IO2", "PWM", ConfigIntent::default()).unwrap();
        let before = store.configurations().to_vec();

        assert_eq!(store.apply_device_update("IO5", 1.0), UpdateOutcome::NotApplicable);
        assert_eq!(store.apply_device_update("IO2", 1.0), UpdateOutcome::NotApplicable);
        assert_eq!(store.apply_device_update("IO18", 1.0), UpdateOutcome::UnknownPin);
        assert_eq!(store.configurations(), before.as_slice());
    }

    #[test]
    fn test_device_update_rejects_nan() {
        let mut store = ConfigStore::new();
        store.commit("IO34", "ADC", ConfigIntent::default()).unwrap();
        assert_eq!(
            store.apply_device_update("IO34", f64::NAN),
            UpdateOutcome::NotApplicable
        );
    }

    #[test]
    fn test_reset() {
        let mut store = ConfigStore::new();
        store.commit("IO5", "GPIO", ConfigIntent::default()).unwrap();
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.visual_class("IO5"), Ok(VisualClass::Unconfigured));
        store.reset();
        assert!(store.is_empty());
    }

    #[test]
    fn test_visual_classes() {
        let mut store = ConfigStore::new();
        store
            .commit("IO5", "GPIO", ConfigIntent::gpio(GpioDirection::Output))
            .unwrap();
        store.commit("IO34", "ADC", ConfigIntent::default()).unwrap();
        assert_eq!(store.visual_class("GND"), Ok(VisualClass::Excluded));
        assert_eq!(store.visual_class("IO5"), Ok(VisualClass::GpioOut));
        assert_eq!(store.visual_class("IO34"), Ok(VisualClass::Adc));
        assert_eq!(store.visual_class("IO2"), Ok(VisualClass::Unconfigured));
    }

    #[test]
    fn test_observers_see_every_write() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut store = ConfigStore::new();
        store.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        store
            .commit("IO5", "GPIO", ConfigIntent::gpio(GpioDirection::Output))
            .unwrap();
        store.apply_device_update("IO5", 1.0);
        store.apply_device_update("IO6", 1.0);
        store.reset();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StoreEvent::Committed(_)));
        match &events[1] {
            StoreEvent::ValueUpdated { value, config } => {
                assert_eq!(*value, 1.0);
                assert_eq!(config.pin_id, "IO5");
                assert!(matches!(
                    &config.settings,
                    FunctionSettings::Gpio(gpio) if gpio.current_value == Some(1)
                ));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(events[2], StoreEvent::Reset);
    }

    #[test]
    fn test_numeric_input_parsing() {
        assert_eq!(NumericInput::from("abc").as_int(), None);
        assert_eq!(NumericInput::from("").as_int(), None);
        assert_eq!(NumericInput::from("  42 ").as_int(), Some(42));
        assert_eq!(NumericInput::from("-7x").as_int(), Some(-7));
        assert_eq!(NumericInput::from("+3").as_int(), Some(3));
        assert_eq!(NumericInput::Float(12.9).as_int(), Some(12));
        assert_eq!(NumericInput::Float(f64::INFINITY).as_int(), None);
    }

    #[test]
    fn test_intent_from_json() {
        let intent: ConfigIntent =
            serde_json::from_str(r#"{"type":"Output","freq":"abc","duty":70,"sensorType":"LDR"}"#)
                .unwrap();
        assert_eq!(intent.direction, Some(GpioDirection::Output));
        assert_eq!(intent.freq, Some(NumericInput::Text("abc".into())));
        assert_eq!(intent.duty, Some(NumericInput::Int(70)));
        assert_eq!(intent.sensor_type.as_deref(), Some("LDR"));
    }
}
