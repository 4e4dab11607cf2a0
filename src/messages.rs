//! Wire protocol between the panel and the device.
//!
//! One JSON object per WebSocket text frame, discriminated by `command`.
//!
//! **Outgoing (panel → device):**
//! - `configurePin` - full configuration of one pin
//! - `setPinState` - drive a GPIO output `{"pinId": "IO5", "value": 1}`
//! - `resetPins` - release every pin
//!
//! **Incoming (device → panel):**
//! - `updateValue` - observed value `{"pinId": "IO34", "value": 1873}`
//!
//! # Example
//!
//! ```
//! use gpio_panel::messages::{parse_notification, DeviceCommand};
//!
//! let json = DeviceCommand::set_pin_state("IO5", 1).to_json();
//! assert_eq!(json, r#"{"command":"setPinState","pinId":"IO5","value":1}"#);
//!
//! let note = parse_notification(r#"{"command":"updateValue","pinId":"IO5","value":1}"#).unwrap();
//! assert_eq!(note.pin_id, "IO5");
//! assert_eq!(note.value, 1.0);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::store::{FunctionSettings, GpioDirection, PinConfiguration};

/// Discriminator of the only inbound command.
pub const UPDATE_VALUE: &str = "updateValue";

// ============================================================================
// Outgoing
// ============================================================================

/// Command sent to the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum DeviceCommand {
    /// Bind a pin to a function.
    ConfigurePin(ConfigurePin),
    /// Drive a GPIO output high or low.
    SetPinState {
        /// Target pin
        #[serde(rename = "pinId")]
        pin_id: String,
        /// 0 (LOW) or 1 (HIGH)
        value: u8,
    },
    /// Release every configured pin.
    ResetPins,
}

/// Payload of a `configurePin` command.
///
/// Kind-specific fields are omitted when they do not apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePin {
    /// Target pin
    pub pin_id: String,
    /// Chosen candidate label
    pub function: String,
    /// GPIO direction, `"Input"` or `"Output"`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub direction: Option<GpioDirection>,
    /// GPIO display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Initial GPIO output level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
    /// PWM frequency in Hz
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<u32>,
    /// PWM duty cycle in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty: Option<u8>,
    /// PWM phase in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<i32>,
    /// ADC sensor label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
    /// ADC channel, e.g. `ADC1-6`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adc_channel: Option<String>,
}

impl From<&PinConfiguration> for ConfigurePin {
    fn from(config: &PinConfiguration) -> Self {
        let mut msg = ConfigurePin {
            pin_id: config.pin_id.to_string(),
            function: config.function.to_string(),
            direction: None,
            function_name: None,
            value: None,
            freq: None,
            duty: None,
            phase: None,
            sensor_type: None,
            adc_channel: None,
        };
        match &config.settings {
            FunctionSettings::Gpio(gpio) => {
                msg.direction = Some(gpio.direction);
                msg.function_name = Some(gpio.function_label.to_string());
                msg.value = gpio.current_value;
            }
            FunctionSettings::Pwm(pwm) => {
                msg.freq = Some(pwm.frequency_hz);
                msg.duty = Some(pwm.duty_percent);
                msg.phase = Some(pwm.phase_degrees);
            }
            FunctionSettings::Adc(adc) => {
                msg.sensor_type = Some(adc.sensor_type.clone());
                msg.adc_channel = Some(adc.channel_id.clone());
            }
        }
        msg
    }
}

impl DeviceCommand {
    /// `configurePin` for a stored configuration.
    pub fn configure(config: &PinConfiguration) -> Self {
        Self::ConfigurePin(config.into())
    }

    /// `setPinState` for a pin.
    pub fn set_pin_state(pin_id: &str, value: u8) -> Self {
        Self::SetPinState {
            pin_id: pin_id.to_string(),
            value,
        }
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigurePin(_) => "configurePin",
            Self::SetPinState { .. } => "setPinState",
            Self::ResetPins => "resetPins",
        }
    }

    /// Serialize to a single JSON text frame.
    pub fn to_json(&self) -> String {
        // Only strings and integers: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ============================================================================
// Incoming
// ============================================================================

/// Value update reported by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNotification {
    /// Pin the value belongs to
    pub pin_id: String,
    /// 0/1 for digital pins, raw sample for ADC pins
    pub value: f64,
}

impl DeviceNotification {
    /// Create a notification.
    pub fn new(pin_id: impl Into<String>, value: f64) -> Self {
        Self {
            pin_id: pin_id.into(),
            value,
        }
    }
}

/// Parse one inbound frame.
///
/// Returns an error for invalid JSON, frames without a `command`, commands
/// other than `updateValue`, and `updateValue` frames with bad fields.
pub fn parse_notification(frame: &str) -> Result<DeviceNotification, ProtocolError> {
    let value: Value =
        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let command = value
        .get("command")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingCommand)?;

    if command != UPDATE_VALUE {
        return Err(ProtocolError::UnknownCommand(command.to_string()));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
        command: UPDATE_VALUE.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AdcSettings, GpioSettings, PwmSettings};
    use crate::FunctionKind;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn reset_pins_shape() {
        assert_eq!(DeviceCommand::ResetPins.to_json(), r#"{"command":"resetPins"}"#);
    }

    #[test]
    fn configure_gpio_output() {
        let config = PinConfiguration {
            pin_id: "IO5",
            function: "GPIO5",
            settings: FunctionSettings::Gpio(GpioSettings {
                direction: GpioDirection::Output,
                function_label: "GPIO5",
                current_value: Some(0),
            }),
        };
        let json = parse(&DeviceCommand::configure(&config).to_json());
        assert_eq!(json["command"], "configurePin");
        assert_eq!(json["pinId"], "IO5");
        assert_eq!(json["function"], "GPIO5");
        assert_eq!(json["type"], "Output");
        assert_eq!(json["functionName"], "GPIO5");
        assert_eq!(json["value"], 0);
        assert!(json.get("freq").is_none());
        assert!(json.get("sensorType").is_none());
    }

    #[test]
    fn configure_gpio_input_has_no_value() {
        let config = PinConfiguration {
            pin_id: "IO34",
            function: "GPIO34",
            settings: FunctionSettings::Gpio(GpioSettings {
                direction: GpioDirection::Input,
                function_label: "GPIO34",
                current_value: None,
            }),
        };
        let json = parse(&DeviceCommand::configure(&config).to_json());
        assert_eq!(json["type"], "Input");
        assert!(json.get("value").is_none());
    }

    #[test]
    fn configure_pwm() {
        let config = PinConfiguration {
            pin_id: "IO2",
            function: "PWM",
            settings: FunctionSettings::Pwm(PwmSettings {
                frequency_hz: 1000,
                duty_percent: 70,
                phase_degrees: 90,
            }),
        };
        assert_eq!(config.kind(), FunctionKind::Pwm);
        let json = parse(&DeviceCommand::configure(&config).to_json());
        assert_eq!(json["freq"], 1000);
        assert_eq!(json["duty"], 70);
        assert_eq!(json["phase"], 90);
        assert!(json.get("type").is_none());
    }

    #[test]
    fn configure_adc() {
        let config = PinConfiguration {
            pin_id: "IO34",
            function: "ADC1-6",
            settings: FunctionSettings::Adc(AdcSettings {
                sensor_type: "Potentiometer".into(),
                channel_id: "ADC1-6".into(),
                last_sampled_value: 0.0,
            }),
        };
        let json = parse(&DeviceCommand::configure(&config).to_json());
        assert_eq!(json["sensorType"], "Potentiometer");
        assert_eq!(json["adcChannel"], "ADC1-6");
    }

    #[test]
    fn command_names() {
        assert_eq!(DeviceCommand::ResetPins.name(), "resetPins");
        assert_eq!(DeviceCommand::set_pin_state("IO2", 0).name(), "setPinState");
    }

    #[test]
    fn parse_update_value() {
        let note = parse_notification(r#"{"command":"updateValue","pinId":"IO34","value":1873.5}"#)
            .unwrap();
        assert_eq!(note, DeviceNotification::new("IO34", 1873.5));
    }

    #[test]
    fn parse_invalid_json() {
        assert!(matches!(
            parse_notification("{not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn parse_missing_command() {
        assert_eq!(
            parse_notification(r#"{"pinId":"IO5","value":1}"#),
            Err(ProtocolError::MissingCommand)
        );
        assert_eq!(parse_notification("[1,2]"), Err(ProtocolError::MissingCommand));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            parse_notification(r#"{"command":"reboot"}"#),
            Err(ProtocolError::UnknownCommand("reboot".into()))
        );
    }

    #[test]
    fn parse_bad_payload() {
        let err = parse_notification(r#"{"command":"updateValue","pinId":"IO5","value":"high"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload { .. }));
    }
}
