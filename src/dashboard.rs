//! Dashboard: a render-agnostic summary of active pin assignments.
//!
//! One [`DashboardEntry`] per configured pin, in first-save order. Re-saving
//! a pin replaces its entry in place, and a reset clears the board. The
//! [`Dashboard`] is kept current by feeding it [`StoreEvent`]s (see
//! [`ConfigStore::subscribe`](crate::store::ConfigStore::subscribe)).

use serde::Serialize;

use crate::store::{
    ConfigStore, FunctionSettings, GpioDirection, PinConfiguration, StoreEvent, VisualClass,
};

/// One card on the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEntry {
    /// Pin the card describes
    pub pin_id: &'static str,
    /// Card heading
    pub title: String,
    /// Body lines, in display order
    pub lines: Vec<String>,
    /// Visual class of the pin
    pub class: VisualClass,
}

impl From<&PinConfiguration> for DashboardEntry {
    fn from(config: &PinConfiguration) -> Self {
        let pin = config.pin_id;
        let (title, lines) = match &config.settings {
            FunctionSettings::Gpio(gpio) => {
                let state = match (gpio.direction, gpio.current_value) {
                    (GpioDirection::Output, Some(0) | None) => "LOW",
                    (GpioDirection::Output, Some(_)) => "HIGH",
                    (GpioDirection::Input, _) => "N/A",
                };
                (
                    format!("{pin} - {}", gpio.function_label),
                    vec![
                        format!("Type: {}", gpio.direction.as_str()),
                        format!("State: {state}"),
                    ],
                )
            }
            FunctionSettings::Pwm(pwm) => (
                format!("PWM - {pin}"),
                vec![
                    format!("Freq: {} Hz", pwm.frequency_hz),
                    format!("Duty: {} %", pwm.duty_percent),
                    format!("Phase: {} deg", pwm.phase_degrees),
                ],
            ),
            FunctionSettings::Adc(adc) => (
                format!("ADC - {pin}"),
                vec![
                    format!("Channel: {}", adc.channel_id),
                    format!("Type: {}", adc.sensor_type),
                    format!("Value: {}", adc.last_sampled_value),
                ],
            ),
        };
        Self {
            pin_id: pin,
            title,
            lines,
            class: config.visual_class(),
        }
    }
}

/// Live dashboard state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dashboard {
    entries: Vec<DashboardEntry>,
}

impl Dashboard {
    /// Empty dashboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dashboard reflecting the current contents of a store.
    pub fn from_store(store: &ConfigStore) -> Self {
        Self {
            entries: store.configurations().iter().map(DashboardEntry::from).collect(),
        }
    }

    /// Cards in first-save order.
    pub fn entries(&self) -> &[DashboardEntry] {
        &self.entries
    }

    /// Card for one pin.
    pub fn entry(&self, pin_id: &str) -> Option<&DashboardEntry> {
        self.entries.iter().find(|e| e.pin_id == pin_id)
    }

    fn upsert(&mut self, entry: DashboardEntry) {
        match self.entries.iter_mut().find(|e| e.pin_id == entry.pin_id) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    /// Fold one store event into the dashboard.
    ///
    /// A value update rebuilds the card of a pin already on the board.
    pub fn apply(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::Committed(config) => self.upsert(config.into()),
            StoreEvent::ValueUpdated { config, .. } => {
                if let Some(slot) = self.entries.iter_mut().find(|e| e.pin_id == config.pin_id) {
                    *slot = config.into();
                }
            }
            StoreEvent::Reset => self.entries.clear(),
        }
    }
}
