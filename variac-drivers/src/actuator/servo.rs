//! Simulated variac servo
//!
//! Stands in for the servo that turns the variac knob. It applies each
//! setpoint instantly and keeps a short command history so callers can
//! check exactly what was sent.

use heapless::HistoryBuffer;
use tracing::debug;

use variac_core::traits::Actuator;

/// Number of recent setpoints kept
pub const HISTORY_LEN: usize = 64;

/// Simulated servo actuator
#[derive(Debug, Clone)]
pub struct SimulatedServo {
    /// Last applied setpoint (volts)
    position: f32,
    /// Total setpoints received
    commands: u32,
    /// Most recent setpoints, oldest first when iterated ordered
    history: HistoryBuffer<f32, HISTORY_LEN>,
}

impl Default for SimulatedServo {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedServo {
    pub fn new() -> Self {
        Self {
            position: 0.0,
            commands: 0,
            history: HistoryBuffer::new(),
        }
    }

    /// Current servo position expressed as output voltage
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Total number of setpoints received
    pub fn commands(&self) -> u32 {
        self.commands
    }

    /// Most recent setpoint, if any was received
    pub fn last_command(&self) -> Option<f32> {
        self.history.recent().copied()
    }

    /// Recent setpoints, oldest first
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.oldest_ordered().copied()
    }

    /// Count how many recent setpoints equal `volts`
    pub fn count_of(&self, volts: f32) -> usize {
        self.history().filter(|v| *v == volts).count()
    }
}

impl Actuator for SimulatedServo {
    fn set_voltage(&mut self, volts: f32) {
        debug!("Servo: setting voltage to {} V", volts);
        self.position = volts;
        self.commands = self.commands.saturating_add(1);
        self.history.write(volts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servo_creation() {
        let servo = SimulatedServo::new();
        assert_eq!(servo.position(), 0.0);
        assert_eq!(servo.commands(), 0);
        assert_eq!(servo.last_command(), None);
    }

    #[test]
    fn test_set_voltage_records_history() {
        let mut servo = SimulatedServo::new();
        servo.set_voltage(10.0);
        servo.set_voltage(20.0);
        servo.set_voltage(0.0);

        assert_eq!(servo.position(), 0.0);
        assert_eq!(servo.commands(), 3);
        assert_eq!(servo.last_command(), Some(0.0));

        let mut history = servo.history();
        assert_eq!(history.next(), Some(10.0));
        assert_eq!(history.next(), Some(20.0));
        assert_eq!(history.next(), Some(0.0));
        assert_eq!(history.next(), None);
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let mut servo = SimulatedServo::new();
        for i in 0..(HISTORY_LEN as u32 + 10) {
            servo.set_voltage(i as f32);
        }

        assert_eq!(servo.commands(), HISTORY_LEN as u32 + 10);
        assert_eq!(servo.history().count(), HISTORY_LEN);
        assert_eq!(servo.history().next(), Some(10.0));
        assert_eq!(servo.count_of(0.0), 0);
    }

    #[test]
    fn test_through_trait_object() {
        let mut servo = SimulatedServo::new();
        {
            let actuator: &mut dyn Actuator = &mut servo;
            actuator.set_voltage(5.5);
        }
        assert_eq!(servo.position(), 5.5);
    }
}
