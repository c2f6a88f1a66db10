//! Output actuator trait

use alloc::boxed::Box;

/// Trait for devices that drive the output voltage
///
/// Implementations position a servo, program a supply, or just record the
/// value. The runner calls this from its execution thread; nothing is
/// returned because the runner never acts on the outcome.
pub trait Actuator {
    /// Drive the output to `volts`
    fn set_voltage(&mut self, volts: f32);
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn set_voltage(&mut self, volts: f32) {
        (**self).set_voltage(volts)
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_voltage(&mut self, volts: f32) {
        (**self).set_voltage(volts)
    }
}
