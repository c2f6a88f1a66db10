//! Feedback sensor trait

use alloc::boxed::Box;

/// Trait for output voltage feedback
///
/// The sensor is told what the output is being driven to and can be
/// sampled independently, typically by the UI on its own timer. Real
/// sensors may ignore `track`; simulated ones use it as their goal.
pub trait FeedbackSensor {
    /// Update the voltage the output is expected to settle at
    fn track(&mut self, target: f32);

    /// Sample the current output voltage
    ///
    /// Takes `&mut self` because sampling may advance internal dynamics.
    fn read(&mut self) -> f32;
}

impl<T: FeedbackSensor + ?Sized> FeedbackSensor for &mut T {
    fn track(&mut self, target: f32) {
        (**self).track(target)
    }

    fn read(&mut self) -> f32 {
        (**self).read()
    }
}

impl<T: FeedbackSensor + ?Sized> FeedbackSensor for Box<T> {
    fn track(&mut self, target: f32) {
        (**self).track(target)
    }

    fn read(&mut self) -> f32 {
        (**self).read()
    }
}
