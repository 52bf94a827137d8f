/// Describes driver objects which can be destroyed
///
/// Destroying twice must be a no-op: implementors give up their handle on the first call.
pub trait Destructible {
    /// Destroy the resource
    fn destroy(&mut self);
}
