use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionInputError {
    /// The raw input was a primitive (number, string, boolean) rather than an
    /// object or null.
    #[error("GeoPosition: position must be an object, received {received}")]
    NotAnObject { received: &'static str },
}
