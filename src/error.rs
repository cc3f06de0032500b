use thiserror::Error as ThisError;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported when configuring a [`ScapegoatTree`](crate::ScapegoatTree).
#[derive(Clone, Copy, Debug, PartialEq, ThisError)]
pub enum Error {
    /// The balance factor was outside the open interval (0.5, 1), or NaN.
    #[error("alpha {0} is not within the open interval (0.5, 1)")]
    InvalidAlpha(f64),
}
