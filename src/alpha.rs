use crate::error::{Error, Result};

/// A validated weight-balance factor in the open interval (0.5, 1).
///
/// A subtree of size `n` may give at most `alpha * n` nodes to either child.
/// The height restatement of that bound is the *alpha-deep height*,
/// `floor(log_{1/alpha}(n))`, which is what insertion and verification use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Alpha {
    value: f64,
    // 1 / ln(1/alpha), so that `ln(n) * log_scale` is `log_{1/alpha}(n)`.
    log_scale: f64,
}

impl Alpha {
    pub(crate) const MIN_EXCLUSIVE: f64 = 0.5;
    pub(crate) const MAX_EXCLUSIVE: f64 = 1.0;

    pub(crate) fn new(value: f64) -> Result<Self> {
        // Written so that NaN fails both comparisons.
        if value > Self::MIN_EXCLUSIVE && value < Self::MAX_EXCLUSIVE {
            Ok(Self {
                value,
                log_scale: -1.0 / libm::log(value),
            })
        } else {
            Err(Error::InvalidAlpha(value))
        }
    }

    #[inline]
    pub(crate) const fn get(self) -> f64 {
        self.value
    }

    /// Returns `floor(log_{1/alpha}(size))`, the deepest level a node may sit
    /// at in an alpha-height-balanced tree of `size` nodes.
    ///
    /// Sizes 0 and 1 map to 0.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn deep_height(self, size: usize) -> usize {
        if size <= 1 {
            return 0;
        }
        libm::floor(libm::log(size as f64) * self.log_scale) as usize
    }

    /// True once `size` has shrunk to `alpha * max_size` or below, at which
    /// point the whole tree is rebuilt.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn has_shrunk(self, size: usize, max_size: usize) -> bool {
        size as f64 <= self.value * max_size as f64
    }

    /// True while `size >= alpha * max_size`. Holds after every completed
    /// operation because shrinking past it forces a rebuild.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn retains_weight(self, size: usize, max_size: usize) -> bool {
        size as f64 >= self.value * max_size as f64
    }
}
