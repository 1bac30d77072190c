use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// A raw feature value computed for a single atom or bond, before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    /// A categorical level, one-hot encoded against a [`ValueDomain::Categories`] domain.
    Category(i64),
    /// A boolean, encoded as a single 0/1 column.
    Flag(bool),
    /// A numeric value, encoded as a single column.
    Scalar(f32),
}

impl FeatureValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Category(_) => "category",
            Self::Flag(_) => "flag",
            Self::Scalar(_) => "scalar",
        }
    }
}

/// The value domain of a feature, which fixes its encoded width.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueDomain {
    /// Ordered categorical levels; one column per level.
    Categories(Vec<i64>),
    /// A single 0/1 column.
    Flag,
    /// A single numeric column.
    Scalar,
}

impl ValueDomain {
    /// Convenience constructor for a contiguous integer range of levels (inclusive).
    pub fn range(first: i64, last: i64) -> Self {
        Self::Categories((first..=last).collect())
    }

    /// Number of columns this domain occupies in an encoded feature vector.
    pub fn width(&self) -> usize {
        match self {
            Self::Categories(levels) => levels.len(),
            Self::Flag | Self::Scalar => 1,
        }
    }

    /// Appends the encoding of `value` to `out`.
    ///
    /// # Errors
    ///
    /// Fails if the value kind does not match the domain, if a categorical value is not one of
    /// the domain's levels, or if a scalar is not finite. Nothing is appended on failure.
    pub fn encode(&self, value: FeatureValue, out: &mut Vec<f32>) -> Result<(), FeatureError> {
        match (self, value) {
            (Self::Categories(levels), FeatureValue::Category(v)) => {
                let position = levels.iter().position(|&level| level == v).ok_or_else(|| {
                    FeatureError::OutOfDomain {
                        value: v,
                        levels: levels.clone(),
                    }
                })?;
                out.extend((0..levels.len()).map(|i| if i == position { 1.0 } else { 0.0 }));
                Ok(())
            }
            (Self::Flag, FeatureValue::Flag(flag)) => {
                out.push(if flag { 1.0 } else { 0.0 });
                Ok(())
            }
            (Self::Scalar, FeatureValue::Scalar(x)) => {
                if !x.is_finite() {
                    return Err(FeatureError::NonFinite(x));
                }
                out.push(x);
                Ok(())
            }
            (domain, value) => Err(FeatureError::KindMismatch {
                domain: domain.to_string(),
                value: value.kind(),
            }),
        }
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categories(levels) => write!(f, "[{}]", levels.iter().join(", ")),
            Self::Flag => f.write_str("flag"),
            Self::Scalar => f.write_str("scalar"),
        }
    }
}

/// A failure to compute or encode a feature for one atom or bond.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Value {value} is not in the feature domain [{}]", .levels.iter().join(", "))]
    OutOfDomain { value: i64, levels: Vec<i64> },
    #[error("A {value} value cannot be encoded with a {domain} domain")]
    KindMismatch { domain: String, value: &'static str },
    #[error("Scalar feature value {0} is not finite")]
    NonFinite(f32),
    #[error("Unsupported input: {0}")]
    Unsupported(String),
}
