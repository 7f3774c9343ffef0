use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The NIST prime curves keys can be generated on.
///
/// The variant fixes the field size, the group order N and the base point; the arithmetic
/// itself lives in the `p256`, `p384` and `p521` crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CurveOption {
    #[display(fmt = "P-256")]
    P256,
    #[display(fmt = "P-384")]
    P384,
    #[display(fmt = "P-521")]
    P521,
}

impl CurveOption {
    pub const ALL: [CurveOption; 3] = [CurveOption::P256, CurveOption::P384, CurveOption::P521];

    pub fn bit_size(self) -> usize {
        match self {
            CurveOption::P256 => 256,
            CurveOption::P384 => 384,
            CurveOption::P521 => 521,
        }
    }

    /// Length of a field element or private scalar in bytes, `ceil(bit_size / 8)`.
    pub fn field_len(self) -> usize {
        (self.bit_size() + 7) / 8
    }

    /// Length of an uncompressed SEC1 point: tag byte, X and Y.
    pub fn public_len(self) -> usize {
        1 + 2 * self.field_len()
    }

    /// Mask for the most significant scalar byte, clearing the bits above `bit_size`.
    pub(crate) fn top_byte_mask(self) -> u8 {
        0xff >> (self.field_len() * 8 - self.bit_size())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display(fmt = "unknown curve `{}`", _0)]
pub struct UnknownCurve(#[error(ignore)] String);

impl FromStr for CurveOption {
    type Err = UnknownCurve;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p-256" | "p256" | "secp256r1" | "prime256v1" => Ok(CurveOption::P256),
            "p-384" | "p384" | "secp384r1" => Ok(CurveOption::P384),
            "p-521" | "p521" | "secp521r1" => Ok(CurveOption::P521),
            _ => Err(UnknownCurve(s.to_owned())),
        }
    }
}

impl TryFrom<String> for CurveOption {
    type Error = UnknownCurve;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CurveOption> for String {
    fn from(curve: CurveOption) -> String {
        curve.to_string()
    }
}
