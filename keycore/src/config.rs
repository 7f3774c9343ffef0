use crate::{
    curve::CurveOption,
    error::{ConfigError, Error},
    private::{EcPrivateKey, RsaPrivateKey},
};
use serde::{Deserialize, Serialize};

/// Smallest RSA modulus a configuration may ask for. Key generation itself goes lower for tests.
pub const MIN_CONFIG_RSA_BITS: usize = 2048;

/// Key generation parameters.
///
/// Signing options are not configurable, they are passed with every call.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct KeyConfig {
    pub curve: CurveOption,
    pub rsa_bits: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            curve: CurveOption::P256,
            rsa_bits: MIN_CONFIG_RSA_BITS,
        }
    }
}

impl KeyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsa_bits < MIN_CONFIG_RSA_BITS {
            return Err(ConfigError::RsaBitsTooSmall {
                bits: self.rsa_bits,
                min: MIN_CONFIG_RSA_BITS,
            });
        }
        if self.rsa_bits % 8 != 0 {
            return Err(ConfigError::RsaBitsNotByteAligned(self.rsa_bits));
        }
        Ok(())
    }

    /// Fresh EC key on the configured curve.
    pub fn generate_ec(&self) -> Result<EcPrivateKey, Error> {
        Ok(EcPrivateKey::generate(self.curve)?)
    }

    /// Fresh RSA key of the configured size, after validating the configuration.
    pub fn generate_rsa(&self) -> Result<RsaPrivateKey, Error> {
        self.validate()?;
        Ok(RsaPrivateKey::generate(self.rsa_bits)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config: KeyConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, KeyConfig::default());
        assert_eq!(config.curve, CurveOption::P256);
        assert_eq!(config.rsa_bits, 2048);
        config.validate().unwrap();
    }

    #[test]
    fn camel_case_and_aliases() {
        let config: KeyConfig = serde_json::from_value(json!({ "curve": "secp384r1", "rsaBits": 3072 })).unwrap();
        assert_eq!(
            config,
            KeyConfig {
                curve: CurveOption::P384,
                rsa_bits: 3072
            }
        );
        assert_eq!(
            serde_json::to_value(config).unwrap(),
            json!({ "curve": "P-384", "rsaBits": 3072 })
        );
    }

    #[test]
    fn rejects_unknown_fields_and_curves() {
        assert!(serde_json::from_value::<KeyConfig>(json!({ "rsa_bits": 2048 })).is_err());
        assert!(serde_json::from_value::<KeyConfig>(json!({ "curve": "P-224" })).is_err());
    }

    #[test]
    fn validation() {
        let small = KeyConfig {
            rsa_bits: 1024,
            ..KeyConfig::default()
        };
        assert_eq!(
            small.validate().unwrap_err(),
            ConfigError::RsaBitsTooSmall { bits: 1024, min: 2048 }
        );
        let odd = KeyConfig {
            rsa_bits: 2049,
            ..KeyConfig::default()
        };
        assert_eq!(odd.validate().unwrap_err(), ConfigError::RsaBitsNotByteAligned(2049));
        assert_eq!(
            small.generate_rsa().unwrap_err(),
            Error::Config(ConfigError::RsaBitsTooSmall { bits: 1024, min: 2048 })
        );
    }

    #[test]
    fn generates_on_configured_curve() {
        let config = KeyConfig {
            curve: CurveOption::P521,
            ..KeyConfig::default()
        };
        assert_eq!(config.generate_ec().unwrap().curve(), CurveOption::P521);
    }
}
