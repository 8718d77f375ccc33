//! Configuración de la corrida.
//! Carga variables de entorno (.env incluido) una sola vez y las entrega como
//! un valor inmutable; nada se lee de globals después de `from_env`.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ledger_adapters::ConfirmationPolicy;
use ledger_core::constants::DEFAULT_POLL_INTERVAL_MS;
use ledger_core::DeployerConfig;
use ledger_persistence::config::ARTIFACT_DIR_VAR;
use ledger_persistence::init_dotenv;

use crate::errors::ConfigError;

pub const RPC_URL_VAR: &str = "LEDGER_RPC_URL";
pub const NETWORK_VAR: &str = "LEDGER_NETWORK";
pub const CONTRACT_NAME_VAR: &str = "LEDGER_CONTRACT_NAME";
pub const CONTRACT_ARTIFACT_VAR: &str = "LEDGER_CONTRACT_ARTIFACT";
pub const DEPLOY_TIMEOUT_VAR: &str = "LEDGER_DEPLOY_TIMEOUT_SECS";
pub const CONFIRM_TIMEOUT_VAR: &str = "LEDGER_CONFIRM_TIMEOUT_SECS";
pub const POLL_INTERVAL_VAR: &str = "LEDGER_POLL_INTERVAL_MS";
pub const FROM_ACCOUNT_VAR: &str = "LEDGER_FROM_ACCOUNT";
pub const COUNTERPARTY_VAR: &str = "LEDGER_COUNTERPARTY";

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_NETWORK: &str = "hardhat";
pub const DEFAULT_CONTRACT_NAME: &str = "MedicineLedger";
pub const DEFAULT_CONTRACT_ARTIFACT: &str = "artifacts/contracts/MedicineLedger.sol/MedicineLedger.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub rpc_url: String,
    /// Etiqueta del entorno; también nombra el directorio del descriptor.
    pub network: String,
    pub contract_name: String,
    pub contract_artifact: PathBuf,
    pub artifact_dir: PathBuf,
    pub deploy_timeout: Option<Duration>,
    pub confirm_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub from_account: Option<String>,
    pub counterparty: Option<String>,
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let text = |var: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(var) {
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(var)),
                Some(v) => Ok(v.trim().to_string()),
                None => Ok(default.to_string()),
            }
        };
        let optional = |var: &'static str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            match optional(var) {
                None => Ok(None),
                Some(v) => v.parse::<u64>().map(Some).map_err(|e| ConfigError::Invalid { var,
                                                                                          value: v.clone(),
                                                                                          reason: e.to_string() }),
            }
        };

        let poll_ms = number(POLL_INTERVAL_VAR)?.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_ms == 0 {
            return Err(ConfigError::Invalid { var: POLL_INTERVAL_VAR,
                                              value: "0".into(),
                                              reason: "poll interval must be positive".into() });
        }
        let timeout = |var: &'static str| -> Result<Option<Duration>, ConfigError> {
            match number(var)? {
                Some(0) => Err(ConfigError::Invalid { var,
                                                      value: "0".into(),
                                                      reason: "timeout must be positive; unset it to wait without limit".into() }),
                secs => Ok(secs.map(Duration::from_secs)),
            }
        };

        Ok(Self { rpc_url: text(RPC_URL_VAR, DEFAULT_RPC_URL)?,
                  network: text(NETWORK_VAR, DEFAULT_NETWORK)?,
                  contract_name: text(CONTRACT_NAME_VAR, DEFAULT_CONTRACT_NAME)?,
                  contract_artifact: PathBuf::from(text(CONTRACT_ARTIFACT_VAR, DEFAULT_CONTRACT_ARTIFACT)?),
                  artifact_dir: PathBuf::from(text(ARTIFACT_DIR_VAR, ".")?),
                  deploy_timeout: timeout(DEPLOY_TIMEOUT_VAR)?,
                  confirm_timeout: timeout(CONFIRM_TIMEOUT_VAR)?,
                  poll_interval: Duration::from_millis(poll_ms),
                  from_account: optional(FROM_ACCOUNT_VAR),
                  counterparty: optional(COUNTERPARTY_VAR) })
    }

    pub fn deployer_config(&self) -> DeployerConfig {
        DeployerConfig { poll_interval: self.poll_interval,
                         confirmation_timeout: self.deploy_timeout }
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy { poll_interval: self.poll_interval,
                             timeout: self.confirm_timeout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<HarnessConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        HarnessConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_target_local_hardhat() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(cfg.network, "hardhat");
        assert_eq!(cfg.contract_name, "MedicineLedger");
        assert_eq!(cfg.artifact_dir, PathBuf::from("."));
        assert_eq!(cfg.deploy_timeout, None);
        assert_eq!(cfg.confirm_timeout, None);
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.from_account, None);
        assert_eq!(cfg.deployer_config(), DeployerConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = from_pairs(&[(RPC_URL_VAR, "http://node:8545"),
                               (NETWORK_VAR, "localhost"),
                               (DEPLOY_TIMEOUT_VAR, "60"),
                               (CONFIRM_TIMEOUT_VAR, " 15 "),
                               (POLL_INTERVAL_VAR, "100"),
                               (COUNTERPARTY_VAR, "0x70997970c51812dc3a010c7d01b50e0d17dc79c8")]).unwrap();
        assert_eq!(cfg.rpc_url, "http://node:8545");
        assert_eq!(cfg.network, "localhost");
        assert_eq!(cfg.deployer_config().confirmation_timeout, Some(Duration::from_secs(60)));
        assert_eq!(cfg.confirmation_policy().timeout, Some(Duration::from_secs(15)));
        assert_eq!(cfg.confirmation_policy().poll_interval, Duration::from_millis(100));
        assert_eq!(cfg.counterparty.as_deref(), Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8"));
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = from_pairs(&[(DEPLOY_TIMEOUT_VAR, "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: DEPLOY_TIMEOUT_VAR, .. }));
        let err = from_pairs(&[(POLL_INTERVAL_VAR, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: POLL_INTERVAL_VAR, .. }));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let err = from_pairs(&[(DEPLOY_TIMEOUT_VAR, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: DEPLOY_TIMEOUT_VAR, .. }));
        let err = from_pairs(&[(CONFIRM_TIMEOUT_VAR, " 0 ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: CONFIRM_TIMEOUT_VAR, .. }));
        let cfg = from_pairs(&[(DEPLOY_TIMEOUT_VAR, "1"), (CONFIRM_TIMEOUT_VAR, "1")]).unwrap();
        assert_eq!(cfg.deploy_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn blank_required_value_is_rejected() {
        assert_eq!(from_pairs(&[(NETWORK_VAR, "  ")]).unwrap_err(), ConfigError::Empty(NETWORK_VAR));
    }

    #[test]
    fn blank_optional_value_means_unset() {
        let cfg = from_pairs(&[(FROM_ACCOUNT_VAR, "")]).unwrap();
        assert_eq!(cfg.from_account, None);
    }
}
