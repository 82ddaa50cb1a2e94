//! Top-level parameter structure for the supervisor executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::arbitration::ArbitrationParams;
use crate::launch_ctrl::LaunchParams;
use crate::motor_ctrl::MotorCtrlParams;
use crate::random_ctrl::RandomParams;
use hw_if::pca9685::HBridgeConfig;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// All parameters of the supervisor executable, loaded from
/// `params/sup_exec.toml`.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct SupExecParams {
    pub motor_ctrl: MotorCtrlParams,
    pub hbridge: HBridgeConfig,
    pub arbitration: ArbitrationParams,
    pub launch: LaunchParams,
    pub random: RandomParams,
}

impl Default for SupExecParams {
    fn default() -> Self {
        SupExecParams {
            motor_ctrl: MotorCtrlParams::default(),
            hbridge: HBridgeConfig::default(),
            arbitration: ArbitrationParams::default(),
            launch: LaunchParams::default(),
            random: RandomParams::default(),
        }
    }
}
