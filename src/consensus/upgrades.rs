//! Block major versions and their activation schedule

use std::fmt;
use thiserror::Error;

use crate::currency::Currency;

/// Rejected major version byte
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unknown block major version {0}")]
pub struct UnknownMajorVersion(pub u8);

/// Block major version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MajorVersion {
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
    V6 = 6,
}

impl MajorVersion {
    /// Every version, oldest first
    pub const ALL: [MajorVersion; 6] = [
        MajorVersion::V1,
        MajorVersion::V2,
        MajorVersion::V3,
        MajorVersion::V4,
        MajorVersion::V5,
        MajorVersion::V6,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MajorVersion {
    type Error = UnknownMajorVersion;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MajorVersion::V1),
            2 => Ok(MajorVersion::V2),
            3 => Ok(MajorVersion::V3),
            4 => Ok(MajorVersion::V4),
            5 => Ok(MajorVersion::V5),
            6 => Ok(MajorVersion::V6),
            other => Err(UnknownMajorVersion(other)),
        }
    }
}

impl From<MajorVersion> for u8 {
    fn from(version: MajorVersion) -> u8 {
        version.as_u8()
    }
}

impl fmt::Display for MajorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u8())
    }
}

impl Currency {
    /// Block size below which no reward penalty applies
    pub fn block_granted_full_reward_zone(&self, version: MajorVersion) -> u64 {
        let params = self.params();
        match version {
            MajorVersion::V1 => params.block_granted_full_reward_zone_v1,
            MajorVersion::V2 => params.block_granted_full_reward_zone_v2,
            MajorVersion::V3 | MajorVersion::V4 | MajorVersion::V5 | MajorVersion::V6 => {
                params.block_granted_full_reward_zone
            }
        }
    }

    /// Upgrade height of a version; v1 is in force from genesis.
    ///
    /// A version governs the blocks strictly above its upgrade height.
    pub fn upgrade_height(&self, version: MajorVersion) -> u32 {
        let params = self.params();
        match version {
            MajorVersion::V1 => 0,
            MajorVersion::V2 => params.upgrade_height_v2,
            MajorVersion::V3 => params.upgrade_height_v3,
            MajorVersion::V4 => params.upgrade_height_v4,
            MajorVersion::V5 => params.upgrade_height_v5,
            MajorVersion::V6 => params.upgrade_height_v6,
        }
    }

    /// Version expected for the block at `height`
    pub fn major_version_at(&self, height: u32) -> MajorVersion {
        MajorVersion::ALL[1..]
            .iter()
            .rev()
            .copied()
            .find(|version| height > self.upgrade_height(*version))
            .unwrap_or(MajorVersion::V1)
    }

    /// Blocks a coinbase output stays locked for
    pub fn mined_money_unlock_window(&self, height: u32) -> u32 {
        let params = self.params();
        if height >= params.mined_money_unlock_window_v2_height {
            params.mined_money_unlock_window_v2
        } else {
            params.mined_money_unlock_window
        }
    }

    pub fn emission_speed_factor(&self, height: u64) -> u32 {
        let params = self.params();
        if height >= params.emission_speed_factor_v2_height {
            params.emission_speed_factor_v2
        } else {
            params.emission_speed_factor
        }
    }
}
