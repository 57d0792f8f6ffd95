use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 4-byte magic value identifying protocol messages for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Magic(pub [u8; 4]);

impl Magic {
    /// Build from the big-endian integer form, so `0x24e92764`
    /// becomes the wire bytes `[0x24, 0xe9, 0x27, 0x64]`
    pub const fn from_u32(value: u32) -> Self {
        Magic(value.to_be_bytes())
    }

    /// Big-endian integer form, the inverse of `from_u32`
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Magic {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 4] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Magic(bytes))
    }
}
