use crate::consts::altair::NUM_FLAG_INDICES;

/// The three Altair attestation-timeliness bits (`TIMELY_SOURCE`/`TARGET`/`HEAD`) a validator
/// earns for an epoch, packed into the single byte `{previous,current}_epoch_participation`
/// stores per validator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationFlags(u8);

impl ParticipationFlags {
    pub fn from_u8(byte: u8) -> Self {
        Self(byte)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn has_flag(&self, flag_index: usize) -> Result<bool, InvalidFlagIndex> {
        if flag_index >= NUM_FLAG_INDICES {
            return Err(InvalidFlagIndex(flag_index));
        }
        Ok(self.0 & (1 << flag_index) != 0)
    }

    pub fn add_flag(&mut self, flag_index: usize) -> Result<(), InvalidFlagIndex> {
        if flag_index >= NUM_FLAG_INDICES {
            return Err(InvalidFlagIndex(flag_index));
        }
        self.0 |= 1 << flag_index;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct InvalidFlagIndex(pub usize);
