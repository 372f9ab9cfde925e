//! The closed [`BlockType`] enumeration and the [`BlockState`] tag.
//!
//! Block ids are ordered: everything at or above [`LIQUID_THRESHOLD`] flows,
//! everything at or above [`SOLID_THRESHOLD`] is impassable. Air is id 0 so
//! that freshly allocated chunk memory is empty space.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

/// Identifier stored in every chunk cell (1 byte).
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BlockType {
    #[default]
    Air = 0,
    Cloud = 1,
    Oil = 2,
    Water = 3,
    Sand = 4,
    Dirt = 5,
    Stone = 6,
    Metal = 7,
    Border = 8,
}

/// Lowest liquid-like block id.
pub const LIQUID_THRESHOLD: BlockType = BlockType::Oil;

/// Lowest solid block id. Also the upper (exclusive) bound for liquids.
pub const SOLID_THRESHOLD: BlockType = BlockType::Sand;

impl BlockType {
    /// Number of block types.
    pub const COUNT: usize = 9;

    /// Every block type in id order.
    pub const ALL: [BlockType; Self::COUNT] = [
        BlockType::Air,
        BlockType::Cloud,
        BlockType::Oil,
        BlockType::Water,
        BlockType::Sand,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Metal,
        BlockType::Border,
    ];

    /// Returns the raw id.
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the block type for a raw id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBlockType`] if `id` is not part of the
    /// enumeration.
    pub fn from_id(id: u8) -> Result<Self, CatalogError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(CatalogError::InvalidBlockType(id))
    }

    /// `true` for liquid-like blocks (`LIQUID_THRESHOLD <= id < SOLID_THRESHOLD`).
    pub const fn is_liquid(self) -> bool {
        self.id() >= LIQUID_THRESHOLD.id() && self.id() < SOLID_THRESHOLD.id()
    }

    /// `true` for impassable blocks (`id >= SOLID_THRESHOLD`).
    pub const fn is_solid(self) -> bool {
        self.id() >= SOLID_THRESHOLD.id()
    }

    /// `true` for empty space and gas-like blocks.
    pub const fn is_gas(self) -> bool {
        self.id() < LIQUID_THRESHOLD.id()
    }
}

impl TryFrom<u8> for BlockType {
    type Error = CatalogError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<BlockType> for u8 {
    fn from(block: BlockType) -> u8 {
        block.id()
    }
}

/// Secondary tag carried by a placed block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockState {
    #[default]
    None,
    /// Only legal on block types with a positive combustion probability.
    Burning,
}
