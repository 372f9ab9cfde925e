//! Block catalog: maps every [`BlockType`] to its immutable [`BlockProperties`].
//!
//! The catalog is built once during startup and shared read-only (typically
//! behind an `Arc`) with every component that needs block properties. There is
//! no process-wide table; whoever needs the catalog is handed one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::{BlockState, BlockType};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Full descriptor for a block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockProperties {
    /// The block type these properties describe.
    pub block: BlockType,
    /// Human-readable name (e.g. "sand", "water").
    pub name: String,
    /// Base display color, RGBA8.
    pub color: [u8; 4],
    /// Upper bound for per-instance color jitter, as a fraction of each channel.
    pub max_color_shift: f32,
    /// Chance per simulation step that a burning neighbor ignites this block.
    pub combustion_probability: f32,
    /// What the block turns into once it has burnt out.
    pub burns_into: Option<BlockType>,
}

impl BlockProperties {
    /// Non-combustible block with the given look.
    pub fn inert(block: BlockType, name: &str, color: [u8; 4], max_color_shift: f32) -> Self {
        Self {
            block,
            name: name.to_string(),
            color,
            max_color_shift,
            combustion_probability: 0.0,
            burns_into: None,
        }
    }

    /// Makes the block combustible.
    pub fn combustible(mut self, probability: f32, burns_into: BlockType) -> Self {
        self.combustion_probability = probability;
        self.burns_into = Some(burns_into);
        self
    }
}

/// Errors raised by catalog construction and catalog-validated operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// A raw id outside the block enumeration.
    #[error("invalid block type id: {0}")]
    InvalidBlockType(u8),
    /// A block state that the block type cannot carry.
    #[error("block {block:?} cannot carry state {state:?}")]
    InvalidBlockState { block: BlockType, state: BlockState },
    /// A custom definition set left a block type undescribed.
    #[error("no definition for block {0:?}")]
    MissingDefinition(BlockType),
    /// A custom definition set described the same block type twice.
    #[error("duplicate definition for block {0:?}")]
    DuplicateDefinition(BlockType),
    /// Probabilities and jitter bounds must be within `[0, 1]`.
    #[error("block {block:?} has out-of-range value {value} for {field}")]
    InvalidProbability {
        block: BlockType,
        field: &'static str,
        value: f32,
    },
    /// Following `burns_into` from a block leads back to that block.
    #[error("burn chain starting at {0:?} loops back on itself")]
    BurnCycle(BlockType),
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Dense `BlockType -> BlockProperties` table with reverse lookup by name.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    /// `index == BlockType::id()`.
    properties: Vec<BlockProperties>,
    name_to_block: HashMap<String, BlockType>,
}

impl BlockCatalog {
    /// Builds the built-in catalog.
    pub fn standard() -> Self {
        let definitions = vec![
            BlockProperties::inert(BlockType::Air, "air", [0, 0, 0, 0], 0.0),
            BlockProperties::inert(BlockType::Cloud, "cloud", [228, 230, 240, 200], 0.04),
            BlockProperties::inert(BlockType::Oil, "oil", [58, 44, 30, 255], 0.08)
                .combustible(0.3, BlockType::Cloud),
            BlockProperties::inert(BlockType::Water, "water", [40, 92, 220, 200], 0.05),
            BlockProperties::inert(BlockType::Sand, "sand", [222, 200, 122, 255], 0.12),
            BlockProperties::inert(BlockType::Dirt, "dirt", [112, 76, 42, 255], 0.1),
            BlockProperties::inert(BlockType::Stone, "stone", [120, 120, 126, 255], 0.08),
            BlockProperties::inert(BlockType::Metal, "metal", [172, 176, 186, 255], 0.03),
            BlockProperties::inert(BlockType::Border, "border", [20, 20, 20, 255], 0.0),
        ];

        // Already in id order; validity is covered by `test_standard_catalog_is_valid`.
        Self::from_ordered(definitions)
    }

    /// Builds a catalog from custom definitions, one per block type, in any order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a block type is missing or duplicated,
    /// a probability or jitter bound is outside `[0, 1]`, or a burn chain cycles.
    pub fn from_definitions(definitions: Vec<BlockProperties>) -> Result<Self, CatalogError> {
        let mut slots: Vec<Option<BlockProperties>> = vec![None; BlockType::COUNT];

        for def in definitions {
            for (field, value) in [
                ("combustion_probability", def.combustion_probability),
                ("max_color_shift", def.max_color_shift),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(CatalogError::InvalidProbability {
                        block: def.block,
                        field,
                        value,
                    });
                }
            }

            let slot = &mut slots[def.block.id() as usize];
            if slot.is_some() {
                return Err(CatalogError::DuplicateDefinition(def.block));
            }
            *slot = Some(def);
        }

        let mut properties = Vec::with_capacity(BlockType::COUNT);
        for (block, slot) in BlockType::ALL.into_iter().zip(slots) {
            properties.push(slot.ok_or(CatalogError::MissingDefinition(block))?);
        }

        let catalog = Self::from_ordered(properties);
        catalog.check_burn_chains()?;
        Ok(catalog)
    }

    /// `properties[i].block` must have id `i`.
    fn from_ordered(properties: Vec<BlockProperties>) -> Self {
        let name_to_block = properties
            .iter()
            .map(|p| (p.name.clone(), p.block))
            .collect();
        Self {
            properties,
            name_to_block,
        }
    }

    /// Returns the properties of a block type.
    pub fn describe(&self, block: BlockType) -> &BlockProperties {
        &self.properties[block.id() as usize]
    }

    /// Returns the properties for a raw id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBlockType`] if `id` is not a block type.
    pub fn describe_id(&self, id: u8) -> Result<&BlockProperties, CatalogError> {
        Ok(self.describe(BlockType::from_id(id)?))
    }

    /// `true` iff `LIQUID_THRESHOLD <= id < SOLID_THRESHOLD`.
    pub fn is_liquid(&self, block: BlockType) -> bool {
        block.is_liquid()
    }

    /// `true` iff `id >= SOLID_THRESHOLD`.
    pub fn is_solid(&self, block: BlockType) -> bool {
        block.is_solid()
    }

    /// `true` iff the combustion probability is positive.
    pub fn can_burn(&self, block: BlockType) -> bool {
        self.describe(block).combustion_probability > 0.0
    }

    /// Checks that `state` is legal on `block`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBlockState`] for a burning non-combustible block.
    pub fn validate_state(&self, block: BlockType, state: BlockState) -> Result<(), CatalogError> {
        match state {
            BlockState::None => Ok(()),
            BlockState::Burning if self.can_burn(block) => Ok(()),
            BlockState::Burning => Err(CatalogError::InvalidBlockState { block, state }),
        }
    }

    /// Returns the block type with the given name, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockType> {
        self.name_to_block.get(name).copied()
    }

    /// Iterates over all properties in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockProperties> {
        self.properties.iter()
    }

    /// Number of described block types.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Always `false`; a catalog describes every block type.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn check_burn_chains(&self) -> Result<(), CatalogError> {
        for start in BlockType::ALL {
            let mut current = start;
            // A chain longer than the enumeration must revisit a block.
            for _ in 0..BlockType::COUNT {
                match self.describe(current).burns_into {
                    Some(next) if next == start => return Err(CatalogError::BurnCycle(start)),
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        Ok(())
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
