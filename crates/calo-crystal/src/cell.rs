//! Detector cell identifiers and subsystem classification.
//!
//! Layout of the raw 32-bit id (same packing the geometry service hands out):
//! - bits 28..32: detector (3 = electromagnetic calorimeter)
//! - bits 25..28: subdetector code (1 = barrel, 2 = endcap)
//! - bits  0..25: subdetector-specific cell index

use std::fmt;

const DET_SHIFT: u32 = 28;
const DET_MASK: u32 = 0xF;
const SUBDET_SHIFT: u32 = 25;
const SUBDET_MASK: u32 = 0x7;

/// Detector code of the electromagnetic calorimeter.
pub const ECAL_DETECTOR: u8 = 3;
/// Mask for the index bits below the subdetector field.
pub const INDEX_MASK: u32 = (1 << SUBDET_SHIFT) - 1;

/// Calorimeter section a cell belongs to.
///
/// Only `Barrel` and `Endcap` have a corner convention; anything else decodes
/// to `Other(code)` and is rejected by `Crystal::set_corners`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Barrel,
    Endcap,
    Other(u8),
}

impl Subsystem {
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Subsystem::Barrel,
            2 => Subsystem::Endcap,
            c => Subsystem::Other(c),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Subsystem::Barrel => 1,
            Subsystem::Endcap => 2,
            Subsystem::Other(c) => c,
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Barrel => write!(f, "barrel"),
            Subsystem::Endcap => write!(f, "endcap"),
            Subsystem::Other(c) => write!(f, "subdetector {c}"),
        }
    }
}

/// Opaque cell identifier; immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Calorimeter cell in `subsystem`; `index` is truncated to the low 25 bits.
    pub fn ecal(subsystem: Subsystem, index: u32) -> Self {
        let det = (ECAL_DETECTOR as u32 & DET_MASK) << DET_SHIFT;
        let sub = (subsystem.code() as u32 & SUBDET_MASK) << SUBDET_SHIFT;
        Self(det | sub | (index & INDEX_MASK))
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn detector(self) -> u8 {
        ((self.0 >> DET_SHIFT) & DET_MASK) as u8
    }

    #[inline]
    pub fn subsystem(self) -> Subsystem {
        Subsystem::from_code(((self.0 >> SUBDET_SHIFT) & SUBDET_MASK) as u8)
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }
}

impl From<u32> for CellId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
