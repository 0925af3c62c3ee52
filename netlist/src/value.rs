use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
    slice::SliceIndex,
};

use crate::{Const, SigBit, State, WireId};

/// An ordered sequence of bits, least significant bit first.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SigSpec {
    bits: Vec<SigBit>,
}

impl SigSpec {
    pub fn new() -> Self {
        SigSpec { bits: vec![] }
    }

    pub fn from_const(value: &Const) -> Self {
        value.iter().map(SigBit::Const).collect()
    }

    pub fn from_state(state: State, width: usize) -> Self {
        SigSpec { bits: vec![SigBit::Const(state); width] }
    }

    pub fn wire(wire: WireId, width: usize) -> Self {
        (0..width).map(|offset| SigBit::Wire(wire, offset)).collect()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = SigBit> + ExactSizeIterator + '_ {
        self.bits.iter().copied()
    }

    pub fn push(&mut self, bit: impl Into<SigBit>) {
        self.bits.push(bit.into());
    }

    pub fn append(&mut self, other: &SigSpec) {
        self.bits.extend_from_slice(&other.bits);
    }

    pub fn concat(&self, other: &SigSpec) -> SigSpec {
        let mut result = self.clone();
        result.append(other);
        result
    }

    pub fn repeat(&self, count: usize) -> SigSpec {
        let mut bits = vec![];
        for _ in 0..count {
            bits.extend_from_slice(&self.bits);
        }
        SigSpec { bits }
    }

    /// Resizes to `width` bits, filling with the sign bit if `signed`, and with zero otherwise.
    pub fn extend(&self, width: usize, signed: bool) -> SigSpec {
        let fill = match (signed, self.bits.last()) {
            (true, Some(&msb)) => msb,
            _ => SigBit::ZERO,
        };
        let mut bits = self.bits.clone();
        bits.resize(width, fill);
        SigSpec { bits }
    }

    pub fn as_bit(&self) -> Option<SigBit> {
        if self.bits.len() == 1 {
            Some(self.bits[0])
        } else {
            None
        }
    }

    pub fn unwrap_bit(&self) -> SigBit {
        assert_eq!(self.bits.len(), 1, "expected a single bit");
        self.bits[0]
    }

    pub fn is_fully_const(&self) -> bool {
        self.bits.iter().all(|bit| bit.is_const())
    }

    pub fn as_const(&self) -> Option<Const> {
        self.bits.iter().map(|bit| bit.as_const()).collect::<Option<Vec<State>>>().map(Const::from)
    }

    /// Sorts the bits and removes duplicates.
    pub fn sort_and_unify(&mut self) {
        self.bits.sort();
        self.bits.dedup();
    }

    /// Splits the bits into maximal runs of either constants, or consecutive bits of one wire.
    pub fn chunks(&self) -> Vec<SigSpec> {
        let mut chunks: Vec<SigSpec> = vec![];
        for &bit in &self.bits {
            let extends = match (chunks.last().and_then(|chunk| chunk.bits.last()), bit) {
                (Some(SigBit::Const(_)), SigBit::Const(_)) => true,
                (Some(&SigBit::Wire(last_wire, last_offset)), SigBit::Wire(wire, offset)) => {
                    last_wire == wire && last_offset + 1 == offset
                }
                _ => false,
            };
            match chunks.last_mut() {
                Some(chunk) if extends => chunk.bits.push(bit),
                _ => chunks.push(SigSpec { bits: vec![bit] }),
            }
        }
        chunks
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        SigSpec { bits: vec![bit] }
    }
}

impl From<&SigBit> for SigSpec {
    fn from(bit: &SigBit) -> Self {
        SigSpec { bits: vec![*bit] }
    }
}

impl From<Vec<SigBit>> for SigSpec {
    fn from(bits: Vec<SigBit>) -> Self {
        SigSpec { bits }
    }
}

impl From<&SigSpec> for SigSpec {
    fn from(value: &SigSpec) -> Self {
        value.clone()
    }
}

impl From<&Const> for SigSpec {
    fn from(value: &Const) -> Self {
        SigSpec::from_const(value)
    }
}

impl FromIterator<SigBit> for SigSpec {
    fn from_iter<T: IntoIterator<Item = SigBit>>(iter: T) -> Self {
        SigSpec { bits: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a SigSpec {
    type Item = SigBit;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, SigBit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.iter().copied()
    }
}

impl<I: SliceIndex<[SigBit]>> Index<I> for SigSpec {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.bits[index]
    }
}

impl<I: SliceIndex<[SigBit]>> IndexMut<I> for SigSpec {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.bits[index]
    }
}

/// Maps every bit to a canonical representative of the set of bits it is connected to.
///
/// Constants always win over wires when two sets are joined.
#[derive(Debug, Clone, Default)]
pub struct SigMap {
    parent: HashMap<SigBit, SigBit>,
}

impl SigMap {
    pub fn new() -> Self {
        SigMap { parent: HashMap::new() }
    }

    pub fn find(&self, mut bit: SigBit) -> SigBit {
        while let Some(&next) = self.parent.get(&bit) {
            bit = next;
        }
        bit
    }

    /// Joins the sets of `lhs` and `rhs`. Unless `lhs` is a constant, the representative of
    /// `rhs` becomes the representative of both.
    pub fn add(&mut self, lhs: SigBit, rhs: SigBit) {
        let lhs = self.find(lhs);
        let rhs = self.find(rhs);
        if lhs == rhs {
            return;
        }
        if lhs.is_const() {
            self.parent.insert(rhs, lhs);
        } else {
            self.parent.insert(lhs, rhs);
        }
    }

    pub fn apply(&self, sig: &SigSpec) -> SigSpec {
        sig.iter().map(|bit| self.find(bit)).collect()
    }
}
