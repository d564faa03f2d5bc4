use crate::bitarray::BitArray;
use crate::error::{BuildError, TextFormError};
use crate::func::{concat_literal, expect_refs, port_list, Component, PortProperties, PortType};

/// A bit-range extractor (subset) component.
///
/// The output mirrors the bits `start..=end` of the input.
/// If `start > end`, the selected bits are reversed,
/// so bit 0 of the output is always bit `start` of the input.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct RangeExtractor {
    source_bitsize: u8,
    start: u8,
    end: u8
}
impl RangeExtractor {
    /// Creates a new range extractor over a `source_bitsize`-bit input.
    ///
    /// This fails with [`BuildError::InvalidBitsize`] if `source_bitsize` exceeds
    /// [`BitArray::MAX_BITSIZE`], and with [`BuildError::IndexOutOfRange`] if either index
    /// is negative or not below `source_bitsize`.
    pub fn new(source_bitsize: u8, start: i64, end: i64) -> Result<Self, BuildError> {
        if source_bitsize > BitArray::MAX_BITSIZE {
            return Err(BuildError::InvalidBitsize(u32::from(source_bitsize)));
        }
        let check = |index: i64| match u8::try_from(index) {
            Ok(i) if i < source_bitsize => Ok(i),
            _ => Err(BuildError::IndexOutOfRange { index, bitsize: source_bitsize })
        };
        let start = check(start)?;
        let end = check(end)?;

        Ok(Self { source_bitsize, start, end })
    }

    /// Index of the input bit which becomes bit 0 of the output.
    pub fn start(&self) -> u8 {
        self.start
    }
    /// Index of the input bit which becomes the top bit of the output.
    pub fn end(&self) -> u8 {
        self.end
    }
    /// Whether the selected bits are reversed (`start > end`).
    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }
    /// Bitsize of the output.
    pub fn get_bitsize(&self) -> u8 {
        self.start.abs_diff(self.end) + 1
    }
}
impl Component for RangeExtractor {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            // original
            (PortProperties { ty: PortType::Input, bitsize: self.source_bitsize, name: "original" }, 1),
            // subset
            (PortProperties { ty: PortType::Output, bitsize: self.get_bitsize(), name: "subset" }, 1),
        ])
    }

    fn run_inner(&self, inputs: &[BitArray]) -> BitArray {
        match self.is_reversed() {
            true => inputs[0].slice(self.end, self.start).reversed(),
            false => inputs[0].slice(self.start, self.end),
        }
    }

    fn to_text_form(&self, refs: &[&str]) -> Result<String, TextFormError> {
        expect_refs(refs, 1)?;
        let r = refs[0];

        let text = if self.is_reversed() {
            // Descending selects are not expressible, so list each bit explicitly.
            concat_literal((self.end..=self.start).map(|i| format!("{r}[{i}]")))
        } else if self.start == self.end {
            format!("{r}[{}]", self.start)
        } else {
            format!("{r}[{}:{}]", self.end, self.start)
        };
        Ok(text)
    }
}

/// A bit-concatenation (swizzle) component.
///
/// Inputs are registered in the reverse of the order they were given in,
/// so registration index 0 is the least significant segment of the output
/// and the first input given ends up in the most significant bits.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Concatenator {
    bitsizes: Vec<u8>
}
impl Concatenator {
    /// Creates a new concatenator whose inputs have the given bitsizes,
    /// listed from most to least significant.
    ///
    /// This fails with [`BuildError::WidthOverflow`] if the combined bitsize
    /// exceeds [`BitArray::MAX_BITSIZE`].
    pub fn new(bitsizes: &[u8]) -> Result<Self, BuildError> {
        let bitsize: u32 = bitsizes.iter().copied().map(u32::from).sum();
        if bitsize > u32::from(BitArray::MAX_BITSIZE) {
            return Err(BuildError::WidthOverflow { bitsize });
        }

        Ok(Self { bitsizes: bitsizes.iter().rev().copied().collect() })
    }

    /// Bitsizes of the inputs, in registration order (least significant first).
    pub fn input_bitsizes(&self) -> &[u8] {
        &self.bitsizes
    }
    /// Bitsize of the output.
    pub fn get_bitsize(&self) -> u8 {
        // Bounded by MAX_BITSIZE in `new`.
        self.bitsizes.iter().sum()
    }
}
impl Component for Concatenator {
    fn ports(&self) -> Vec<PortProperties> {
        self.bitsizes.iter()
            .map(|&bitsize| PortProperties { ty: PortType::Input, bitsize, name: "in" })
            .chain([PortProperties { ty: PortType::Output, bitsize: self.get_bitsize(), name: "swizzle" }])
            .collect()
    }

    fn run_inner(&self, inputs: &[BitArray]) -> BitArray {
        BitArray::concat(inputs.iter().copied())
    }

    fn to_text_form(&self, refs: &[&str]) -> Result<String, TextFormError> {
        expect_refs(refs, self.bitsizes.len())?;

        let parts = std::iter::zip(refs, &self.bitsizes)
            .rev()
            .filter(|&(_, &bitsize)| bitsize != 0)
            .map(|(&r, _)| r);
        Ok(concat_literal(parts))
    }
}
