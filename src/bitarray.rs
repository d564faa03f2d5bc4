//! Four-state bit vectors.
//!
//! A [`BitArray`] holds up to 64 bits, each of which is one of the [`BitState`]s
//! `0`, `1`, `Z` (floating) or `X` (unknown). Bit 0 is the least significant bit.

use thiserror::Error;

/// The state of a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BitState {
    /// Logic low (`0`).
    Low = 0b00,
    /// Logic high (`1`).
    High = 0b01,
    /// High impedance, not driven (`Z`).
    Imped = 0b10,
    /// Unknown or conflicting (`X`).
    Unk = 0b11
}
impl BitState {
    pub(crate) fn split(self) -> (bool /* data */, bool /* spec */) {
        ((self as u8) & 0b01 != 0, (self as u8) & 0b10 != 0)
    }
    pub(crate) fn join(data: bool, spec: bool) -> Self {
        match (data, spec) {
            (false, false) => BitState::Low,
            (true,  false) => BitState::High,
            (false, true)  => BitState::Imped,
            (true,  true)  => BitState::Unk,
        }
    }
}
impl std::fmt::Display for BitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        match self {
            BitState::Low   => f.write_char('0'),
            BitState::High  => f.write_char('1'),
            BitState::Imped => f.write_char('Z'),
            BitState::Unk   => f.write_char('X'),
        }
    }
}
impl From<bool> for BitState {
    fn from(value: bool) -> Self {
        match value {
            true => Self::High,
            false => Self::Low,
        }
    }
}

/// Error raised when a value containing `Z` or `X` is converted into a two-valued type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("value is not two-valued (contains {0})")]
pub struct NotTwoValuedErr(BitState);
impl NotTwoValuedErr {
    /// Whether the offending bit was floating.
    pub fn is_imped(&self) -> bool { self.0 == BitState::Imped }
    /// Whether the offending bit was unknown.
    pub fn is_unk(&self) -> bool { self.0 == BitState::Unk }
    /// The offending bit state.
    pub fn bit_state(&self) -> BitState { self.0 }
}

impl TryFrom<BitState> for bool {
    type Error = NotTwoValuedErr;

    fn try_from(value: BitState) -> Result<Self, Self::Error> {
        match value {
            BitState::Low   => Ok(false),
            BitState::High  => Ok(true),
            st => Err(NotTwoValuedErr(st))
        }
    }
}

/// Error raised when a value is written into a slot of a different bitsize.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("expected a {expected}-bit value, found {found} bits")]
pub struct MismatchedBitsizes {
    /// Bitsize of the slot being written.
    pub expected: u8,
    /// Bitsize of the value that was provided.
    pub found: u8
}

/// A fixed-width vector of up to [`BitArray::MAX_BITSIZE`] four-state bits.
///
/// Each bit is stored across two planes: `data` holds the logic level and
/// `spec` flags the special states (`Z` when data is 0, `X` when data is 1).
/// Bits at or above `len` are ignored by every comparison.
#[derive(Default, Clone, Copy)]
pub struct BitArray {
    data: u64,
    spec: u64,
    len: u8
}
impl BitArray {
    /// Largest representable bitsize.
    pub const MAX_BITSIZE: u8 = u64::BITS as u8;

    /// Creates an empty (zero-width) array.
    pub fn new() -> Self {
        Default::default()
    }
    /// Creates an array of `len` bits which all have the state `st`.
    pub fn repeat(st: BitState, len: u8) -> Self {
        let (data, spec) = st.split();
        Self {
            data: if data { u64::MAX } else { 0 },
            spec: if spec { u64::MAX } else { 0 },
            len: len.min(BitArray::MAX_BITSIZE)
        }
    }
    /// Creates an array of `len` floating bits.
    pub fn floating(len: u8) -> Self {
        Self::repeat(BitState::Imped, len)
    }
    /// Creates a two-valued array of `len` bits from the low bits of `data`.
    ///
    /// ```
    /// use circuitsim_wiring::bitarray::BitArray;
    ///
    /// let arr = BitArray::from_u64(0b0110, 4);
    /// assert_eq!(arr.to_string(), "0110");
    /// ```
    pub fn from_u64(data: u64, len: u8) -> Self {
        Self { data, spec: 0, len: len.min(BitArray::MAX_BITSIZE) }
    }

    /// The number of bits in this array.
    pub const fn len(self) -> u8 {
        self.len
    }
    /// Whether this array has no bits.
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    const fn norm_mask(self) -> u64 {
        match self.len {
            len @ 0..64 => (1 << len) - 1,
            _ => u64::MAX
        }
    }
    pub(crate) fn normalize(self) -> (u64, u64) {
        let mask = self.norm_mask();
        (self.data & mask, self.spec & mask)
    }
    const fn is_x(self) -> u64 {
        self.data & self.spec & self.norm_mask()
    }

    fn get_raw(self, i: u8) -> BitState {
        let data = (self.data >> i) & 1 != 0;
        let spec = (self.spec >> i) & 1 != 0;
        BitState::join(data, spec)
    }
    /// Gets the state of bit `i`, or `None` if `i` is out of bounds.
    pub fn get(self, i: u8) -> Option<BitState> {
        (i < self.len()).then(|| self.get_raw(i))
    }
    /// Gets the state of bit `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn index(self, i: u8) -> BitState {
        self.get(i).expect("index to be in bounds")
    }

    fn set_raw(&mut self, i: u8, st: BitState) {
        let (data, spec) = st.split();
        self.data &= !(1 << i);
        self.data |= u64::from(data) << i;
        self.spec &= !(1 << i);
        self.spec |= u64::from(spec) << i;
    }

    /// Extracts the inclusive, ascending bit range `lo..=hi`,
    /// or `None` if the range is empty or out of bounds.
    ///
    /// Bit `lo` of this array becomes bit 0 of the result.
    pub fn get_slice(self, lo: u8, hi: u8) -> Option<BitArray> {
        (lo <= hi && hi < self.len()).then(|| self.slice_raw(lo, hi))
    }
    /// Extracts the inclusive, ascending bit range `lo..=hi`.
    ///
    /// ```
    /// use circuitsim_wiring::bitarray::BitArray;
    ///
    /// let arr = BitArray::from_u64(0b0110_1001, 8);
    /// assert_eq!(arr.slice(2, 5), BitArray::from_u64(0b1010, 4));
    /// ```
    ///
    /// Panics if the range is empty or out of bounds.
    pub fn slice(self, lo: u8, hi: u8) -> BitArray {
        self.get_slice(lo, hi).expect("slice to be in bounds")
    }
    fn slice_raw(self, lo: u8, hi: u8) -> BitArray {
        Self {
            data: self.data >> lo,
            spec: self.spec >> lo,
            len: hi - lo + 1
        }
    }

    /// Returns this array with its bit order reversed (bit `i` moves to `len - 1 - i`).
    pub fn reversed(self) -> BitArray {
        self.into_iter().rev().collect()
    }

    /// Concatenates arrays least-significant first:
    /// the first part occupies the lowest bits of the result.
    ///
    /// ```
    /// use circuitsim_wiring::bitarray::BitArray;
    ///
    /// let lo = BitArray::from_u64(0b011, 3);
    /// let hi = BitArray::from_u64(0b10, 2);
    /// assert_eq!(BitArray::concat([lo, hi]), BitArray::from_u64(0b10011, 5));
    /// ```
    ///
    /// Bits past [`BitArray::MAX_BITSIZE`] are dropped.
    pub fn concat(parts: impl IntoIterator<Item = BitArray>) -> BitArray {
        parts.into_iter().fold(BitArray::new(), |acc, part| {
            let (data, spec) = part.normalize();
            let shift = u32::from(acc.len);
            debug_assert!(
                u32::from(acc.len) + u32::from(part.len) <= u32::from(BitArray::MAX_BITSIZE),
                "Concatenation exceeds maximum bitsize"
            );
            Self {
                data: acc.data | data.checked_shl(shift).unwrap_or(0),
                spec: acc.spec | spec.checked_shl(shift).unwrap_or(0),
                len: acc.len.saturating_add(part.len).min(BitArray::MAX_BITSIZE)
            }
        })
    }

    /// Replaces the value of this array, raising `Err` if the bitsizes do not match.
    pub fn replace(&mut self, new: BitArray) -> Result<(), MismatchedBitsizes> {
        match self.len() == new.len() {
            true => {
                *self = new;
                Ok(())
            },
            false => Err(MismatchedBitsizes { expected: self.len(), found: new.len() })
        }
    }
}
impl FromIterator<BitState> for BitArray {
    fn from_iter<I: IntoIterator<Item = BitState>>(iter: I) -> Self {
        iter.into_iter()
            .zip(0..BitArray::MAX_BITSIZE)
            .fold(BitArray::new(), |mut arr, (st, i)| {
                arr.set_raw(i, st);
                arr.len += 1;
                arr
            })
    }
}
impl From<BitState> for BitArray {
    fn from(value: BitState) -> Self {
        BitArray::repeat(value, 1)
    }
}
impl TryFrom<BitArray> for u64 {
    type Error = NotTwoValuedErr;

    fn try_from(value: BitArray) -> Result<Self, Self::Error> {
        let (data, spec) = value.normalize();
        match spec == 0 {
            true => Ok(data),
            false => {
                let err_st = match value.is_x() == 0 {
                    true => BitState::Imped,
                    false => BitState::Unk,
                };
                Err(NotTwoValuedErr(err_st))
            }
        }
    }
}

/// Iterator over the bits of a [`BitArray`], from bit 0 upwards.
pub struct BitArrayIntoIter(BitArray);
impl Iterator for BitArrayIntoIter {
    type Item = BitState;

    fn next(&mut self) -> Option<Self::Item> {
        (!self.0.is_empty()).then(|| {
            let raw = self.0.get_raw(0);
            self.0.data >>= 1;
            self.0.spec >>= 1;
            self.0.len -= 1;
            raw
        })
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}
impl DoubleEndedIterator for BitArrayIntoIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        (!self.0.is_empty()).then(|| {
            let raw = self.0.get_raw(self.0.len() - 1);
            self.0.len -= 1;
            raw
        })
    }
}
impl ExactSizeIterator for BitArrayIntoIter {
    fn len(&self) -> usize {
        usize::from(self.0.len())
    }
}
impl IntoIterator for BitArray {
    type Item = <Self::IntoIter as Iterator>::Item;
    type IntoIter = BitArrayIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        BitArrayIntoIter(self)
    }
}

impl PartialEq for BitArray {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.normalize() == other.normalize()
    }
}
impl Eq for BitArray {}
impl std::hash::Hash for BitArray {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.normalize().hash(state);
    }
}
impl std::fmt::Debug for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(*self)
            .finish()
    }
}
impl std::fmt::Display for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in self.into_iter().rev() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// Creates a [`BitArray`].
///
/// `bitarr![Z; 8]` repeats one state; `bitarr![1, 0, Z]` lists states from bit 0 upwards.
/// States are written `0`, `1`, `Z` and `X`.
#[macro_export]
macro_rules! bitarr {
    (@st 0) => { $crate::bitarray::BitState::Low };
    (@st 1) => { $crate::bitarray::BitState::High };
    (@st Z) => { $crate::bitarray::BitState::Imped };
    (@st X) => { $crate::bitarray::BitState::Unk };
    ($st:tt; $n:expr) => {
        $crate::bitarray::BitArray::repeat($crate::bitarr!(@st $st), $n)
    };
    ($($st:tt),+ $(,)?) => {
        <$crate::bitarray::BitArray as ::std::iter::FromIterator<_>>::from_iter([$($crate::bitarr!(@st $st)),+])
    };
}
pub use crate::bitarr;

#[cfg(test)]
mod test {
    use super::{BitArray, BitState, MismatchedBitsizes};

    #[test]
    fn display() {
        let ba = BitArray::from_iter([
            BitState::Low,
            BitState::Imped,
            BitState::High,
            BitState::Unk,
            BitState::High,
            BitState::Low,
            BitState::Unk,
            BitState::Imped,
        ]);

        assert_eq!(format!("{ba}"), "ZX01X1Z0");
    }

    #[test]
    fn macro_forms() {
        assert_eq!(bitarr![Z; 3], BitArray::floating(3));
        assert_eq!(bitarr![1, 0, 0], BitArray::from_u64(0b001, 3));
        assert_eq!(bitarr![X].index(0), BitState::Unk);
    }

    #[test]
    fn slice_ignores_high_garbage() {
        let arr = BitArray::from_u64(u64::MAX, 8);
        assert_eq!(arr.slice(6, 7), BitArray::from_u64(0b11, 2));
        assert_eq!(arr.slice(7, 7), bitarr![1]);
        assert_eq!(arr.get_slice(7, 8), None);
        assert_eq!(arr.get_slice(3, 2), None);
    }

    #[test]
    fn slice_keeps_special_states() {
        let arr = bitarr![0, Z, X, 1];
        assert_eq!(arr.slice(1, 2), bitarr![Z, X]);
    }

    #[test]
    fn reversed() {
        let arr = BitArray::from_u64(0b1101, 4);
        assert_eq!(arr.reversed(), BitArray::from_u64(0b1011, 4));
        assert_eq!(bitarr![Z, 1, X].reversed(), bitarr![X, 1, Z]);
        assert!(BitArray::new().reversed().is_empty());
    }

    #[test]
    fn concat_zero_width() {
        let a = BitArray::from_u64(0b10, 2);
        assert_eq!(BitArray::concat([BitArray::new(), a, BitArray::new()]), a);
        assert!(BitArray::concat([]).is_empty());
    }

    #[test]
    fn concat_full_width() {
        let lo = BitArray::from_u64(0xDEAD_BEEF, 32);
        let hi = BitArray::from_u64(0x0123_4567, 32);
        let joined = BitArray::concat([lo, hi]);
        assert_eq!(joined.len(), 64);
        assert_eq!(u64::try_from(joined), Ok(0x0123_4567_DEAD_BEEF));
        assert_eq!(BitArray::concat([joined, BitArray::new()]), joined);
    }

    #[test]
    fn replace_checks_bitsize() {
        let mut arr = BitArray::floating(4);
        assert!(arr.replace(BitArray::from_u64(3, 4)).is_ok());
        assert_eq!(
            arr.replace(BitArray::from_u64(3, 5)),
            Err(MismatchedBitsizes { expected: 4, found: 5 })
        );
        assert_eq!(arr, BitArray::from_u64(3, 4));
    }

    #[test]
    fn not_two_valued() {
        let err = u64::try_from(bitarr![1, Z]).unwrap_err();
        assert!(err.is_imped());
        let err = u64::try_from(bitarr![X, Z]).unwrap_err();
        assert!(err.is_unk());
    }
}
