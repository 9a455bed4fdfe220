//! A runtime-sized N×N bitset.
//!
//! Cells are packed row-major into a vector of unsigned words `T`, so the same
//! type serves the 5×5 test boards and the much larger generated ones. Basic
//! constructors, bitwise combinators and a set-bit iterator are provided.

use core::ops::{BitAnd, BitOr, BitOrAssign};
use core::{any, fmt, mem};
use num_traits::{PrimInt, Unsigned};

use crate::common::Cell;

/// Errors returned by bitgrid operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitGridError {
    /// Row or column index is out of bounds [0..N).
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitGridError::IndexOutOfBounds { row, col } => {
                write!(f, "IndexOutOfBounds: row={}, col={}", row, col)
            }
        }
    }
}

impl std::error::Error for BitGridError {}

/// An N×N bitset stored in words of type `T`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitGrid<T = u64>
where
    T: PrimInt + Unsigned,
{
    size: usize,
    words: Vec<T>,
}

impl<T> BitGrid<T>
where
    T: PrimInt + Unsigned,
{
    #[inline]
    fn word_bits() -> usize {
        mem::size_of::<T>() * 8
    }

    /// Create an empty `size`×`size` grid.
    pub fn new(size: usize) -> Self {
        let bits = size * size;
        let words = (bits + Self::word_bits() - 1) / Self::word_bits();
        BitGrid {
            size,
            words: vec![T::zero(); words],
        }
    }

    /// Creates a grid from an iterator over `(row, col)` positions.
    pub fn from_cells<I>(size: usize, cells: I) -> Result<Self, BitGridError>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut grid = Self::new(size);
        for (r, c) in cells {
            grid.set(r, c)?;
        }
        Ok(grid)
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| w.is_zero())
    }

    /// Gets the bit at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitGridError> {
        self.check_bounds(row, col)?;
        Ok(self.bit(row * self.size + col))
    }

    /// Like [`get`](Self::get), treating out-of-range cells as clear.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.bit(row * self.size + col)
    }

    /// Sets the bit at (row, col) to 1.
    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitGridError> {
        self.check_bounds(row, col)?;
        let (word, offset) = self.locate(row * self.size + col);
        self.words[word] = self.words[word] | (T::one() << offset);
        Ok(())
    }

    /// Clears the bit at (row, col) to 0.
    pub fn clear(&mut self, row: usize, col: usize) -> Result<(), BitGridError> {
        self.check_bounds(row, col)?;
        let (word, offset) = self.locate(row * self.size + col);
        self.words[word] = self.words[word] & !(T::one() << offset);
        Ok(())
    }

    /// True when the two grids share at least one set cell.
    pub fn intersects(&self, other: &Self) -> bool {
        debug_assert_eq!(self.size, other.size);
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| !(*a & *b).is_zero())
    }

    /// True when every cell set in `other` is also set in `self`.
    pub fn contains_all(&self, other: &Self) -> bool {
        debug_assert_eq!(self.size, other.size);
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| (*b & !*a).is_zero())
    }

    /// Iterator over the set bits of the grid, in row-major order.
    pub fn iter_set_bits(&self) -> SetBits<'_, T> {
        SetBits { grid: self, idx: 0 }
    }

    #[inline]
    fn locate(&self, idx: usize) -> (usize, usize) {
        (idx / Self::word_bits(), idx % Self::word_bits())
    }

    #[inline]
    fn bit(&self, idx: usize) -> bool {
        let (word, offset) = self.locate(idx);
        ((self.words[word] >> offset) & T::one()) != T::zero()
    }

    #[inline]
    fn check_bounds(&self, row: usize, col: usize) -> Result<(), BitGridError> {
        if row >= self.size || col >= self.size {
            Err(BitGridError::IndexOutOfBounds { row, col })
        } else {
            Ok(())
        }
    }
}

impl<T> fmt::Debug for BitGrid<T>
where
    T: PrimInt + Unsigned,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitGrid<{}, {}>:", any::type_name::<T>(), self.size)?;
        write!(f, "{}", self)
    }
}

impl<T> fmt::Display for BitGrid<T>
where
    T: PrimInt + Unsigned,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.size {
            for c in 0..self.size {
                let bit = if self.contains(r, c) { '■' } else { '□' };
                write!(f, "{} ", bit)?;
            }
            if r + 1 < self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the set bits of a grid.
#[derive(Clone)]
pub struct SetBits<'a, T>
where
    T: PrimInt + Unsigned,
{
    grid: &'a BitGrid<T>,
    idx: usize,
}

impl<'a, T> Iterator for SetBits<'a, T>
where
    T: PrimInt + Unsigned,
{
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.grid.size;
        while self.idx < n * n {
            let (word, offset) = self.grid.locate(self.idx);
            // skip empty words wholesale
            if offset == 0 && self.grid.words[word].is_zero() {
                self.idx += BitGrid::<T>::word_bits();
                continue;
            }
            let idx = self.idx;
            self.idx += 1;
            if self.grid.bit(idx) {
                return Some((idx / n, idx % n));
            }
        }
        None
    }
}

impl<T> BitAnd for &BitGrid<T>
where
    T: PrimInt + Unsigned,
{
    type Output = BitGrid<T>;

    fn bitand(self, rhs: Self) -> BitGrid<T> {
        debug_assert_eq!(self.size, rhs.size);
        BitGrid {
            size: self.size,
            words: self
                .words
                .iter()
                .zip(rhs.words.iter())
                .map(|(a, b)| *a & *b)
                .collect(),
        }
    }
}

impl<T> BitOr for &BitGrid<T>
where
    T: PrimInt + Unsigned,
{
    type Output = BitGrid<T>;

    fn bitor(self, rhs: Self) -> BitGrid<T> {
        debug_assert_eq!(self.size, rhs.size);
        BitGrid {
            size: self.size,
            words: self
                .words
                .iter()
                .zip(rhs.words.iter())
                .map(|(a, b)| *a | *b)
                .collect(),
        }
    }
}

impl<T> BitOrAssign<&BitGrid<T>> for BitGrid<T>
where
    T: PrimInt + Unsigned,
{
    fn bitor_assign(&mut self, rhs: &BitGrid<T>) {
        debug_assert_eq!(self.size, rhs.size);
        for (a, b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a = *a | *b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_clear() {
        let mut grid = BitGrid::<u8>::new(4);
        assert!(grid.is_empty());

        grid.set(1, 1).unwrap();
        assert!(grid.get(1, 1).unwrap());

        grid.clear(1, 1).unwrap();
        assert!(!grid.get(1, 1).unwrap());

        grid.set(3, 3).unwrap();
        assert_eq!(grid.count_ones(), 1);
        assert_eq!(
            grid.get(4, 0),
            Err(BitGridError::IndexOutOfBounds { row: 4, col: 0 })
        );
    }

    #[test]
    fn iterates_across_word_boundaries() {
        let cells = [(0, 1), (7, 9), (9, 9)];
        let grid = BitGrid::<u16>::from_cells(10, cells).unwrap();
        let bits: Vec<_> = grid.iter_set_bits().collect();
        assert_eq!(bits, cells.to_vec());
    }

    #[test]
    fn intersects_and_contains_all() {
        let a = BitGrid::<u64>::from_cells(12, [(0, 0), (5, 5), (11, 11)]).unwrap();
        let b = BitGrid::<u64>::from_cells(12, [(5, 5)]).unwrap();
        let c = BitGrid::<u64>::from_cells(12, [(6, 6)]).unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_all(&b));
        assert!(!b.contains_all(&a));
        assert_eq!(&a & &b, b);
        assert_eq!((&b | &c).count_ones(), 2);
    }
}
