use crate::error::{DeriveError, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// The built-in lookup table. Changing a single symbol changes every password
/// ever derived, so this is part of the scheme version.
pub const LOOKUP_TABLE: &str = "17Grb8fVyeD5&mUnYWtcqzdTK4LgBJA3Xx%MpR!hsiPvaSZ9NQCH=F$oj^Ekw6u_2";

/// Symbol emitted for each leading zero byte under the lookup table and every
/// alphabet derived from it.
const LOOKUP_ZERO: char = '1';

/// An ordered set of symbols acting as the digits of a base-N encoding.
///
/// The radix is the number of symbols and a symbol's digit value is its
/// position. Duplicates are tolerated: a derived alphabet may repeat symbols,
/// and the radix still counts every position.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Alphabet {
    symbols: Vec<char>,
    zero: char,
}

impl Alphabet {
    /// Builds an alphabet whose first symbol doubles as the zero symbol.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self> {
        Self::from_vec(symbols.into_iter().collect())
    }

    fn from_vec(mut symbols: Vec<char>) -> Result<Self> {
        if symbols.len() < 2 {
            let len = symbols.len();
            symbols.zeroize();
            return Err(DeriveError::InvalidAlphabet(len));
        }
        let zero = symbols[0];
        Ok(Self { symbols, zero })
    }

    /// Overrides the symbol prepended for leading zero bytes.
    #[must_use]
    pub fn with_zero(mut self, zero: char) -> Self {
        self.zero = zero;
        self
    }

    pub fn lookup() -> Self {
        Self {
            symbols: LOOKUP_TABLE.chars().collect(),
            zero: LOOKUP_ZERO,
        }
    }

    /// Derives the personal alphabet: the digest scrambled under the lookup
    /// table, read back as a sequence of symbols.
    ///
    /// Its length follows the digest's magnitude and is never padded.
    pub fn personal(digest: &[u8]) -> Result<Self> {
        let lookup = Self::lookup();
        let encoded = lookup.scramble(digest);

        // Sized up front: a growing vector would free unwiped partial copies.
        let mut symbols = Vec::with_capacity(encoded.chars().count());
        symbols.extend(encoded.chars());
        Ok(Self::from_vec(symbols)?.with_zero(lookup.zero))
    }

    pub fn radix(&self) -> usize {
        self.symbols.len()
    }

    pub fn zero_symbol(&self) -> char {
        self.zero
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Encodes `bytes` as a big-endian unsigned integer in base `radix`.
    ///
    /// Each leading zero byte becomes one zero symbol, so `[0, 0, 0]` encodes
    /// to three zero symbols and the empty slice to the empty string. The
    /// output width depends on the value, not just the input length.
    pub fn scramble(&self, bytes: &[u8]) -> Zeroizing<String> {
        let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
        let radix = self.symbols.len() as u64;

        // Working copy divided in place; it holds secret-derived bytes.
        let mut number = Zeroizing::new(bytes[leading_zeros..].to_vec());
        // Upper bound on the digit count, so the buffer never reallocates.
        let max_digits = number.len() * 8 / radix.max(2).ilog2() as usize + 1;
        let mut digits: Zeroizing<Vec<char>> = Zeroizing::new(Vec::with_capacity(max_digits));

        let mut start = 0;
        while start < number.len() {
            let mut remainder = 0u64;
            for byte in number[start..].iter_mut() {
                let acc = (remainder << 8) | u64::from(*byte);
                *byte = (acc / radix) as u8;
                remainder = acc % radix;
            }
            digits.push(self.symbols[remainder as usize]);

            while start < number.len() && number[start] == 0 {
                start += 1;
            }
        }

        let capacity = leading_zeros * self.zero.len_utf8()
            + digits.iter().map(|c| c.len_utf8()).sum::<usize>();
        let mut out = Zeroizing::new(String::with_capacity(capacity));
        out.extend(std::iter::repeat_n(self.zero, leading_zeros));
        out.extend(digits.iter().rev());
        out
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("radix", &self.symbols.len())
            .finish_non_exhaustive()
    }
}
