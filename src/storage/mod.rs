//! Storage layouts of Wigner coefficients and the mapping between $`(\ell, m, n)`$ triples and
//! flat offsets.
//!
//! Wigner coefficients $`f^\ell_{mn}`$ are stored as one block per orientational order $`n`$.
//! Within a block, coefficients are linearised as $`\ell^2 + \ell + m`$. Blocks are laid out
//! according to a [`StorageOrder`], and each block either holds all $`L^2`$ entries including the
//! structurally vanishing ones with $`\ell < |n|`$ ([`StoragePacking::Padded`]), or only the
//! $`L^2 - n^2`$ entries with $`\ell \ge |n|`$ ([`StoragePacking::Compact`]).

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transform::So3Error;


// ================
// Enum definitions
// ================

/// Enumerated type for the order in which orientational blocks are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageOrder {
    /// Blocks are stored in the order $`n = 0, 1, \ldots, N-1, -(N-1), \ldots, -1`$, which is the
    /// natural ordering of discrete Fourier modes.
    ZeroFirst,

    /// Blocks are stored in the order $`n = -(N-1), \ldots, N-1`$.
    NegativeFirst,
}

impl Default for StorageOrder {
    fn default() -> Self {
        StorageOrder::ZeroFirst
    }
}

impl fmt::Display for StorageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOrder::ZeroFirst => write!(f, "zero-first"),
            StorageOrder::NegativeFirst => write!(f, "negative-first"),
        }
    }
}

impl FromStr for StorageOrder {
    type Err = So3Error;

    /// Parses a storage order selector. Case, hyphens and underscores are ignored, so that
    /// `"zero-first"`, `"ZeroFirst"` and `"zero_first"` are all accepted. `"0first"`,
    /// `"negfirst"` and `"neg-first"` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_selector(s).as_str() {
            "zerofirst" | "0first" => Ok(StorageOrder::ZeroFirst),
            "negativefirst" | "negfirst" => Ok(StorageOrder::NegativeFirst),
            _ => Err(So3Error::InvalidArgument(format!(
                "invalid storage order `{s}`"
            ))),
        }
    }
}

/// Enumerated type for whether structurally vanishing coefficients are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoragePacking {
    /// Every block holds $`L^2`$ entries. Entries with $`\ell < |n|`$ must be zero.
    Padded,

    /// Every block holds only the $`L^2 - n^2`$ entries with $`\ell \ge |n|`$.
    Compact,
}

impl Default for StoragePacking {
    fn default() -> Self {
        StoragePacking::Padded
    }
}

impl fmt::Display for StoragePacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoragePacking::Padded => write!(f, "padded"),
            StoragePacking::Compact => write!(f, "compact"),
        }
    }
}

impl FromStr for StoragePacking {
    type Err = So3Error;

    /// Parses a storage packing selector, ignoring case, hyphens and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_selector(s).as_str() {
            "padded" | "pad" => Ok(StoragePacking::Padded),
            "compact" => Ok(StoragePacking::Compact),
            _ => Err(So3Error::InvalidArgument(format!(
                "invalid storage packing `{s}`"
            ))),
        }
    }
}

fn normalise_selector(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ==================
// Struct definitions
// ==================

/// Structure describing a complete storage layout of Wigner coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Storage {
    /// The order of the orientational blocks.
    #[serde(default)]
    pub order: StorageOrder,

    /// Whether structurally vanishing coefficients are stored.
    #[serde(default)]
    pub packing: StoragePacking,
}

impl Storage {
    /// Zero-first block order with padded packing.
    pub const ZERO_FIRST_PAD: Storage = Storage {
        order: StorageOrder::ZeroFirst,
        packing: StoragePacking::Padded,
    };

    /// Negative-first block order with padded packing.
    pub const NEG_FIRST_PAD: Storage = Storage {
        order: StorageOrder::NegativeFirst,
        packing: StoragePacking::Padded,
    };

    /// Zero-first block order with compact packing.
    pub const ZERO_FIRST_COMPACT: Storage = Storage {
        order: StorageOrder::ZeroFirst,
        packing: StoragePacking::Compact,
    };

    /// Negative-first block order with compact packing.
    pub const NEG_FIRST_COMPACT: Storage = Storage {
        order: StorageOrder::NegativeFirst,
        packing: StoragePacking::Compact,
    };

    /// All four storage layouts.
    pub const ALL: [Storage; 4] = [
        Storage::ZERO_FIRST_PAD,
        Storage::NEG_FIRST_PAD,
        Storage::ZERO_FIRST_COMPACT,
        Storage::NEG_FIRST_COMPACT,
    ];

    /// Constructs a storage layout from an order and a packing.
    pub fn new(order: StorageOrder, packing: StoragePacking) -> Self {
        Self { order, packing }
    }

    /// Parses a storage layout from textual order and packing selectors.
    ///
    /// # Errors
    ///
    /// Errors when either selector is not recognised.
    pub fn parse(order: &str, packing: &str) -> Result<Self, So3Error> {
        Ok(Self::new(order.parse()?, packing.parse()?))
    }

    /// Returns the orientational orders $`n`$ in the order their blocks are stored.
    pub fn block_sequence(&self, nn: usize) -> Vec<i64> {
        let nmax = nn as i64 - 1;
        match self.order {
            StorageOrder::ZeroFirst => (0..=nmax).chain(-nmax..0).collect(),
            StorageOrder::NegativeFirst => (-nmax..=nmax).collect(),
        }
    }

    /// Returns the number of coefficients stored in the block of orientational order `n`.
    pub fn block_size(&self, n: i64, l: usize) -> usize {
        match self.packing {
            StoragePacking::Padded => l * l,
            StoragePacking::Compact => (l * l).saturating_sub((n * n) as usize),
        }
    }

    /// Returns the location of the block of orientational order `n` in a coefficient buffer.
    ///
    /// # Errors
    ///
    /// Errors when the band-limits are invalid or when $`|n| \ge N`$.
    pub fn block(&self, n: i64, l: usize, nn: usize) -> Result<CoefficientBlock, So3Error> {
        check_band_limits(l, nn)?;
        check_orientational_order(n, nn)?;
        let offset = raw_block_offset(n, l, nn, self);
        let skip = match self.packing {
            StoragePacking::Padded => 0,
            StoragePacking::Compact => (n * n) as usize,
        };
        Ok(CoefficientBlock {
            n,
            range: offset..offset + self.block_size(n, l),
            skip,
        })
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.order, self.packing)
    }
}

/// Structure locating one orientational block inside a flat coefficient buffer, together with
/// where it lands inside a dense $`L^2`$ harmonic slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoefficientBlock {
    /// The orientational order of the block.
    pub n: i64,

    /// The range of offsets occupied by the block in the coefficient buffer.
    pub range: Range<usize>,

    /// The number of leading entries of the dense harmonic slice that are not stored in the
    /// block. This is zero for padded blocks and $`n^2`$ for compact blocks.
    pub skip: usize,
}

impl CoefficientBlock {
    /// Returns the range of the dense harmonic slice of length $`L^2`$ covered by the block.
    pub fn dense_range(&self) -> Range<usize> {
        self.skip..self.skip + self.range.len()
    }
}

// =========
// Functions
// =========

/// $`\sum_{k=0}^{j} k^2`$, zero for negative `j`.
fn sum_squares(j: i64) -> i64 {
    if j < 0 {
        0
    } else {
        j * (j + 1) * (2 * j + 1) / 6
    }
}

/// Validates a pair of band-limits.
///
/// # Errors
///
/// Errors unless $`L \ge 1`$ and $`1 \le N \le L`$.
pub fn check_band_limits(l: usize, nn: usize) -> Result<(), So3Error> {
    if l == 0 {
        return Err(So3Error::InvalidArgument(
            "harmonic band-limit must be positive".to_string(),
        ));
    }
    if nn == 0 || nn > l {
        return Err(So3Error::InvalidArgument(format!(
            "orientational band-limit {nn} must lie in [1, {l}]"
        )));
    }
    Ok(())
}

fn check_orientational_order(n: i64, nn: usize) -> Result<(), So3Error> {
    if n.unsigned_abs() as usize >= nn {
        Err(So3Error::InvalidArgument(format!(
            "orientational order {n} lies outside [-{}, {}]",
            nn - 1,
            nn - 1
        )))
    } else {
        Ok(())
    }
}

/// Returns the offset of the first coefficient of the block of orientational order `n`, given
/// valid band-limits and $`|n| < N`$.
fn raw_block_offset(n: i64, l: usize, nn: usize, storage: &Storage) -> usize {
    let nmax = nn as i64 - 1;
    let l2 = (l * l) as i64;
    let position = match storage.order {
        StorageOrder::ZeroFirst => {
            if n >= 0 {
                n
            } else {
                n + 2 * nmax + 1
            }
        }
        StorageOrder::NegativeFirst => n + nmax,
    };
    let offset = match storage.packing {
        StoragePacking::Padded => position * l2,
        StoragePacking::Compact => {
            // Subtract the squares of all orientational orders stored before `n`.
            let preceding_squares = match (storage.order, n >= 0) {
                (StorageOrder::ZeroFirst, true) => sum_squares(n - 1),
                (StorageOrder::ZeroFirst, false) => 2 * sum_squares(nmax) - sum_squares(-n),
                (StorageOrder::NegativeFirst, false) => sum_squares(nmax) - sum_squares(-n),
                (StorageOrder::NegativeFirst, true) => sum_squares(nmax) + sum_squares(n - 1),
            };
            position * l2 - preceding_squares
        }
    };
    offset as usize
}

/// Returns the offset of the first coefficient of the block of orientational order `n`.
///
/// # Errors
///
/// Errors when the band-limits are invalid or when $`|n| \ge N`$.
pub fn block_offset(n: i64, l: usize, nn: usize, storage: &Storage) -> Result<usize, So3Error> {
    Ok(storage.block(n, l, nn)?.range.start)
}

/// Returns the total number of stored coefficients for a layout.
///
/// Padded layouts hold $`(2N-1)L^2`$ coefficients and compact ones
/// $`(2N-1)(3L^2 - N(N-1))/3`$. Band-limits are not validated here (see
/// [`check_band_limits`]); a zero band-limit yields an empty layout.
#[must_use]
pub fn flmn_size(l: usize, nn: usize, storage: &Storage) -> usize {
    let nblocks = (2 * nn).saturating_sub(1);
    match storage.packing {
        StoragePacking::Padded => nblocks * l * l,
        StoragePacking::Compact => {
            nblocks * (3 * l * l).saturating_sub(nn * nn.saturating_sub(1)) / 3
        }
    }
}

/// Returns the flat offset of coefficient $`f^\ell_{mn}`$.
///
/// # Arguments
///
/// * `el` - The degree $`0 \le \ell < L`$.
/// * `m` - The order $`-\ell \le m \le \ell`$.
/// * `n` - The orientational order $`-(N-1) \le n \le N-1`$. Compact layouts additionally require
/// $`\ell \ge |n|`$.
/// * `l` - The harmonic band-limit $`L`$.
/// * `nn` - The orientational band-limit $`N`$.
/// * `storage` - The storage layout.
///
/// # Errors
///
/// Errors when any index lies outside its permitted range.
pub fn index_of(
    el: usize,
    m: i64,
    n: i64,
    l: usize,
    nn: usize,
    storage: &Storage,
) -> Result<usize, So3Error> {
    check_band_limits(l, nn)?;
    check_orientational_order(n, nn)?;
    if el >= l {
        return Err(So3Error::InvalidArgument(format!(
            "degree {el} lies outside [0, {}]",
            l - 1
        )));
    }
    let eli = el as i64;
    if m.abs() > eli {
        return Err(So3Error::InvalidArgument(format!(
            "order {m} lies outside [-{el}, {el}]"
        )));
    }
    let block = storage.block(n, l, nn)?;
    let dense = (eli * eli + eli + m) as usize;
    if dense < block.skip {
        return Err(So3Error::InvalidArgument(format!(
            "degree {el} below |n| = {} is not stored in a compact layout",
            n.abs()
        )));
    }
    Ok(block.range.start + dense - block.skip)
}

/// Returns the triple $`(\ell, m, n)`$ stored at a flat offset. This is the inverse of
/// [`index_of`].
///
/// # Errors
///
/// Errors when `offset` lies outside the layout.
pub fn elmn_of(
    offset: usize,
    l: usize,
    nn: usize,
    storage: &Storage,
) -> Result<(usize, i64, i64), So3Error> {
    check_band_limits(l, nn)?;
    let size = flmn_size(l, nn, storage);
    if offset >= size {
        return Err(So3Error::InvalidArgument(format!(
            "offset {offset} lies outside [0, {size})"
        )));
    }
    for n in storage.block_sequence(nn) {
        let block = storage.block(n, l, nn)?;
        if block.range.contains(&offset) {
            let dense = offset - block.range.start + block.skip;
            let el = isqrt(dense);
            let m = dense as i64 - (el * el + el) as i64;
            return Ok((el, m, n));
        }
    }
    Err(So3Error::InvalidArgument(format!(
        "offset {offset} is not covered by any block"
    )))
}

fn isqrt(x: usize) -> usize {
    let mut r = (x as f64).sqrt() as usize;
    while r * r > x {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= x {
        r += 1;
    }
    r
}
