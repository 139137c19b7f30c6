//! Domain decomposition for the parallel sweep
//!
//! The lattice is tiled by hypercubic blocks and each block is coloured by the
//! parity of every one of its block coordinates, giving `2^4` colour classes. All
//! blocks of one colour are updated concurrently; each task reads the field as it
//! stood when the colour pass began and writes only its own links, which are copied
//! back once every task of the pass has finished.
//!
//! Two blocks of the same colour are separated by at least one whole block along
//! some dimension. Every loop through a link stays within two sites of it, so with
//! blocks of edge two or more no task reads a link another task of its pass writes.

use crate::algebra::ColourMatrix;
use crate::error::{LatticeError, Result};
use crate::lattice::{GaugeField, Links, LinksMut, Shape, Site, N_DIMS};
use tracing::warn;

/// Colour of a block: one parity bit per block coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Colour(u8);

impl Colour {
    /// Number of colour classes
    pub const COUNT: usize = 1 << N_DIMS;

    /// Every colour in update order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Colour of the block at `coords` in block units
    fn of(coords: &[usize; N_DIMS]) -> Self {
        Self(
            coords
                .iter()
                .enumerate()
                .fold(0, |bits, (d, &c)| bits | (((c % 2) as u8) << d)),
        )
    }

    /// Position in the update order
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// One hypercubic block of the decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Linear block index, also the random stream id
    pub index: usize,
    /// Lowest corner, in wrapped coordinates
    pub origin: [usize; N_DIMS],
    /// Edge length
    pub size: usize,
    /// Colour class
    pub colour: Colour,
}

impl Block {
    /// Number of sites inside the block
    pub fn volume(&self) -> usize {
        self.size.pow(N_DIMS as u32)
    }

    /// Position of a wrapped site inside the block, if it belongs here
    #[inline]
    fn local_site_index(&self, wrapped: &[usize; N_DIMS]) -> Option<usize> {
        let mut index = 0;
        for d in 0..N_DIMS {
            let offset = wrapped[d].checked_sub(self.origin[d])?;
            if offset >= self.size {
                return None;
            }
            index = index * self.size + offset;
        }
        Some(index)
    }

    /// Sites of the block, t slowest
    pub fn sites(&self) -> impl Iterator<Item = Site> {
        let block = *self;
        (0..block.volume()).map(move |mut index| {
            let mut site = [0; N_DIMS];
            for d in (0..N_DIMS).rev() {
                site[d] = (block.origin[d] + index % block.size) as isize;
                index /= block.size;
            }
            site
        })
    }
}

/// Tiling of a lattice into coloured blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDecomposition {
    shape: Shape,
    block_size: usize,
    classes: Vec<Vec<Block>>,
}

impl BlockDecomposition {
    /// Tile `shape` with blocks of edge `block_size`
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidBlockSize`] unless `block_size` is at least two,
    /// divides every extent, and leaves each dimension with either one block or an
    /// even number of them. The parity colouring needs the even count to survive the
    /// periodic boundary.
    pub fn new(shape: Shape, block_size: usize) -> Result<Self> {
        let extents = shape.extents();
        let fits = block_size >= 2
            && extents.iter().all(|&extent| {
                let n_blocks = extent / block_size;
                extent % block_size == 0 && (n_blocks == 1 || n_blocks % 2 == 0)
            });
        if !fits {
            warn!(block_size, ?extents, "block size does not tile the lattice");
            return Err(LatticeError::InvalidBlockSize {
                block_size,
                extents,
            });
        }

        let counts = extents.map(|extent| extent / block_size);
        let n_blocks: usize = counts.iter().product();
        let mut classes = vec![Vec::new(); Colour::COUNT];
        for index in 0..n_blocks {
            let mut remainder = index;
            let mut coords = [0; N_DIMS];
            for d in (0..N_DIMS).rev() {
                coords[d] = remainder % counts[d];
                remainder /= counts[d];
            }
            let colour = Colour::of(&coords);
            classes[colour.index()].push(Block {
                index,
                origin: coords.map(|c| c * block_size),
                size: block_size,
                colour,
            });
        }

        Ok(Self {
            shape,
            block_size,
            classes,
        })
    }

    /// Block edge length
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Lattice being tiled
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Blocks of one colour, possibly none
    pub fn blocks(&self, colour: Colour) -> &[Block] {
        &self.classes[colour.index()]
    }

    /// Total number of blocks
    pub fn len(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// Whether the decomposition has no blocks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Field as seen from inside one block task
///
/// Links based inside the block come from a private buffer that the task may
/// overwrite; everything else is read from the shared field.
#[derive(Debug)]
pub struct BlockView<'a> {
    field: &'a GaugeField,
    block: Block,
    local: Vec<ColourMatrix>,
}

impl<'a> BlockView<'a> {
    /// Copy the block's links out of `field`
    pub fn new(field: &'a GaugeField, block: Block) -> Self {
        let local = block
            .sites()
            .flat_map(|site| (0..N_DIMS).map(move |mu| (site, mu)))
            .map(|(site, mu)| field.link(&site, mu))
            .collect();
        Self {
            field,
            block,
            local,
        }
    }

    /// The block being viewed
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Hand back the block's links in [`Block::sites`] order, four per site
    pub fn into_links(self) -> Vec<ColourMatrix> {
        self.local
    }

    #[inline]
    fn local_index(&self, site: &Site, direction: usize) -> Option<usize> {
        let wrapped = self.field.shape().wrap(site);
        self.block
            .local_site_index(&wrapped)
            .map(|index| index * N_DIMS + direction)
    }
}

impl Links for BlockView<'_> {
    fn shape(&self) -> Shape {
        self.field.shape()
    }

    #[inline]
    fn link(&self, site: &Site, direction: usize) -> ColourMatrix {
        match self.local_index(site, direction) {
            Some(index) => self.local[index],
            None => self.field.link(site, direction),
        }
    }
}

impl LinksMut for BlockView<'_> {
    /// Writes outside the block are dropped; tasks only update their own links
    fn set_link(&mut self, site: &Site, direction: usize, value: ColourMatrix) {
        let index = self.local_index(site, direction);
        debug_assert!(index.is_some(), "write outside block {}", self.block.index);
        if let Some(index) = index {
            self.local[index] = value;
        }
    }
}

/// Copy a finished block back into the field
pub(crate) fn write_back(field: &mut GaugeField, block: &Block, links: &[ColourMatrix]) {
    for (site, chunk) in block.sites().zip(links.chunks_exact(N_DIMS)) {
        for (mu, value) in chunk.iter().enumerate() {
            field.set_link(&site, mu, *value);
        }
    }
}
