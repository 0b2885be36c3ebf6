/*****************************************************************************************[alloc.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use std::fmt;
use std::ops;

/// Append-only region of 32-bit cells, addressed by [`Ref`].
///
/// `free` only accounts for wasted cells; space is actually reclaimed by
/// copying the live content into a fresh allocator and rewriting every
/// outstanding `Ref` (the relocation pass in `core`).
#[derive(Debug)]
pub struct RegionAllocator {
    vec: Vec<u32>,
    wasted: u32,
}

impl RegionAllocator {
    pub fn with_start_cap(start_cap: u32) -> Self {
        Self {
            vec: Vec::with_capacity(start_cap as usize),
            wasted: 0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.vec.len() as u32
    }

    #[inline(always)]
    pub fn wasted(&self) -> u32 {
        self.wasted
    }

    /// Allocate `size` zero-filled cells, returning a reference to the first.
    pub fn alloc(&mut self, size: u32) -> Ref {
        debug_assert!(size > 0);
        let r = Ref(self.vec.len() as u32);
        self.vec.resize(self.vec.len() + size as usize, 0);
        r
    }

    pub fn free(&mut self, size: u32) {
        self.wasted += size;
    }

    pub fn subslice(&self, r: Ref, len: u32) -> &[u32] {
        &self.vec[r.0 as usize..(r.0 + len) as usize]
    }

    pub fn subslice_mut(&mut self, r: Ref, len: u32) -> &mut [u32] {
        &mut self.vec[r.0 as usize..(r.0 + len) as usize]
    }
}

impl ops::Index<Ref> for RegionAllocator {
    type Output = u32;
    #[inline(always)]
    fn index(&self, index: Ref) -> &Self::Output {
        &self.vec[index.0 as usize]
    }
}
impl ops::IndexMut<Ref> for RegionAllocator {
    #[inline(always)]
    fn index_mut(&mut self, index: Ref) -> &mut Self::Output {
        &mut self.vec[index.0 as usize]
    }
}

/// A reference to a cell in the allocator, stable until the next relocation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ref(u32);

impl Ref {
    pub const UNDEF: Self = Ref(!0);

    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        Ref(idx)
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "Ref(UNDEF)")
        } else {
            f.debug_tuple("Ref").field(&self.0).finish()
        }
    }
}

impl Default for Ref {
    fn default() -> Self {
        Ref(0)
    }
}

impl ops::Add<u32> for Ref {
    type Output = Ref;
    #[inline(always)]
    fn add(self, rhs: u32) -> Self::Output {
        Ref(self.0 + rhs)
    }
}
