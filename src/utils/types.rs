use std::fmt;
use std::hash::Hash;

pub type DefaultIx = i64;
pub type NodeIdx<Ix = DefaultIx> = Ix;
pub type EdgePtr<Ix = DefaultIx> = Ix;
pub type Weight = f64;

pub unsafe trait IndexType: Copy + Default + Hash + Ord + fmt::Debug + 'static {
    fn new(x: usize) -> Self;
    fn index(&self) -> usize;
}

unsafe impl IndexType for i64 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as i64
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
}

unsafe impl IndexType for usize {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self
    }
}
