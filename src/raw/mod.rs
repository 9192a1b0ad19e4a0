mod arena;
mod handle;
mod node;

pub(crate) use arena::{Arena, Generation};
pub(crate) use handle::Handle;
pub(crate) use node::{Node, Side};
