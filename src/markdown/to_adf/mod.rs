mod blocks;
mod inline;
mod tasks;

pub(crate) use blocks::convert_blocks;
