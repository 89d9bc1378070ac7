pub(crate) mod array;
