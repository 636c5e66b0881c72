pub mod bitset;
pub mod counter;
pub mod count_set;
pub mod int_set;
