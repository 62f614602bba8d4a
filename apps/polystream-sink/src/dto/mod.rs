pub mod fragment;

pub use fragment::FragmentRecord;
