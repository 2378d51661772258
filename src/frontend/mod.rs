pub mod tree_dumper;

pub use tree_dumper::TreeDumper;
