//! Package metadata constants generated by `build.rs` from Cargo.toml.

include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));
