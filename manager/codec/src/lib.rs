//! # Vizsync Codec
//! Typed variant & instruction stream codec for the vizsync wire protocol.
//!
//! Everything that crosses a process boundary is written through [`ByteWriter`]
//! and read back through [`ByteReader`] via the [`Wire`] trait. Argument
//! values are carried as self-describing [`Variant`]s so a single instruction
//! format serves arbitrary remote method signatures.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod error;
mod reader;
mod variant;
mod wire;
mod writer;

pub use error::CodecError;
pub use reader::ByteReader;
pub use variant::Variant;
pub use wire::Wire;
pub use writer::ByteWriter;
