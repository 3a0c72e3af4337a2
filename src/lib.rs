//! sprite-pack - Library for indexed-color sprites and project bundles
//!
//! This library provides functionality to:
//! - Store 4-bit indexed images compactly ([`bitmap`]) with up to 16 colors ([`palette`])
//! - Encode them in the binary f4 format ([`f4`]) or as image literals ([`literal`])
//! - Quantize RGBA images onto a palette ([`quantize`]) and render previews ([`preview`])
//! - Export named assets as a compressed project archive ([`export`]) and import
//!   them back with content deduplication ([`import`])

pub mod bitmap;
pub mod cli;
pub mod color;
pub mod compress;
pub mod config;
pub mod context;
pub mod editor;
pub mod export;
pub mod f4;
pub mod ident;
pub mod import;
pub mod jres;
pub mod literal;
pub mod output;
pub mod palette;
pub mod preview;
pub mod project;
pub mod quantize;
pub mod record;
