//! NBU backup container decoding.
//!
//! Decoding flows one way: [`reader`] primitives feed the per-category
//! readers ([`vcard`], [`message`], [`memo`], [`group`]), which [`section`]
//! dispatches by GUID and which fill the [`record`] tables owned by a
//! [`container::Container`]. [`export`] then resolves those byte ranges
//! back into files.

pub mod constants;
pub mod container;
pub mod export;
pub mod filetime;
pub mod group;
pub mod memo;
pub mod message;
pub mod reader;
pub mod record;
pub mod section;
pub mod utf16;
pub mod vcard;
