//! nativedb-core - Core library for browsing native and catalog dumps
//!
//! This crate turns the three source shapes found in the wild into one
//! canonical [`Record`] model and indexes it for browsing:
//! - nested JSON keyed by namespace then hash ([`SourceKind::Map`])
//! - flat JSON arrays of catalog items with a `category` list ([`SourceKind::Array`])
//! - C-style headers where namespace and hash live in the surrounding source
//!   ([`SourceKind::HeaderText`])
//!
//! # Features
//!
//! - `parallel` - Read and parse the files of a [`PathSources`] concurrently (brings in `rayon`)
//!
//! # Ingesting a payload
//!
//! ```
//! use nativedb_core::{Payload, Query, SourceKind, ingest};
//!
//! let payload = Payload::parse(
//!     SourceKind::Map,
//!     r#"{"WEAPON": {"0x1": {"name": "GIVE_WEAPON_TO_PED"}}}"#,
//! ).unwrap();
//! let index = ingest(SourceKind::Map, &payload).unwrap();
//!
//! assert_eq!(index.list_groups(&Query::new("give")), vec!["WEAPON"]);
//! assert_eq!(index.get_by_key("GIVE_WEAPON_TO_PED").unwrap().hash, "0x1");
//! ```
//!
//! # Header sources
//!
//! ```
//! use nativedb_core::{Payload, Query, SourceKind, ingest};
//!
//! let header = "namespace PLAYER\n\
//!               static Ped GET_PLAYER_PED(Player player)\n\
//!               { return Invoke<0x43A66C31C68491C0, Ped>(player); }\n";
//! let index = ingest(SourceKind::HeaderText, &Payload::from(header)).unwrap();
//!
//! let record = index.get_by_key("GET_PLAYER_PED").unwrap();
//! assert_eq!(record.hash, "0x43A66C31C68491C0");
//! assert_eq!(record.signature(), "GET_PLAYER_PED(Player player)");
//! ```
//!
//! # Sessions
//!
//! Use a [`Session`] to hold the index between queries and swap it on reload:
//!
//! ```
//! use nativedb_core::{MemorySources, Session, SourceKind};
//! use serde_json::json;
//!
//! let mut session = Session::new();
//! let catalog = json!([{"key": 255, "category": ["CATEGORY_GUNS"]}]);
//! session
//!     .load(MemorySources::new().add(SourceKind::Array, catalog))
//!     .unwrap();
//!
//! let index = session.index().unwrap();
//! assert_eq!(index.get_by_key("0xFF").unwrap().primary_group(), "CATEGORY_GUNS");
//! ```

pub mod adapters;
mod error;
mod index;
mod normalize;
mod payload;
mod query;
mod record;
mod session;
mod sources;

pub use adapters::{
    Adapter, ArrayAdapter, CatalogInfo, Extraction, HeaderTextAdapter, MapAdapter,
};
pub use error::{IngestError, IngestResult};
pub use index::{CatalogIndex, IndexBuilder};
pub use normalize::{format_key, normalize};
pub use payload::{Payload, SourceKind};
pub use query::{GroupMatches, GroupSummary, Query};
pub use record::{DEFAULT_HASH, Param, RawKey, RawRecord, Record, UNKNOWN_GROUP, display_group};
pub use session::{LoadStats, Session};
pub use sources::{MemorySources, PathSources, Sources, extract_file};

/// Run one payload through the full pipeline and return the built index.
///
/// Fails only when the payload as a whole does not fit `kind`; malformed
/// entries inside it are skipped.
pub fn ingest(kind: SourceKind, payload: &Payload) -> IngestResult<CatalogIndex> {
    let extraction = adapters::extract(kind, payload)?;
    Ok(CatalogIndex::from_extraction(extraction))
}
