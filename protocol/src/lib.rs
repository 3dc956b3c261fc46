//! Interfaces to the collaborators around the pet presentation layer.
//!
//! The presentation layer never talks to a store directly. It receives
//! [`PetRecord`]s, and the adoption flow uses the short-ID allocator and the
//! adoption ledger defined here against whatever backend implements them.

pub mod adoption;
pub mod record;
pub mod short_id;

pub use adoption::{AddressKey, AdoptionError, AdoptionLedger, AdoptionRecord, InMemoryAdoptionLedger};
pub use record::{AccessoryDescriptor, ColorProfile, PetRecord, RecordError, sample_records};
pub use short_id::{
    AllocationError, DEFAULT_MAX_ATTEMPTS, ShortId, ShortIdError, ShortIdRegistry,
    allocate_short_id,
};
