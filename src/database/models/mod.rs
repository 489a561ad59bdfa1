pub mod network;
pub mod substation;

pub use network::{Network, NetworkDraft, NetworkPayload};
pub use substation::{Substation, SubstationDraft, SubstationPayload, SubstationRecord};
