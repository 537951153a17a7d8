pub mod peer;

pub use peer::PeerClient;
