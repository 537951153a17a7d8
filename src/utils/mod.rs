pub mod ids;
pub mod merge;
pub mod password;
pub mod token;

pub use ids::generate_user_id;
pub use merge::merge_by_key;
pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token};
