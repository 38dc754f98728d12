mod post_vault;

pub use post_vault::{VaultRequest, post_vault};
