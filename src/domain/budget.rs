use serde::{Deserialize, Serialize};

use super::{Cents, UserId};

/// A spending limit for one user's category. The (user_id, category) pair is
/// the identity: setting a budget again replaces the previous amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub user_id: UserId,
    pub category: String,
    pub amount_cents: Cents,
}
