use crate::model::SellerId;
use serde::{Deserialize, Serialize};

/// The seller's shop profile (the `profiles` row keyed by the user id).
///
/// A profile is considered complete once it carries a shop name; until then the
/// app keeps the seller on the setup screen and the order feed is not started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    pub id: SellerId,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl SellerProfile {
    pub fn new(id: impl Into<SellerId>, shop_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shop_name: Some(shop_name.into()),
            owner_name: None,
            phone: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.shop_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}
