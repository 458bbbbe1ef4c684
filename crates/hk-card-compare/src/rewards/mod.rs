//! Points-to-rewards conversion engine.
//!
//! A card declares free-text earning rules per spending category
//! (`"HK$1 = 3 積分"`); its points system declares conversion rows
//! (`2000 pts = HK$10`). The calculator combines the two into persisted
//! cash-percentage and cost-per-mile fields after every card save, and the
//! resolver reads them back per render request, computing live through the
//! same formulas when nothing has been persisted yet.

pub mod calculation;
pub mod conversion;
pub mod domain;
pub mod parser;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use calculation::{ComputedRebates, RebateCalculator};
pub use conversion::{ValuePerPoint, ValuePerPointCache};
pub use domain::{
    cash_display_key, cash_sortable_key, miles_display_key, miles_sortable_key, points_key,
    secondary_display_key, CardId, CardSnapshot, Conversion, MetaValue, PointsSystem,
    SystemStatus, TransactionRegistry, TransactionType, ViewMode, META_AFFILIATE_LINK,
    META_CARD_NAME, META_POINTS_SYSTEM_ID, NOT_APPLICABLE, REWARD_TYPE_ASIA_MILES,
    REWARD_TYPE_CASH,
};
pub use parser::extract_earning_rate;
pub use repository::{CardRepository, PointsSystemRepository, RepositoryError};
pub use resolver::{DisplayResolver, RewardRow};
pub use router::rewards_router;
pub use service::{Listing, ListingEntry, RewardsService, RewardsServiceError};
