//! Points-to-rewards conversion and card ranking engine for a Hong Kong
//! credit-card comparison site.
//!
//! The write path recomputes a card's derived rebate fields after every card
//! save ([`rewards::RebateCalculator`]); the read path resolves display values
//! per render request, falling back to a live calculation for unsaved cards
//! ([`rewards::DisplayResolver`]). Listings are ordered by [`ranking::rank`],
//! which applies either the recommendation heuristic or an explicit numeric
//! sort with a fixed tie-break chain.

pub mod config;
pub mod error;
pub mod ranking;
pub mod rewards;
pub mod telemetry;
