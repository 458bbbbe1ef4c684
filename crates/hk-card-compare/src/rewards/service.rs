use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::ranking::{self, RankRequest};

use super::calculation::{ComputedRebates, RebateCalculator};
use super::domain::{CardId, TransactionRegistry, ViewMode, META_CARD_NAME};
use super::repository::{CardRepository, PointsSystemRepository, RepositoryError};
use super::resolver::{DisplayResolver, RewardRow};

/// Service facade composing the card and points-system stores with the
/// calculator, resolver, and ranking engine. The admin save hook calls
/// [`RewardsService::recalculate`]; the render layer calls
/// [`RewardsService::display`] and [`RewardsService::ranked_listing`].
pub struct RewardsService<C, P> {
    cards: Arc<C>,
    systems: Arc<P>,
    registry: TransactionRegistry,
    calculator: RebateCalculator<C, P>,
}

impl<C, P> RewardsService<C, P>
where
    C: CardRepository + 'static,
    P: PointsSystemRepository + 'static,
{
    pub fn new(cards: Arc<C>, systems: Arc<P>, registry: TransactionRegistry) -> Self {
        let calculator =
            RebateCalculator::new(Arc::clone(&cards), Arc::clone(&systems), registry.clone());
        Self {
            cards,
            systems,
            registry,
            calculator,
        }
    }

    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }

    /// Recompute and persist a card's derived rebate fields (card-save hook).
    pub fn recalculate(&self, card: CardId) -> Result<ComputedRebates, RewardsServiceError> {
        let computed = self.calculator.recalculate(card)?;
        debug!(card = card.0, fields = computed.len(), "recalculated rebate fields");
        Ok(computed)
    }

    /// Resolve one display value (template-render hook).
    pub fn display(
        &self,
        card: CardId,
        txn: &str,
        view: ViewMode,
    ) -> Result<String, RewardsServiceError> {
        let mut resolver = self.resolver();
        Ok(resolver.reward_display(card, txn, view)?)
    }

    /// A fresh resolver whose value-per-point cache lives only as long as the
    /// returned value; use one per render pass.
    pub fn resolver(&self) -> DisplayResolver<'_> {
        DisplayResolver::new(&*self.cards, &*self.systems)
    }

    /// Ranked listing over every stored card, with reward rows resolved for
    /// the requested view.
    pub fn ranked_listing(
        &self,
        request: &RankRequest,
        view: ViewMode,
    ) -> Result<Listing, RewardsServiceError> {
        let snapshots = self.cards.snapshots()?;
        let ranked = ranking::rank(snapshots, request);

        let mut resolver = self.resolver();
        let mut cards = Vec::with_capacity(ranked.len());
        for snapshot in ranked {
            let rewards = resolver.reward_rows(snapshot.id, view, &self.registry)?;
            cards.push(ListingEntry {
                id: snapshot.id,
                name: snapshot.text(META_CARD_NAME).map(str::to_string),
                has_affiliate_link: snapshot.has_affiliate_link(),
                rewards,
            });
        }

        debug!(count = cards.len(), view = view.as_str(), "built ranked listing");
        Ok(Listing {
            count: cards.len(),
            cards,
        })
    }
}

/// Ranked listing payload handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub count: usize,
    pub cards: Vec<ListingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    pub id: CardId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub has_affiliate_link: bool,
    pub rewards: Vec<RewardRow>,
}

/// Error raised by the rewards service.
#[derive(Debug, thiserror::Error)]
pub enum RewardsServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
