use crate::infra::{InMemoryCardStore, InMemoryPointsSystemStore};
use clap::Args;
use std::sync::Arc;

use hk_card_compare::error::AppError;
use hk_card_compare::ranking::{RankRequest, SortOrder};
use hk_card_compare::rewards::{
    cash_display_key, cash_sortable_key, points_key, CardId, Conversion, MetaValue,
    RewardsService, RewardsServiceError, TransactionRegistry, ViewMode, META_AFFILIATE_LINK,
    META_CARD_NAME, META_POINTS_SYSTEM_ID,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Rebate view to render: cash or miles (defaults to both)
    #[arg(long, value_parser = parse_view)]
    pub(crate) view: Option<ViewMode>,
    /// Explicit numeric sort attribute (defaults to the recommendation order)
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Sort direction for --sort: asc or desc
    #[arg(long, value_parser = parse_order)]
    pub(crate) order: Option<SortOrder>,
}

fn parse_view(raw: &str) -> Result<ViewMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "cash" => Ok(ViewMode::Cash),
        "miles" => Ok(ViewMode::Miles),
        other => Err(format!("unknown view '{other}', expected cash or miles")),
    }
}

fn parse_order(raw: &str) -> Result<SortOrder, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        other => Err(format!("unknown order '{other}', expected asc or desc")),
    }
}

/// Seed a handful of representative HK cards, run the save-time calculation,
/// and print ranked comparison listings.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let cards = Arc::new(InMemoryCardStore::default());
    let systems = Arc::new(InMemoryPointsSystemStore::default());
    let service = Arc::new(RewardsService::new(
        Arc::clone(&cards),
        Arc::clone(&systems),
        TransactionRegistry::builtin(),
    ));

    let seeded = seed_sample_data(&cards, &systems)?;
    for card in &seeded {
        service.recalculate(*card)?;
    }

    let request = match args.sort {
        Some(field) => RankRequest::by_field(field, args.order.unwrap_or(SortOrder::Desc)),
        None => RankRequest::recommended(),
    };
    let views: Vec<ViewMode> = match args.view {
        Some(view) => vec![view],
        None => vec![ViewMode::Miles, ViewMode::Cash],
    };

    for view in views {
        let listing = service.ranked_listing(&request, view)?;
        let heading = match view {
            ViewMode::Miles => "飛行里數",
            ViewMode::Cash => "現金回贈",
        };
        println!("=== 回贈顯示: {heading} — 共 {} 張信用卡 ===", listing.count);
        for entry in listing.cards {
            let name = entry.name.unwrap_or_else(|| format!("卡 #{}", entry.id.0));
            let apply = if entry.has_affiliate_link {
                " [可申請]"
            } else {
                ""
            };
            println!("{name}{apply}");
            for row in entry.rewards {
                println!("    {}: {}", row.label, row.value);
            }
        }
        println!();
    }

    Ok(())
}

fn seed_sample_data(
    cards: &InMemoryCardStore,
    systems: &InMemoryPointsSystemStore,
) -> Result<Vec<CardId>, AppError> {
    let reward_cash = systems.create_system("獎賞錢".to_string(), "RewardCash".to_string());
    systems
        .replace_conversions(
            reward_cash,
            vec![
                Conversion::new("cash", 2000, 10.0),
                Conversion::new("asia_miles", 2000, 1.6),
                Conversion::new("marriott", 2000, 800.0),
            ],
        )
        .map_err(RewardsServiceError::from)?;

    let money_back = systems.create_system("易賞錢".to_string(), "MoneyBack".to_string());
    systems
        .replace_conversions(money_back, vec![Conversion::new("cash", 1000, 5.0)])
        .map_err(RewardsServiceError::from)?;

    let travel = CardId(1);
    cards.upsert(
        travel,
        vec![
            (META_CARD_NAME.to_string(), MetaValue::text("星河旅遊卡")),
            (
                META_POINTS_SYSTEM_ID.to_string(),
                MetaValue::number(reward_cash as f64),
            ),
            (
                META_AFFILIATE_LINK.to_string(),
                MetaValue::text("https://example.hk/apply/travel"),
            ),
            (points_key("local_retail"), MetaValue::text("HK$1 = 3 積分")),
            (
                points_key("overseas_retail"),
                MetaValue::text("HK$1 = 6 積分"),
            ),
            ("annual_fee_sortable".to_string(), MetaValue::number(1800.0)),
        ],
    );

    let platinum = CardId(2);
    cards.upsert(
        platinum,
        vec![
            (META_CARD_NAME.to_string(), MetaValue::text("匯銀白金卡")),
            (
                META_POINTS_SYSTEM_ID.to_string(),
                MetaValue::number(reward_cash as f64),
            ),
            (
                points_key("local_retail"),
                MetaValue::text("HK$1 = 1.5 積分"),
            ),
            ("annual_fee_sortable".to_string(), MetaValue::number(980.0)),
        ],
    );

    let cash_back = CardId(3);
    cards.upsert(
        cash_back,
        vec![
            (META_CARD_NAME.to_string(), MetaValue::text("現金回報卡")),
            (META_POINTS_SYSTEM_ID.to_string(), MetaValue::number(0.0)),
            (
                META_AFFILIATE_LINK.to_string(),
                MetaValue::text("https://example.hk/apply/cashback"),
            ),
            (
                cash_display_key("overseas_retail"),
                MetaValue::text("2% 現金回贈"),
            ),
            (
                cash_sortable_key("overseas_retail"),
                MetaValue::number(2.0),
            ),
            (
                cash_display_key("local_retail"),
                MetaValue::text("1% 現金回贈"),
            ),
            (cash_sortable_key("local_retail"), MetaValue::number(1.0)),
            ("annual_fee_sortable".to_string(), MetaValue::number(0.0)),
        ],
    );

    let lifestyle = CardId(4);
    cards.upsert(
        lifestyle,
        vec![
            (META_CARD_NAME.to_string(), MetaValue::text("易賞錢生活卡")),
            (
                META_POINTS_SYSTEM_ID.to_string(),
                MetaValue::number(money_back as f64),
            ),
            (points_key("local_retail"), MetaValue::text("HK$1 = 2 積分")),
            (
                points_key("octopus_reload"),
                MetaValue::text("HK$1 = 0 積分"),
            ),
            ("annual_fee_sortable".to_string(), MetaValue::number(0.0)),
        ],
    );

    Ok(vec![travel, platinum, cash_back, lifestyle])
}
