use super::common::*;
use crate::rewards::domain::{
    cash_display_key, cash_sortable_key, miles_display_key, miles_sortable_key, points_key,
    secondary_display_key, CardId, Conversion, MetaValue, TransactionRegistry, NOT_APPLICABLE,
    META_POINTS_SYSTEM_ID,
};

#[test]
fn persists_cash_and_miles_fields_for_each_declared_rule() {
    let ctx = context();
    seed_standard_system(&ctx, 1);
    let card = CardId(11);
    seed_points_card(&ctx, card, 1);

    let computed = ctx.service.recalculate(card).expect("calculation runs");

    // 3 pts/$ against HK$10/2000 pts => 1.5% cash, HK$416.7 per mile.
    assert_eq!(
        ctx.cards.meta(card, &cash_sortable_key("local_retail")),
        Some(MetaValue::number(1.5))
    );
    assert_eq!(
        ctx.cards.meta(card, &cash_display_key("local_retail")),
        Some(MetaValue::text("1.5% 現金回贈"))
    );
    assert_eq!(
        ctx.cards.meta(card, &miles_display_key("local_retail")),
        Some(MetaValue::text("HK$416.7/里"))
    );
    assert_eq!(
        ctx.cards.meta(card, &miles_sortable_key("local_retail")),
        Some(MetaValue::number(416.7))
    );

    // 6 pts/$ doubles the yield: 3% cash, HK$208.3 per mile.
    assert_eq!(
        ctx.cards.meta(card, &cash_display_key("overseas_retail")),
        Some(MetaValue::text("3% 現金回贈"))
    );
    assert_eq!(
        ctx.cards.meta(card, &miles_sortable_key("overseas_retail")),
        Some(MetaValue::number(208.3))
    );

    // Secondary program: 800 Marriott points per 2000 pts.
    assert_eq!(
        ctx.cards
            .meta(card, &secondary_display_key("local_retail", "marriott")),
        Some(MetaValue::text("HK$0.8/分"))
    );
    assert_eq!(
        ctx.cards
            .meta(card, &secondary_display_key("overseas_retail", "marriott")),
        Some(MetaValue::text("HK$0.4/分"))
    );

    // The returned set mirrors what was persisted.
    assert_eq!(
        computed.get(&cash_sortable_key("local_retail")),
        Some(&MetaValue::number(1.5))
    );
    assert_eq!(computed.len(), 10);
}

#[test]
fn direct_cash_cards_are_left_untouched() {
    let ctx = context();
    seed_standard_system(&ctx, 1);
    let card = CardId(12);
    ctx.cards.seed(
        card,
        vec![
            (META_POINTS_SYSTEM_ID.to_string(), MetaValue::number(0.0)),
            (points_key("local_retail"), MetaValue::text("HK$1 = 3 積分")),
        ],
    );
    let before = ctx.cards.full_meta(card);

    let computed = ctx.service.recalculate(card).expect("calculation runs");

    assert!(computed.is_empty());
    assert_eq!(ctx.cards.full_meta(card), before);
}

#[test]
fn a_system_without_conversions_is_a_no_op() {
    let ctx = context();
    ctx.systems.put_system(reward_cash_system(3));
    ctx.systems.put_conversions(3, Vec::new());
    let card = CardId(13);
    seed_points_card(&ctx, card, 3);
    let before = ctx.cards.full_meta(card);

    let computed = ctx.service.recalculate(card).expect("calculation runs");

    assert!(computed.is_empty());
    assert_eq!(ctx.cards.full_meta(card), before);
}

#[test]
fn a_zero_rate_rule_writes_the_not_applicable_trio() {
    let ctx = context();
    seed_standard_system(&ctx, 1);
    let card = CardId(14);
    ctx.cards.seed(
        card,
        vec![
            (META_POINTS_SYSTEM_ID.to_string(), MetaValue::number(1.0)),
            (
                points_key("octopus_reload"),
                MetaValue::text("HK$1 = 0 積分"),
            ),
        ],
    );

    let computed = ctx.service.recalculate(card).expect("calculation runs");

    assert_eq!(
        ctx.cards.meta(card, &cash_sortable_key("octopus_reload")),
        Some(MetaValue::number(0.0))
    );
    assert_eq!(
        ctx.cards.meta(card, &cash_display_key("octopus_reload")),
        Some(MetaValue::text(NOT_APPLICABLE))
    );
    assert_eq!(
        ctx.cards.meta(card, &miles_display_key("octopus_reload")),
        Some(MetaValue::text(NOT_APPLICABLE))
    );
    // No miles sortable and no secondary fields in this branch.
    assert_eq!(ctx.cards.meta(card, &miles_sortable_key("octopus_reload")), None);
    assert_eq!(
        ctx.cards
            .meta(card, &secondary_display_key("octopus_reload", "marriott")),
        None
    );
    assert_eq!(computed.len(), 3);
}

#[test]
fn transaction_types_without_a_rule_are_skipped() {
    let ctx = context();
    seed_standard_system(&ctx, 1);
    let card = CardId(15);
    seed_points_card(&ctx, card, 1);

    ctx.service.recalculate(card).expect("calculation runs");

    assert_eq!(ctx.cards.meta(card, &cash_display_key("local_dining")), None);
    assert_eq!(ctx.cards.meta(card, &miles_display_key("online_fx")), None);
}

#[test]
fn recalculating_twice_leaves_fields_identical() {
    let ctx = context();
    seed_standard_system(&ctx, 1);
    let card = CardId(16);
    seed_points_card(&ctx, card, 1);

    let first = ctx.service.recalculate(card).expect("first pass");
    let after_first = ctx.cards.full_meta(card);
    let second = ctx.service.recalculate(card).expect("second pass");
    let after_second = ctx.cards.full_meta(card);

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
}

#[test]
fn zero_points_required_rows_never_reach_the_calculation() {
    let ctx = context();
    ctx.systems.put_system(reward_cash_system(5));
    ctx.systems.put_conversions(
        5,
        vec![
            Conversion::new("cash", 0, 10.0),
            Conversion::new("asia_miles", 2000, 1.6),
        ],
    );
    let card = CardId(17);
    seed_points_card(&ctx, card, 5);

    ctx.service.recalculate(card).expect("calculation runs");

    // The broken cash row contributes nothing; miles still compute.
    assert_eq!(ctx.cards.meta(card, &cash_display_key("local_retail")), None);
    assert_eq!(
        ctx.cards.meta(card, &miles_display_key("local_retail")),
        Some(MetaValue::text("HK$416.7/里"))
    );
}

#[test]
fn custom_transaction_types_are_calculated_like_builtins() {
    let registry = TransactionRegistry::builtin().with_custom("tax_payment", "交稅");
    let ctx = context_with_registry(registry);
    seed_standard_system(&ctx, 1);
    let card = CardId(18);
    ctx.cards.seed(
        card,
        vec![
            (META_POINTS_SYSTEM_ID.to_string(), MetaValue::number(1.0)),
            (points_key("tax_payment"), MetaValue::text("HK$1 = 2 積分")),
        ],
    );

    ctx.service.recalculate(card).expect("calculation runs");

    assert_eq!(
        ctx.cards.meta(card, &cash_display_key("tax_payment")),
        Some(MetaValue::text("1% 現金回贈"))
    );
}
