use std::cmp::Ordering;

use crate::rewards::{cash_sortable_key, miles_sortable_key, CardSnapshot};

use super::{RankRequest, SortOrder};

/// The tie-break heuristic keys off the overseas retail channel.
const TIE_BREAK_TXN: &str = "overseas_retail";

pub(super) fn compare(a: &CardSnapshot, b: &CardSnapshot, request: &RankRequest) -> Ordering {
    if let Some(field) = request.sort_field.as_deref() {
        let ordering = a.numeric(field).total_cmp(&b.numeric(field));
        let ordering = match request.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    recommendation(a, b)
}

/// Recommendation ordering: affiliate-linked cards first, then cards that
/// earn overseas miles (cheaper cost per mile first), then pure-cash cards by
/// descending overseas cash rebate. The asc/desc asymmetry is deliberate:
/// cost per mile is a cost, the cash figure is a yield.
fn recommendation(a: &CardSnapshot, b: &CardSnapshot) -> Ordering {
    let ordering = b.has_affiliate_link().cmp(&a.has_affiliate_link());
    if ordering != Ordering::Equal {
        return ordering;
    }

    let miles_key = miles_sortable_key(TIE_BREAK_TXN);
    let a_miles = a.numeric(&miles_key);
    let b_miles = b.numeric(&miles_key);
    let a_earns_miles = a_miles > 0.0;
    let b_earns_miles = b_miles > 0.0;

    let ordering = b_earns_miles.cmp(&a_earns_miles);
    if ordering != Ordering::Equal {
        return ordering;
    }

    if a_earns_miles {
        a_miles.total_cmp(&b_miles)
    } else {
        let cash_key = cash_sortable_key(TIE_BREAK_TXN);
        b.numeric(&cash_key).total_cmp(&a.numeric(&cash_key))
    }
}
