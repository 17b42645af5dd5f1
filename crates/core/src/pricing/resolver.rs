//! Unified price resolver.
//!
//! Pure over already-cached data: no I/O, no clock.

use std::cmp::Ordering;

use flipledger_market_data::{round_price, Marketplace};
use log::warn;
use rust_decimal::Decimal;

use super::pricing_model::{MarketplaceNet, MarketplaceQuote, PricingInput, PricingResult};

/// Compute per-marketplace net proceeds and pick the best place to sell.
///
/// Sale price is the lowest ask, falling back to the highest bid. Quotes in a
/// currency with no FX multiplier are left out rather than guessed. Ties go to
/// the more recent snapshot, then to StockX.
pub fn resolve_pricing(input: &PricingInput) -> PricingResult {
    let mut per_marketplace: Vec<MarketplaceNet> = Vec::new();

    for quote in &input.quotes {
        let Some(net) = net_for_quote(quote, input) else {
            continue;
        };
        match per_marketplace
            .iter_mut()
            .find(|existing| existing.marketplace == net.marketplace)
        {
            Some(existing) => {
                if rank(&net, existing) == Ordering::Greater {
                    *existing = net;
                }
            }
            None => per_marketplace.push(net),
        }
    }

    per_marketplace.sort_by(|a, b| rank(b, a));

    let Some(best) = per_marketplace.first() else {
        return PricingResult::default();
    };

    let best_net = best.net_proceeds;
    let real_profit = input.cost_basis.map(|cost| round_price(best_net - cost));
    let real_profit_percent = match (real_profit, input.cost_basis) {
        (Some(profit), Some(cost)) if cost > Decimal::ZERO => {
            Some(round_price(profit / cost * Decimal::ONE_HUNDRED))
        }
        _ => None,
    };

    PricingResult {
        best_platform_to_sell: Some(best.marketplace),
        best_net_proceeds: Some(best_net),
        currency: Some(input.fx.display_currency.clone()),
        real_profit,
        real_profit_percent,
        marketplaces: per_marketplace,
    }
}

fn net_for_quote(quote: &MarketplaceQuote, input: &PricingInput) -> Option<MarketplaceNet> {
    let raw_price = quote.lowest_ask.or(quote.highest_bid)?;

    let Some(sale_price) = input.fx.convert(raw_price, &quote.currency) else {
        warn!(
            "No FX multiplier {} -> {}, leaving {} out of pricing",
            quote.currency, input.fx.display_currency, quote.marketplace
        );
        return None;
    };
    let sale_price = round_price(sale_price);
    let net_proceeds = input
        .fees
        .schedule_for(quote.marketplace)
        .net_proceeds(sale_price);

    Some(MarketplaceNet {
        marketplace: quote.marketplace,
        source_currency: quote.currency.clone(),
        sale_price,
        net_proceeds,
        captured_at: quote.captured_at,
    })
}

/// Higher net wins, then the newer snapshot, then StockX.
fn rank(a: &MarketplaceNet, b: &MarketplaceNet) -> Ordering {
    a.net_proceeds
        .cmp(&b.net_proceeds)
        .then_with(|| a.captured_at.cmp(&b.captured_at))
        .then_with(|| marketplace_preference(b.marketplace).cmp(&marketplace_preference(a.marketplace)))
}

fn marketplace_preference(marketplace: Marketplace) -> u8 {
    match marketplace {
        Marketplace::StockX => 0,
        Marketplace::Alias => 1,
    }
}
