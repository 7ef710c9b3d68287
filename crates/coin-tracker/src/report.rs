//! Chat Reports
//!
//! Markdown-flavoured text rendered for the chat front-end.

use std::fmt::Write;

use rust_decimal::Decimal;

use crate::coins::{SUPPORTED_COINS, find_coin};
use crate::model::{ForecastResult, Portfolio, PriceMap, PurchaseRecord};

pub const PRICES_UNAVAILABLE: &str = "❌ Unable to fetch prices. Please try again later.";
pub const NO_RECOMMENDATIONS: &str = "❌ No coins are suitable for a forecast.";
pub const PORTFOLIO_EMPTY: &str = "💼 Portfolio is empty";
pub const HISTORY_EMPTY: &str = "📜 History is empty";

fn emoji_for(symbol: &str) -> &'static str {
    find_coin(symbol).map_or("•", |c| c.emoji)
}

/// Two decimals with an explicit sign
fn signed(value: Decimal) -> String {
    let value = value.round_dp(2);
    if value.is_sign_negative() && !value.is_zero() {
        format!("{:.2}", value)
    } else {
        format!("+{:.2}", value.abs())
    }
}

fn usd(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

/// Four decimals below $1, two otherwise
fn price(value: f64) -> String {
    if value < 1.0 {
        format!("${:.4}", value)
    } else {
        format!("${:.2}", value)
    }
}

pub fn prices_report(prices: &PriceMap) -> String {
    if prices.is_empty() {
        return PRICES_UNAVAILABLE.to_string();
    }

    let mut text = String::from("💹 *Current prices:*\n");
    for coin in SUPPORTED_COINS.iter() {
        match prices.get(coin.symbol_key) {
            Some(&value) => {
                let _ = writeln!(text, "{} *{}*: {}", coin.emoji, coin.symbol(), price(value));
            }
            None => {
                let _ = writeln!(text, "{} *{}*: price unavailable", coin.emoji, coin.symbol());
            }
        }
    }
    text.trim_end().to_string()
}

pub fn forecast_report(recommendations: &[ForecastResult], horizon_days: usize) -> String {
    if recommendations.is_empty() {
        return NO_RECOMMENDATIONS.to_string();
    }

    let mut text = String::from("📈 *Investment recommendations:*\n\n");
    for rec in recommendations {
        let _ = write!(
            text,
            "{} {}\nProjected profit: ${:.2}\nCurrent price: {}\nPrice in {} days: {}\n\n",
            emoji_for(&rec.coin),
            rec.coin.to_uppercase(),
            rec.profit,
            price(rec.current_price),
            horizon_days,
            price(rec.future_price),
        );
    }
    text.trim_end().to_string()
}

pub fn portfolio_report(portfolio: &Portfolio) -> String {
    if portfolio.is_empty() {
        return PORTFOLIO_EMPTY.to_string();
    }

    let mut text = String::from("📊 *Your portfolio:*\n");
    for holding in &portfolio.holdings {
        let _ = write!(
            text,
            "{} *{}*\nAmount: {}\nInvested: {}\n",
            holding.emoji(),
            holding.symbol,
            holding.amount.normalize(),
            usd(holding.cost),
        );
        match (holding.current_value, holding.profit, holding.profit_percent) {
            (Some(value), Some(profit), Some(percent)) => {
                let _ = write!(
                    text,
                    "Current value: {}\nProfit: {}$ ({}%)\n\n",
                    usd(value),
                    signed(profit),
                    signed(percent),
                );
            }
            _ => text.push_str("Current value: price unavailable\n\n"),
        }
    }

    let _ = write!(
        text,
        "💰 *Total:*\nInvested: {}\nCurrent value: {}\nProfit: {}$ ({}%)",
        usd(portfolio.total_invested),
        usd(portfolio.total_current),
        signed(portfolio.total_profit()),
        portfolio.total_profit_percent().map_or_else(|| "n/a".to_string(), signed),
    );

    let unpriced: Vec<&str> = portfolio.unpriced().map(|h| h.symbol.as_str()).collect();
    if !unpriced.is_empty() {
        let _ = write!(text, "\n⚠️ Not valued (price unavailable): {}", unpriced.join(", "));
    }

    text
}

pub fn history_report(purchases: &[PurchaseRecord]) -> String {
    if purchases.is_empty() {
        return HISTORY_EMPTY.to_string();
    }

    let mut text = String::from("📖 *Purchase history:*\n");
    for (i, p) in purchases.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. {} - {} {} {} for {}",
            i + 1,
            p.date.format("%Y-%m-%d"),
            emoji_for(&p.coin),
            p.amount.normalize(),
            p.coin,
            usd(p.cost),
        );
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastMethod;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_empty_states() {
        assert_eq!(prices_report(&PriceMap::new()), PRICES_UNAVAILABLE);
        assert_eq!(forecast_report(&[], 7), NO_RECOMMENDATIONS);
        assert_eq!(portfolio_report(&Portfolio::default()), PORTFOLIO_EMPTY);
        assert_eq!(history_report(&[]), HISTORY_EMPTY);
    }

    #[test]
    fn test_history_lines() {
        let purchases = vec![
            PurchaseRecord::new("btc", dec!(0.5), dec!(20000), day()),
            PurchaseRecord::new("ton", dec!(100), dec!(500.5), day()),
        ];

        let text = history_report(&purchases);
        assert!(text.contains("1. 2024-05-01 - ₿ 0.5 BTC for $20000.00"));
        assert!(text.contains("2. 2024-05-01 - 💎 100 TON for $500.50"));
    }

    #[test]
    fn test_portfolio_report_totals() {
        let purchases = vec![PurchaseRecord::new("btc", dec!(0.5), dec!(20000), day())];
        let prices = PriceMap::from([("btc".to_string(), 50000.0)]);

        let text = portfolio_report(&Portfolio::value(&purchases, &prices));
        assert!(text.contains("Current value: $25000.00"));
        assert!(text.contains("Profit: +5000.00$ (+25.00%)"));
        assert!(!text.contains("price unavailable"));
    }

    #[test]
    fn test_portfolio_report_flags_unpriced() {
        let purchases = vec![
            PurchaseRecord::new("btc", dec!(1), dec!(60000), day()),
            PurchaseRecord::new("sol", dec!(10), dec!(1000), day()),
        ];
        let prices = PriceMap::from([("btc".to_string(), 50000.0)]);

        let text = portfolio_report(&Portfolio::value(&purchases, &prices));
        assert!(text.contains("Current value: price unavailable"));
        assert!(text.contains("Profit: -10000.00$ (-16.67%)"));
        assert!(text.contains("Not valued (price unavailable): SOL"));
    }

    #[test]
    fn test_forecast_report() {
        let recs = vec![ForecastResult {
            coin: "sol".into(),
            current_price: 100.0,
            future_price: 120.0,
            profit: 20.0,
            method: ForecastMethod::Model,
        }];

        let text = forecast_report(&recs, 7);
        assert!(text.starts_with("📈"));
        assert!(text.contains("🔥 SOL\nProjected profit: $20.00"));
        assert!(text.contains("Price in 7 days: $120.00"));
    }

    #[test]
    fn test_prices_report_marks_missing() {
        let prices = PriceMap::from([("btc".to_string(), 97500.0), ("doge".to_string(), 0.38)]);
        let text = prices_report(&prices);
        assert!(text.contains("₿ *BTC*: $97500.00"));
        assert!(text.contains("🐶 *DOGE*: $0.3800"));
        assert!(text.contains("💎 *TON*: price unavailable"));
    }
}
