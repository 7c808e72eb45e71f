//! Margin calculations and the order-admission gate
//!
//! `equity = margin_balance + sum(unrealized PnL)` over open positions at
//! the current mark price. New orders require
//! `equity >= (current notional + order notional) / leverage`; accounts are
//! liquidatable only when `equity < total notional * maintenance fraction`.
//! Sitting exactly on the maintenance line is still healthy.

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use types::ids::TraderId;
use types::numeric::{Price, Quantity};
use types::position::Position;

use crate::pricing;

/// Risk parameters.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Leverage applied when the order carries none
    pub default_leverage: u8,
    /// Maintenance margin as a fraction of notional (e.g. 0.05)
    pub maintenance_fraction: Decimal,
    /// Starting margin balance credited to unseen traders
    pub default_balance: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_leverage: 10,
            maintenance_fraction: Decimal::from_str_exact("0.05").unwrap(),
            default_balance: Decimal::from(1_000),
        }
    }
}

/// Result of the initial-margin gate. A rejection is data, not an error:
/// the caller relays equity, required margin, and the shortfall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginCheck {
    pub allowed: bool,
    pub equity: Decimal,
    pub required: Decimal,
    /// `required - equity` when rejected, zero otherwise
    pub shortfall: Decimal,
}

/// Result of a maintenance-margin evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidationCheck {
    pub liquidatable: bool,
    pub equity: Decimal,
    pub maintenance_required: Decimal,
}

/// Account read model for the summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub margin_balance: Decimal,
    pub equity: Decimal,
    pub total_notional: Decimal,
    pub margin_used: Decimal,
    pub margin_available: Decimal,
    /// Effective leverage: notional / equity (zero when flat)
    pub leverage: Decimal,
}

/// Margin engine: balances plus the gating math.
///
/// Balances live in-memory; the on-chain margin vault is the authoritative
/// production source and a named extension point.
#[derive(Debug)]
pub struct MarginEngine {
    config: RiskConfig,
    balances: DashMap<TraderId, Decimal>,
}

impl MarginEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            balances: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Margin balance, crediting the default to unseen traders.
    pub fn margin_balance(&self, trader: &TraderId) -> Decimal {
        *self
            .balances
            .entry(trader.clone())
            .or_insert(self.config.default_balance)
    }

    /// Overwrite a balance (deposits, withdrawals, tests).
    pub fn set_margin_balance(&self, trader: &TraderId, balance: Decimal) {
        self.balances.insert(trader.clone(), balance);
    }

    /// Account equity at the given mark price.
    pub fn equity(&self, trader: &TraderId, positions: &[Position], mark_price: Price) -> Decimal {
        let unrealized: Decimal = positions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.unrealized_pnl(mark_price))
            .sum();
        self.margin_balance(trader) + unrealized
    }

    /// Total notional exposure of open positions at the mark price.
    pub fn total_notional(&self, positions: &[Position], mark_price: Price) -> Decimal {
        positions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| pricing::notional(p.size.as_decimal(), mark_price))
            .sum()
    }

    /// Initial-margin gate for a new order.
    ///
    /// `required = (current notional + size * price) / leverage`; the order
    /// is allowed iff `equity >= required` (boundary equality passes).
    pub fn check_initial_margin(
        &self,
        trader: &TraderId,
        order_size: Quantity,
        order_price: Price,
        positions: &[Position],
        mark_price: Price,
        leverage: Option<u8>,
    ) -> MarginCheck {
        let leverage = leverage.unwrap_or(self.config.default_leverage).max(1);
        let equity = self.equity(trader, positions, mark_price);
        let current_notional = self.total_notional(positions, mark_price);
        let order_notional = order_size.as_decimal() * order_price.as_decimal();
        let required = (current_notional + order_notional) / Decimal::from(leverage);

        if equity >= required {
            MarginCheck {
                allowed: true,
                equity,
                required,
                shortfall: Decimal::ZERO,
            }
        } else {
            MarginCheck {
                allowed: false,
                equity,
                required,
                shortfall: required - equity,
            }
        }
    }

    /// Maintenance-margin evaluation.
    ///
    /// Liquidatable iff `equity < notional * maintenance_fraction` strictly.
    /// An account with no open positions is never liquidatable.
    pub fn check_liquidation(
        &self,
        trader: &TraderId,
        positions: &[Position],
        mark_price: Price,
    ) -> LiquidationCheck {
        let open: Vec<&Position> = positions.iter().filter(|p| p.is_open()).collect();
        if open.is_empty() {
            return LiquidationCheck {
                liquidatable: false,
                equity: self.margin_balance(trader),
                maintenance_required: Decimal::ZERO,
            };
        }

        let equity = self.equity(trader, positions, mark_price);
        let maintenance_required =
            self.total_notional(positions, mark_price) * self.config.maintenance_fraction;

        LiquidationCheck {
            liquidatable: equity < maintenance_required,
            equity,
            maintenance_required,
        }
    }

    /// Read model for the account summary endpoint.
    pub fn account_summary(
        &self,
        trader: &TraderId,
        positions: &[Position],
        mark_price: Price,
    ) -> AccountSummary {
        let margin_balance = self.margin_balance(trader);
        let equity = self.equity(trader, positions, mark_price);
        let total_notional = self.total_notional(positions, mark_price);
        let margin_used = total_notional / Decimal::from(self.config.default_leverage);
        let leverage = if total_notional > Decimal::ZERO && equity > Decimal::ZERO {
            total_notional / equity
        } else {
            Decimal::ZERO
        };

        AccountSummary {
            margin_balance,
            equity,
            total_notional,
            margin_used,
            margin_available: equity - margin_used,
            leverage,
        }
    }
}

impl Default for MarginEngine {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}
