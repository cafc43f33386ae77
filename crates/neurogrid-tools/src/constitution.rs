//! Trading constitution - zone limits and the daily drawdown cap

use serde::{Deserialize, Serialize};

/// Risk tier label for a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Green,
    Yellow,
    Red,
}

impl Zone {
    /// Tier for a position size expressed as a percentage of the portfolio
    ///
    /// Green below 2%, yellow from 2% up to (not including) 5%, red at 5%
    /// and above.
    pub fn for_position_size(percent: f64) -> Self {
        if percent < 2.0 {
            Self::Green
        } else if percent < 5.0 {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rules every proposed trade is checked against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constitution {
    /// Maximum daily drawdown, percent
    pub max_daily_drawdown: f64,
    /// Largest trade allowed in the green zone, USD
    pub green_zone_limit: f64,
    /// Largest trade allowed in the yellow zone, USD
    pub yellow_zone_limit: f64,
}

impl Default for Constitution {
    fn default() -> Self {
        Self {
            max_daily_drawdown: 5.0,
            green_zone_limit: 20.0,
            yellow_zone_limit: 100.0,
        }
    }
}

/// Display form of the constitution, as shown in the rules viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstitutionView {
    pub max_daily_drawdown: String,
    pub green_zone_limit: String,
    pub yellow_zone_limit: String,
    pub red_zone_limit: String,
}

impl Constitution {
    /// Violated-rule descriptions for a trade; empty when compliant
    pub fn violations(&self, trade_amount: f64, zone: Zone, daily_drawdown: f64) -> Vec<String> {
        let mut violations = Vec::new();

        if daily_drawdown >= self.max_daily_drawdown {
            violations.push(format!(
                "Daily drawdown limit exceeded: {}% >= {}%",
                daily_drawdown, self.max_daily_drawdown
            ));
        }

        match zone {
            Zone::Green if trade_amount > self.green_zone_limit => {
                violations.push(format!(
                    "Green zone limit exceeded: ${} > ${}",
                    trade_amount, self.green_zone_limit
                ));
            }
            Zone::Yellow if trade_amount > self.yellow_zone_limit => {
                violations.push(format!(
                    "Yellow zone limit exceeded: ${} > ${}",
                    trade_amount, self.yellow_zone_limit
                ));
            }
            Zone::Red => violations.push("Red zone trades require manual approval".to_string()),
            _ => {}
        }

        violations
    }

    pub fn view(&self) -> ConstitutionView {
        ConstitutionView {
            max_daily_drawdown: format!("{}%", self.max_daily_drawdown),
            green_zone_limit: format!("${}", self.green_zone_limit),
            yellow_zone_limit: format!("${}", self.yellow_zone_limit),
            red_zone_limit: "REQUIRES_MANUAL_APPROVAL".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_edges() {
        assert_eq!(Zone::for_position_size(1.99), Zone::Green);
        assert_eq!(Zone::for_position_size(2.0), Zone::Yellow);
        assert_eq!(Zone::for_position_size(4.99), Zone::Yellow);
        assert_eq!(Zone::for_position_size(5.0), Zone::Red);
    }

    #[test]
    fn test_green_trade_within_limit_is_clean() {
        let rules = Constitution::default();
        assert!(rules.violations(20.0, Zone::Green, 0.0).is_empty());
    }

    #[test]
    fn test_yellow_over_limit_and_drawdown_both_reported() {
        let rules = Constitution::default();
        let violations = rules.violations(150.0, Zone::Yellow, 5.0);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0], "Daily drawdown limit exceeded: 5% >= 5%");
        assert_eq!(violations[1], "Yellow zone limit exceeded: $150 > $100");
    }

    #[test]
    fn test_red_always_needs_approval() {
        let rules = Constitution::default();
        assert_eq!(
            rules.violations(1.0, Zone::Red, 0.0),
            vec!["Red zone trades require manual approval".to_string()]
        );
    }

    #[test]
    fn test_view_matches_rules_panel() {
        let view = Constitution::default().view();
        assert_eq!(view.max_daily_drawdown, "5%");
        assert_eq!(view.green_zone_limit, "$20");
        assert_eq!(view.yellow_zone_limit, "$100");
    }
}
