// Copyright 2018 Chris Pearce
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Statistical tests for the 2x2 contingency table of two item sets.
//!
//! A table is described by the joint support of the two sets, the support
//! of each set on its own and the total transaction weight. Every test
//! yields a p-value: smaller values mean a stronger deviation from
//! independence.

use crate::error::ConfigError;
use crate::item::Support;
use statrs::function::erf::erfc;
use statrs::function::factorial::ln_binomial;

// Relative slack when comparing table probabilities or statistics of the
// tables enumerated by Fisher's exact test.
const FISHER_TOLERANCE: f64 = 1e-7;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Statistic {
    /// No test; every extension scores 0.
    None,
    /// Pearson's chi^2 test.
    ChiSquare,
    /// Pearson's chi^2 test with Yates' continuity correction.
    YatesChiSquare,
    /// G statistic (mutual information) with a chi^2 approximation.
    GStatistic,
    /// Fisher's exact test, tables ranked by probability.
    FisherProbability,
    /// Fisher's exact test, tables ranked by chi^2.
    FisherChiSquare,
    /// Fisher's exact test, tables ranked by mutual information.
    FisherInformation,
    /// Fisher's exact test, tables ranked by joint support (one-sided).
    FisherSupport,
}

impl Statistic {
    pub fn from_code(code: char) -> Result<Statistic, ConfigError> {
        match code {
            'x' => Ok(Statistic::None),
            'c' | 'p' | 'n' => Ok(Statistic::ChiSquare),
            'y' | 't' => Ok(Statistic::YatesChiSquare),
            'i' | 'g' => Ok(Statistic::GStatistic),
            'f' => Ok(Statistic::FisherProbability),
            'h' => Ok(Statistic::FisherChiSquare),
            'm' => Ok(Statistic::FisherInformation),
            's' => Ok(Statistic::FisherSupport),
            _ => Err(ConfigError::UnknownStatistic(code)),
        }
    }

    /// p-value of combining a set with support `body` and a set with
    /// support `head` into a set with support `joint`.
    pub fn evaluate(self, joint: Support, body: Support, head: Support, total: Support) -> f64 {
        let table = Table::new(joint, body, head, total);
        match self {
            Statistic::None => 0.0,
            Statistic::ChiSquare => chi2_pvalue(table.chi2()),
            Statistic::YatesChiSquare => chi2_pvalue(table.yates_chi2()),
            Statistic::GStatistic => chi2_pvalue(table.g()),
            Statistic::FisherProbability => {
                let observed = table.ln_probability();
                table.fisher(|t| t.ln_probability() <= observed + FISHER_TOLERANCE)
            }
            Statistic::FisherChiSquare => {
                let observed = table.chi2();
                table.fisher(|t| t.chi2() >= observed * (1.0 - FISHER_TOLERANCE))
            }
            Statistic::FisherInformation => {
                let observed = table.g();
                table.fisher(|t| t.g() >= observed * (1.0 - FISHER_TOLERANCE))
            }
            Statistic::FisherSupport => table.fisher(|t| t.joint >= table.joint),
        }
    }
}

/// True if the joint support does not exceed the support expected under
/// independence of the two sets.
pub fn below_expectation(joint: Support, body: Support, head: Support, total: Support) -> bool {
    (joint as f64) * (total as f64) <= (body as f64) * (head as f64)
}

// Upper tail of the chi^2 distribution with one degree of freedom.
fn chi2_pvalue(statistic: f64) -> f64 {
    if statistic <= 0.0 {
        return 1.0;
    }
    erfc((statistic / 2.0).sqrt())
}

#[derive(Copy, Clone, Debug)]
struct Table {
    joint: f64,
    body: f64,
    head: f64,
    total: f64,
}

impl Table {
    fn new(joint: Support, body: Support, head: Support, total: Support) -> Table {
        debug_assert!(joint <= body && joint <= head && body <= total && head <= total);
        Table {
            joint: joint as f64,
            body: body as f64,
            head: head as f64,
            total: total as f64,
        }
    }

    fn with_joint(&self, joint: f64) -> Table {
        Table { joint, ..*self }
    }

    // Product of the marginals; zero for a degenerate table.
    fn marginals(&self) -> f64 {
        self.body * (self.total - self.body) * self.head * (self.total - self.head)
    }

    fn chi2(&self) -> f64 {
        let m = self.marginals();
        if m <= 0.0 {
            return 0.0;
        }
        let d = self.joint * self.total - self.body * self.head;
        self.total * d * d / m
    }

    fn yates_chi2(&self) -> f64 {
        let m = self.marginals();
        if m <= 0.0 {
            return 0.0;
        }
        let d = ((self.joint * self.total - self.body * self.head).abs() - 0.5 * self.total).max(0.0);
        self.total * d * d / m
    }

    fn g(&self) -> f64 {
        if self.marginals() <= 0.0 {
            return 0.0;
        }
        let n = self.total;
        let cells = [
            (self.joint, self.body, self.head),
            (self.body - self.joint, self.body, n - self.head),
            (self.head - self.joint, n - self.body, self.head),
            (n - self.body - self.head + self.joint, n - self.body, n - self.head),
        ];
        let sum: f64 = cells
            .iter()
            .filter(|&&(observed, _, _)| observed > 0.0)
            .map(|&(observed, row, column)| observed * (observed * n / (row * column)).ln())
            .sum();
        (2.0 * sum).max(0.0)
    }

    // Hypergeometric log-probability of the table given its marginals.
    fn ln_probability(&self) -> f64 {
        let (n, a, b, k) = (
            self.total as u64,
            self.body as u64,
            self.head as u64,
            self.joint as u64,
        );
        ln_binomial(b, k) + ln_binomial(n - b, a - k) - ln_binomial(n, a)
    }

    // Sums the probabilities of all tables with the same marginals that
    // satisfy `extreme`.
    fn fisher<F: Fn(&Table) -> bool>(&self, extreme: F) -> f64 {
        let lo = (self.body + self.head - self.total).max(0.0) as u64;
        let hi = self.body.min(self.head) as u64;
        let p: f64 = (lo..=hi)
            .map(|k| self.with_joint(k as f64))
            .filter(|t| extreme(t))
            .map(|t| t.ln_probability().exp())
            .sum();
        p.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{below_expectation, Statistic};

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_codes() {
        let cases = [
            ('x', Statistic::None),
            ('c', Statistic::ChiSquare),
            ('p', Statistic::ChiSquare),
            ('n', Statistic::ChiSquare),
            ('y', Statistic::YatesChiSquare),
            ('t', Statistic::YatesChiSquare),
            ('i', Statistic::GStatistic),
            ('g', Statistic::GStatistic),
            ('f', Statistic::FisherProbability),
            ('h', Statistic::FisherChiSquare),
            ('m', Statistic::FisherInformation),
            ('s', Statistic::FisherSupport),
        ];
        for &(code, statistic) in cases.iter() {
            assert_eq!(Statistic::from_code(code), Ok(statistic));
        }
        assert!(Statistic::from_code('q').is_err());
    }

    #[test]
    fn test_none_is_always_significant() {
        assert_eq!(Statistic::None.evaluate(3, 4, 4, 5), 0.0);
        assert_eq!(Statistic::None.evaluate(0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_chi_square_family() {
        // Table [[10, 20], [30, 40]].
        assert_close(Statistic::ChiSquare.evaluate(10, 30, 40, 100), 0.3730, 1e-3);
        assert_close(Statistic::YatesChiSquare.evaluate(10, 30, 40, 100), 0.5040, 2e-3);
        let g = Statistic::GStatistic.evaluate(10, 30, 40, 100);
        assert!(g > 0.36 && g < 0.38, "G p-value {}", g);
    }

    #[test]
    fn test_independence_is_not_significant() {
        for &statistic in [
            Statistic::ChiSquare,
            Statistic::YatesChiSquare,
            Statistic::GStatistic,
        ]
        .iter()
        {
            assert_close(statistic.evaluate(25, 50, 50, 100), 1.0, 1e-12);
        }
    }

    #[test]
    fn test_degenerate_tables() {
        // An item contained in every transaction carries no information.
        for &statistic in [
            Statistic::ChiSquare,
            Statistic::GStatistic,
            Statistic::FisherProbability,
            Statistic::FisherSupport,
        ]
        .iter()
        {
            assert_close(statistic.evaluate(3, 3, 5, 5), 1.0, 1e-9);
        }
    }

    #[test]
    fn test_fisher_lady_tasting_tea() {
        // 8 cups, 4 with milk first, 3 of 4 guessed right.
        assert_close(Statistic::FisherSupport.evaluate(3, 4, 4, 8), 17.0 / 70.0, 1e-9);
        assert_close(Statistic::FisherProbability.evaluate(3, 4, 4, 8), 34.0 / 70.0, 1e-9);
        assert_close(Statistic::FisherChiSquare.evaluate(3, 4, 4, 8), 34.0 / 70.0, 1e-9);
        assert_close(Statistic::FisherInformation.evaluate(3, 4, 4, 8), 34.0 / 70.0, 1e-9);
        assert_close(Statistic::FisherSupport.evaluate(4, 4, 4, 8), 1.0 / 70.0, 1e-9);
    }

    #[test]
    fn test_stronger_association_scores_lower() {
        for &statistic in [
            Statistic::ChiSquare,
            Statistic::YatesChiSquare,
            Statistic::GStatistic,
            Statistic::FisherProbability,
            Statistic::FisherSupport,
        ]
        .iter()
        {
            let weak = statistic.evaluate(30, 50, 50, 100);
            let strong = statistic.evaluate(45, 50, 50, 100);
            assert!(strong < weak, "{:?}: {} !< {}", statistic, strong, weak);
        }
    }

    #[test]
    fn test_below_expectation() {
        assert!(below_expectation(25, 50, 50, 100));
        assert!(below_expectation(10, 50, 50, 100));
        assert!(!below_expectation(26, 50, 50, 100));
    }
}
