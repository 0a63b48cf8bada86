//! Semantic line item -> ordered XBRL tag aliases, one table per statement.
//!
//! Filers use different tags for the same concept across companies and years.
//! Each entry lists its aliases most-preferred first; adding an alias is a data
//! change only.

use analysis_core::StatementType;
use serde::{Deserialize, Serialize};

use crate::normalizer::ExpectedUnit;

/// One semantic concept and the tags it may be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSpec {
    pub name: String,
    pub tags: Vec<String>,
    pub unit: ExpectedUnit,
}

impl ConceptSpec {
    pub fn new(name: &str, tags: &[&str], unit: ExpectedUnit) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            unit,
        }
    }
}

type Entry = (&'static str, &'static [&'static str], ExpectedUnit);

use ExpectedUnit::{Currency, CurrencyPerShare, Shares};

const INCOME_STATEMENT: &[Entry] = &[
    ("revenues", &["Revenues", "RevenueFromContractWithCustomerExcludingAssessedTax", "SalesRevenueNet"], Currency),
    ("cost_of_revenue", &["CostOfRevenue", "CostOfGoodsAndServicesSold", "CostOfGoodsSold"], Currency),
    ("gross_profit", &["GrossProfit"], Currency),
    ("operating_expenses", &["OperatingExpenses"], Currency),
    ("research_development", &["ResearchAndDevelopmentExpense"], Currency),
    ("selling_general_admin", &["SellingGeneralAndAdministrativeExpense"], Currency),
    ("operating_income", &["OperatingIncomeLoss"], Currency),
    ("interest_expense", &["InterestExpense"], Currency),
    (
        "income_before_tax",
        &[
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxes",
        ],
        Currency,
    ),
    ("income_tax_expense", &["IncomeTaxExpenseBenefit"], Currency),
    ("net_income", &["NetIncomeLoss", "ProfitLoss"], Currency),
    ("earnings_per_share_basic", &["EarningsPerShareBasic"], CurrencyPerShare),
    ("earnings_per_share_diluted", &["EarningsPerShareDiluted"], CurrencyPerShare),
    ("shares_outstanding_basic", &["WeightedAverageNumberOfSharesOutstandingBasic"], Shares),
    ("shares_outstanding_diluted", &["WeightedAverageNumberOfDilutedSharesOutstanding"], Shares),
];

const BALANCE_SHEET: &[Entry] = &[
    ("cash_and_equivalents", &["CashAndCashEquivalentsAtCarryingValue", "Cash"], Currency),
    ("marketable_securities", &["MarketableSecuritiesCurrent"], Currency),
    ("accounts_receivable", &["AccountsReceivableNetCurrent"], Currency),
    ("inventory", &["InventoryNet"], Currency),
    ("current_assets", &["AssetsCurrent"], Currency),
    ("property_plant_equipment", &["PropertyPlantAndEquipmentNet"], Currency),
    ("goodwill", &["Goodwill"], Currency),
    ("intangible_assets", &["IntangibleAssetsNetExcludingGoodwill"], Currency),
    ("total_assets", &["Assets"], Currency),
    ("accounts_payable", &["AccountsPayableCurrent"], Currency),
    ("short_term_debt", &["ShortTermBorrowings", "DebtCurrent"], Currency),
    ("current_liabilities", &["LiabilitiesCurrent"], Currency),
    ("long_term_debt", &["LongTermDebtNoncurrent", "LongTermDebt"], Currency),
    ("total_liabilities", &["Liabilities"], Currency),
    ("common_stock", &["CommonStockValue"], Currency),
    ("retained_earnings", &["RetainedEarningsAccumulatedDeficit"], Currency),
    ("treasury_stock", &["TreasuryStockValue"], Currency),
    ("total_equity", &["StockholdersEquity"], Currency),
    (
        "shares_outstanding",
        &["CommonStockSharesOutstanding", "WeightedAverageNumberOfSharesOutstandingBasic"],
        Shares,
    ),
];

const CASH_FLOW: &[Entry] = &[
    ("net_income", &["NetIncomeLoss"], Currency),
    ("depreciation_amortization", &["DepreciationDepletionAndAmortization"], Currency),
    ("stock_based_compensation", &["ShareBasedCompensation"], Currency),
    ("change_in_working_capital", &["IncreaseDecreaseInOperatingCapital"], Currency),
    ("operating_cash_flow", &["NetCashProvidedByUsedInOperatingActivities"], Currency),
    ("capital_expenditures", &["PaymentsToAcquirePropertyPlantAndEquipment"], Currency),
    ("acquisitions", &["PaymentsToAcquireBusinessesNetOfCashAcquired"], Currency),
    ("investment_purchases", &["PaymentsToAcquireInvestments"], Currency),
    ("investment_sales", &["ProceedsFromSaleMaturityAndCollectionsOfInvestments"], Currency),
    ("investing_cash_flow", &["NetCashProvidedByUsedInInvestingActivities"], Currency),
    ("debt_issuance", &["ProceedsFromIssuanceOfDebt", "ProceedsFromIssuanceOfLongTermDebt"], Currency),
    ("debt_repayment", &["RepaymentsOfDebt", "RepaymentsOfLongTermDebt"], Currency),
    ("stock_issuance", &["ProceedsFromIssuanceOfCommonStock"], Currency),
    ("stock_repurchase", &["PaymentsForRepurchaseOfCommonStock"], Currency),
    ("dividends_paid", &["PaymentsOfDividends", "PaymentsOfDividendsCommonStock"], Currency),
    ("financing_cash_flow", &["NetCashProvidedByUsedInFinancingActivities"], Currency),
    ("net_change_in_cash", &["CashAndCashEquivalentsPeriodIncreaseDecrease"], Currency),
];

/// Built-in registry for a statement type.
pub fn default_registry(statement_type: StatementType) -> Vec<ConceptSpec> {
    let entries = match statement_type {
        StatementType::Income => INCOME_STATEMENT,
        StatementType::Balance => BALANCE_SHEET,
        StatementType::CashFlow => CASH_FLOW,
    };
    entries
        .iter()
        .map(|(name, tags, unit)| ConceptSpec::new(name, tags, *unit))
        .collect()
}
