//! Typed records for query results.
//!
//! Fields are snake_case bound to the upstream camelCase column names
//! via serde. Optionality mirrors what the data actually guarantees:
//! ingested price/SKU rows are fully populated, card columns are
//! mostly nullable upstream.

mod card;
mod deck;
mod price;
mod set;

pub use card::{CardAtomic, CardPrinting, CardRef, TokenPrinting};
pub(crate) use card::ATOMIC_COLUMNS;
pub use deck::DeckSummary;
pub use price::{
    CheapestPrinting, FinancialSummary, PriceRow, PriceTrend, PriciestPrinting, PrintingPrice,
    SkuRecord,
};
pub use set::SetSummary;
