//! [`CryptoRate`] definitions and fiat ↔ crypto conversion.

use std::{collections::HashMap, str::FromStr};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Usd};
use derive_more::{AsRef, Display, Error};
use rust_decimal::Decimal;

/// Exchange rate of one cryptocurrency against the US dollar.
#[derive(Clone, Debug)]
pub struct CryptoRate {
    /// [`Symbol`] of the currency.
    pub symbol: Symbol,

    /// Human-readable [`CurrencyName`] of the currency.
    pub name: CurrencyName,

    /// USD price of one unit of the currency.
    pub usd_rate: Rate,

    /// [`DateTime`] when this [`CryptoRate`] was last refreshed.
    pub updated_at: UpdateDateTime,
}

/// Ticker symbol of a cryptocurrency (e.g. `BTC`, `ETH`).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new [`Symbol`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `symbol` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Creates a new [`Symbol`] if the given `symbol` is valid.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Option<Self> {
        let symbol = symbol.into();
        Self::check(&symbol).then_some(Self(symbol))
    }

    /// Checks whether the given `symbol` is a valid [`Symbol`].
    fn check(symbol: impl AsRef<str>) -> bool {
        let symbol = symbol.as_ref();
        !symbol.is_empty()
            && symbol.len() <= 16
            && symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    /// Returns the display precision (number of decimal places) conventional
    /// for this [`Symbol`].
    ///
    /// Affects presentation only: stored amounts always retain their full
    /// precision.
    #[must_use]
    pub fn precision(&self) -> u32 {
        match self.0.as_str() {
            "BTC" | "SHIB" | "PEPE" | "BONK" | "WIF" => 8,
            "MATIC" | "SOL" | "AVAX" => 4,
            "ADA" | "DOGE" => 2,
            _ => 6,
        }
    }
}

impl FromStr for Symbol {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Symbol`")
    }
}

/// Human-readable name of a cryptocurrency (e.g. `Bitcoin`).
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct CurrencyName(String);

impl CurrencyName {
    /// Creates a new [`CurrencyName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`CurrencyName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`CurrencyName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 64
    }
}

impl FromStr for CurrencyName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CurrencyName`")
    }
}

/// USD price of one unit of a cryptocurrency.
///
/// Guaranteed to be strictly positive, so conversion never divides by zero.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub struct Rate(Decimal);

impl Rate {
    /// Creates a new [`Rate`] if the given `rate` is strictly positive.
    #[must_use]
    pub fn new(rate: Decimal) -> Option<Self> {
        (rate > Decimal::ZERO).then_some(Self(rate))
    }

    /// Creates a new [`Rate`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided `rate` must be strictly positive.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(rate: Decimal) -> Self {
        Self(rate)
    }

    /// Returns the [`Decimal`] value of this [`Rate`].
    #[must_use]
    pub const fn decimal(self) -> Decimal {
        self.0
    }
}

/// Amount of some cryptocurrency.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub struct CryptoAmount(Decimal);

impl CryptoAmount {
    /// Creates a new [`CryptoAmount`] if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the [`Decimal`] value of this [`CryptoAmount`].
    #[must_use]
    pub const fn decimal(self) -> Decimal {
        self.0
    }

    /// Rounds this [`CryptoAmount`] to the provided number of decimal
    /// `places` for presentation.
    #[must_use]
    pub fn rounded(self, places: u32) -> Decimal {
        self.0.round_dp(places)
    }
}

/// Snapshot of all known [`CryptoRate`]s, keyed by [`Symbol`].
///
/// All fiat ↔ crypto conversion goes through a single snapshot, so amounts
/// derived from it are consistent with each other even while the rates are
/// being refreshed concurrently.
#[derive(Clone, Debug, Default)]
pub struct RateTable(HashMap<Symbol, CryptoRate>);

impl RateTable {
    /// Looks up the [`CryptoRate`] of the provided [`Symbol`].
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<&CryptoRate> {
        self.0.get(symbol)
    }

    /// Converts the provided fiat `amount` into the cryptocurrency of the
    /// provided [`Symbol`].
    ///
    /// # Errors
    ///
    /// Errors if this [`RateTable`] has no rate for the [`Symbol`].
    pub fn fiat_to_crypto(
        &self,
        amount: Usd,
        symbol: &Symbol,
    ) -> Result<CryptoAmount, RateNotFoundError> {
        let rate = self
            .get(symbol)
            .ok_or_else(|| RateNotFoundError(symbol.clone()))?;

        Ok(CryptoAmount(amount.amount() / rate.usd_rate.decimal()))
    }

    /// Converts the provided cryptocurrency `amount` of the provided
    /// [`Symbol`] into fiat.
    ///
    /// # Errors
    ///
    /// Errors if this [`RateTable`] has no rate for the [`Symbol`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub fn crypto_to_fiat(
        &self,
        amount: CryptoAmount,
        symbol: &Symbol,
    ) -> Result<Usd, RateNotFoundError> {
        let rate = self
            .get(symbol)
            .ok_or_else(|| RateNotFoundError(symbol.clone()))?;

        Ok(Usd::new(amount.decimal() * rate.usd_rate.decimal())
            .expect("product of non-negatives"))
    }
}

impl FromIterator<CryptoRate> for RateTable {
    fn from_iter<I: IntoIterator<Item = CryptoRate>>(iter: I) -> Self {
        Self(iter.into_iter().map(|r| (r.symbol.clone(), r)).collect())
    }
}

/// Error of converting via a [`Symbol`] missing from a [`RateTable`].
#[derive(Clone, Debug, Display, Error)]
#[display("no exchange rate known for `{_0}`")]
pub struct RateNotFoundError(#[error(not(source))] pub Symbol);

/// Cryptocurrency token looked up by its contract address.
#[derive(Clone, Debug)]
pub struct Token {
    /// [`Symbol`] of the token.
    pub symbol: Symbol,

    /// [`CurrencyName`] of the token.
    pub name: CurrencyName,

    /// USD price of one unit of the token.
    pub usd_rate: Rate,

    /// [`ContractAddress`] the token was looked up by.
    pub contract_address: ContractAddress,

    /// [`Chain`] the token lives on.
    pub chain: Chain,

    /// Indicator whether the token contract has been verified.
    pub verified: bool,
}

/// On-chain contract address of a [`Token`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct ContractAddress(String);

impl ContractAddress {
    /// Creates a new [`ContractAddress`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`ContractAddress`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`ContractAddress`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.len() >= 10
            && address.len() <= 128
            && !address.chars().any(char::is_whitespace)
    }
}

impl FromStr for ContractAddress {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ContractAddress`")
    }
}

/// Blockchain a [`Token`] lives on.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Chain(String);

impl Chain {
    /// Default [`Chain`] assumed when none is specified.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn ethereum() -> Self {
        Self::new("ethereum").expect("valid `Chain`")
    }

    /// Creates a new [`Chain`] if the given `chain` is valid.
    #[must_use]
    pub fn new(chain: impl Into<String>) -> Option<Self> {
        let chain = chain.into();
        Self::check(&chain).then_some(Self(chain))
    }

    /// Checks whether the given `chain` is a valid [`Chain`].
    fn check(chain: impl AsRef<str>) -> bool {
        let chain = chain.as_ref();
        chain.trim() == chain && !chain.is_empty() && chain.len() <= 64
    }
}

impl FromStr for Chain {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Chain`")
    }
}

/// Selector of a [`Token`] lookup.
#[derive(Clone, Debug)]
pub struct TokenQuery {
    /// [`ContractAddress`] to look the [`Token`] up by.
    pub contract_address: ContractAddress,

    /// [`Chain`] to look the [`Token`] up on.
    pub chain: Chain,
}

/// [`DateTime`] when a [`CryptoRate`] was last refreshed.
pub type UpdateDateTime = DateTimeOf<(CryptoRate, unit::Update)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Usd};
    use rust_decimal::Decimal;

    use super::{CryptoAmount, CryptoRate, CurrencyName, RateTable, Symbol};

    fn rate(symbol: &str, usd: &str) -> CryptoRate {
        CryptoRate {
            symbol: Symbol::new(symbol).unwrap(),
            name: CurrencyName::new(symbol).unwrap(),
            usd_rate: super::Rate::new(usd.parse().unwrap()).unwrap(),
            updated_at: DateTime::now().coerce(),
        }
    }

    fn usd(s: &str) -> Usd {
        Usd::new(s.parse().unwrap()).unwrap()
    }

    #[test]
    fn converts_fiat_to_crypto() {
        let table: RateTable =
            [rate("BTC", "40000"), rate("ETH", "2000")].into_iter().collect();

        assert_eq!(
            table
                .fiat_to_crypto(usd("100"), &Symbol::new("ETH").unwrap())
                .unwrap(),
            CryptoAmount::new("0.05".parse().unwrap()).unwrap(),
        );
    }

    #[test]
    fn locks_observed_checkout_amount() {
        let table: RateTable = [rate("ETH", "2412.35")].into_iter().collect();

        let amount = table
            .fiat_to_crypto(usd("111.75"), &Symbol::new("ETH").unwrap())
            .unwrap();

        let diff =
            (amount.decimal() - "0.046324".parse::<Decimal>().unwrap()).abs();
        assert!(diff < "0.000001".parse::<Decimal>().unwrap(), "{diff}");
    }

    #[test]
    fn round_trips_within_tolerance() {
        let table: RateTable = [rate("ETH", "2412.35")].into_iter().collect();
        let eth = Symbol::new("ETH").unwrap();

        let crypto = table.fiat_to_crypto(usd("111.75"), &eth).unwrap();
        let fiat = table.crypto_to_fiat(crypto, &eth).unwrap();

        let diff = (fiat.amount() - usd("111.75").amount()).abs();
        assert!(diff < "0.0000001".parse::<Decimal>().unwrap(), "{diff}");
    }

    #[test]
    fn fails_on_unknown_symbol() {
        let table: RateTable = [rate("BTC", "40000")].into_iter().collect();

        assert!(table
            .fiat_to_crypto(usd("1"), &Symbol::new("ETH").unwrap())
            .is_err());
    }

    #[test]
    fn display_precision() {
        assert_eq!(Symbol::new("BTC").unwrap().precision(), 8);
        assert_eq!(Symbol::new("ETH").unwrap().precision(), 6);
        assert_eq!(Symbol::new("SOL").unwrap().precision(), 4);
        assert_eq!(Symbol::new("DOGE").unwrap().precision(), 2);
        assert_eq!(Symbol::new("XYZ").unwrap().precision(), 6);
    }
}
